//! Serial debug console.
//!
//! Collects bytes from the debug UART into lines and turns the button
//! commands below into overrides of the shared [`OverrideRegister`]:
//!
//! ```text
//! BTN1_PRESS     press button 1
//! BTN2_PRESS     press button 2
//! BTN3_PRESS     press both buttons
//! BTNx_RELEASE   release every override (x = 1, 2 or 3)
//! ```
//!
//! Lines end with `\r` or `\n`. Unknown lines are discarded. A line longer
//! than [`LINE_BUFFER_SIZE`] is truncated: extra bytes are dropped until the
//! next terminator, so the following line is parsed normally.
//!
//! ## Example
//!
//! ```rust
//! use zigbee_switch::button::OverrideRegister;
//! use zigbee_switch::config::ButtonLayout;
//! use zigbee_switch::console::DebugInput;
//!
//! let overrides = OverrideRegister::new();
//! let layout = ButtonLayout::new(&[4, 5])?;
//! let mut console = DebugInput::new(&overrides, &layout);
//!
//! console.feed(b"BTN1_PRESS\n");
//! assert!(overrides.is_active(1 << 4));
//! console.feed(b"BTN3_RELEASE\n");
//! assert_eq!(overrides.mask(), 0);
//! # Ok::<(), zigbee_switch::SwitchError>(())
//! ```

use heapless::Vec;

use crate::button::override_state::OverrideRegister;
use crate::config::ButtonLayout;

/// Capacity of the line buffer in bytes
pub const LINE_BUFFER_SIZE: usize = 32;

/// A recognized console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleCommand {
    /// `BTNn_PRESS` (3 = every button)
    Press(u8),
    /// `BTNn_RELEASE`
    Release,
}

impl ConsoleCommand {
    /// Parse one line (without terminator)
    pub fn parse(line: &[u8]) -> Option<Self> {
        match line {
            b"BTN1_PRESS" => Some(ConsoleCommand::Press(1)),
            b"BTN2_PRESS" => Some(ConsoleCommand::Press(2)),
            b"BTN3_PRESS" => Some(ConsoleCommand::Press(3)),
            b"BTN1_RELEASE" | b"BTN2_RELEASE" | b"BTN3_RELEASE" => Some(ConsoleCommand::Release),
            _ => None,
        }
    }
}

/// Line-buffered debug command injector.
#[derive(Debug)]
pub struct DebugInput<'a> {
    overrides: &'a OverrideRegister,
    line: Vec<u8, LINE_BUFFER_SIZE>,
    overflow: bool,
    button_masks: [u32; 3],
}

impl<'a> DebugInput<'a> {
    /// Create a console driving `overrides` for the buttons of `layout`
    pub fn new(overrides: &'a OverrideRegister, layout: &ButtonLayout) -> Self {
        let combined = if layout.button_count() > 1 {
            layout.all_pins_mask()
        } else {
            0
        };
        Self {
            overrides,
            line: Vec::new(),
            overflow: false,
            button_masks: [
                layout.input_mask(1).unwrap_or(0),
                layout.input_mask(2).unwrap_or(0),
                combined,
            ],
        }
    }

    /// Feed received bytes. Returns the number of commands executed.
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        bytes
            .iter()
            .filter_map(|&b| self.feed_byte(b))
            .count()
    }

    /// Feed one byte, returning the command it completed, if any.
    pub fn feed_byte(&mut self, byte: u8) -> Option<ConsoleCommand> {
        if byte == b'\r' || byte == b'\n' {
            let command = self.complete_line();
            self.reset();
            return command;
        }
        if !self.overflow && self.line.push(byte).is_err() {
            self.overflow = true;
        }
        None
    }

    /// Bytes of the line collected so far
    pub fn pending(&self) -> &[u8] {
        &self.line
    }

    /// Discard the current line
    pub fn reset(&mut self) {
        self.line.clear();
        self.overflow = false;
    }

    fn complete_line(&self) -> Option<ConsoleCommand> {
        if self.line.is_empty() {
            return None;
        }
        let command = ConsoleCommand::parse(&self.line)?;
        match command {
            ConsoleCommand::Press(n) => {
                let mask = self.button_masks[usize::from(n - 1)];
                if mask == 0 {
                    switch_log!(debug, "BTN{}_PRESS: no such button", n);
                    return None;
                }
                self.overrides.set(mask);
                switch_log!(debug, "Matched BTN{}_PRESS", n);
            }
            ConsoleCommand::Release => {
                self.overrides.clear();
                switch_log!(debug, "Matched BTNx_RELEASE");
            }
        }
        Some(command)
    }
}
