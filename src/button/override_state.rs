//! Shared button override register.
//!
//! The debug console sets bits here; the GPIO sampling loop ORs them into the
//! raw pin state before debouncing, so an overridden pin reads as pressed.
//! One register is shared by every endpoint of the device and is passed by
//! reference to whoever needs it.

use core::cell::Cell;

/// Bitmask of pins currently forced to "pressed".
#[derive(Debug, Default)]
pub struct OverrideRegister {
    mask: Cell<u32>,
}

impl OverrideRegister {
    /// Create a register with no override active
    pub const fn new() -> Self {
        Self { mask: Cell::new(0) }
    }

    /// Force exactly the pins of `mask` to pressed
    pub fn set(&self, mask: u32) {
        self.mask.set(mask);
    }

    /// Release every override
    pub fn clear(&self) {
        self.mask.set(0);
    }

    /// Current override mask
    pub fn mask(&self) -> u32 {
        self.mask.get()
    }

    /// Whether every pin of `mask` is overridden
    pub fn is_active(&self, mask: u32) -> bool {
        mask != 0 && self.mask.get() & mask == mask
    }

    /// Raw pin state as seen by the debounce layer
    pub fn apply(&self, raw_pins: u32) -> u32 {
        raw_pins | self.mask.get()
    }
}
