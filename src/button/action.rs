//! Raw button events and the semantic actions derived from them.

use crate::config::InputId;

/// Edge reported by the (external) debounce layer for an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEdge {
    /// Input became pressed
    Press,
    /// Input was released
    Release,
    /// Input has been held for the minimum long-press duration
    LongPressStart,
    /// Input is still held (periodic while held)
    LongPressHeld,
    /// A click sequence finished with the given number of clicks
    MultiClick(u8),
}

/// A discrete button event for one input (single pin or combined pins).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    /// Pins that produced the event (one bit per pin)
    pub input_mask: u32,
    /// What happened
    pub edge: ButtonEdge,
    /// How long the input had been pressed when the event fired (ms)
    pub duration_ms: u16,
}

impl ButtonEvent {
    /// Create an event with zero duration
    pub const fn new(input_mask: u32, edge: ButtonEdge) -> Self {
        Self {
            input_mask,
            edge,
            duration_ms: 0,
        }
    }

    /// Set the press duration
    #[must_use]
    pub const fn with_duration(mut self, duration_ms: u16) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// What a semantic action asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActionKind {
    /// Invert on/off
    Toggle,
    /// Switch on
    On,
    /// Switch off
    Off,
    /// Start (or continue) increasing the level
    LevelMoveUp,
    /// Start (or continue) decreasing the level
    LevelMoveDown,
    /// Stop a level move
    LevelStop,
}

/// Where a semantic action originated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActionSource {
    /// A local logical input (1-based)
    Input(InputId),
    /// A remote command or attribute write
    Network,
}

/// A button or network event resolved into what the switch should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SemanticAction {
    /// Requested action
    pub kind: ActionKind,
    /// Origin of the action
    pub source: ActionSource,
    /// Part of a sustained (long press) gesture
    pub long_press: bool,
}

impl SemanticAction {
    /// Short action from a local input
    pub const fn from_input(kind: ActionKind, input: InputId) -> Self {
        Self {
            kind,
            source: ActionSource::Input(input),
            long_press: false,
        }
    }

    /// Sustained action from a local input
    pub const fn long_from_input(kind: ActionKind, input: InputId) -> Self {
        Self {
            kind,
            source: ActionSource::Input(input),
            long_press: true,
        }
    }

    /// Action caused by the network
    pub const fn from_network(kind: ActionKind) -> Self {
        Self {
            kind,
            source: ActionSource::Network,
            long_press: false,
        }
    }

    /// Whether the action came from a local button
    pub const fn is_local(&self) -> bool {
        matches!(self.source, ActionSource::Input(_))
    }
}

/// Value reported through the Multistate Input `PresentValue` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum MultistateAction {
    /// Long press started
    Hold = 0,
    /// Single click
    Single = 1,
    /// Double click
    Double = 2,
    /// Triple click
    Triple = 3,
    /// Released after a long press
    Release = 255,
}

impl MultistateAction {
    /// Attribute value
    pub const fn value(self) -> u16 {
        self as u16
    }
}
