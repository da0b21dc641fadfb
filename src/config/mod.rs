//! Durable endpoint configuration.
//!
//! [`Configuration`] holds everything that survives a reboot: which pins drive
//! the endpoint, the operating mode, the On/Off Switch Configuration settings
//! and the group memberships. [`ButtonLayout`] describes the physical buttons
//! of the device and replaces per-board compile-time button counts.
//!
//! ## Example
//!
//! ```rust
//! use zigbee_switch::config::{ButtonLayout, Configuration, EndpointMode};
//!
//! let layout = ButtonLayout::new(&[4, 5])?;
//! assert_eq!(layout.logical_inputs(), 3); // left, right, both
//! assert_eq!(layout.input_mask(3), Some(0x30));
//!
//! let cfg = Configuration::default();
//! assert_eq!(cfg.effective_mode(), EndpointMode::ServerCapable);
//! # Ok::<(), zigbee_switch::SwitchError>(())
//! ```

use heapless::Vec;

use crate::error::{Result, SwitchError};

pub mod record;
pub mod store;

#[doc(inline)]
pub use store::{ConfigurationStore, MemoryMedium, RecordStore, StorageMedium};

/// Maximum number of groups an endpoint can be a member of
pub const MAX_GROUPS: usize = 8;

/// Maximum number of physical buttons a device can declare
pub const MAX_BUTTONS: usize = 4;

// =============================================================================
// Switch behaviour settings (On/Off Switch Configuration cluster)
// =============================================================================

/// Endpoint operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndpointMode {
    /// Pure command source: no local state, no relay
    ClientOnly,
    /// Owns the on/off state and may also relay to bound devices
    #[default]
    ServerCapable,
}

/// Physical behaviour of the switch (`switch_mode` attribute)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SwitchType {
    /// Rocker switch: both press and release are actions
    #[default]
    Toggle = 0,
    /// Push button: only the press is an action
    Momentary = 1,
    /// Clicks, multi-clicks and long presses are distinguished
    Multifunction = 2,
}

/// Actions of a toggle/momentary switch (`switch_actions` attribute)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SwitchActions {
    /// Press sends On, release sends Off
    OnOff = 0,
    /// Press sends Off, release sends On
    OffOn = 1,
    /// Press and release both toggle
    #[default]
    Toggle = 2,
}

/// Which gesture of a multifunction switch drives the relay (`relay_mode`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum RelayMode {
    /// Relay is never toggled by the button
    Unlinked = 0,
    /// Toggle on the press edge
    Front = 1,
    /// Toggle on a single click
    #[default]
    Single = 2,
    /// Toggle on a double click
    Double = 3,
    /// Toggle on a triple click
    Triple = 4,
    /// Toggle when a long press starts
    Long = 5,
}

/// What a long press does on a multifunction switch (`long_press_mode`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum LongPressMode {
    /// Only reported through Multistate Input
    #[default]
    None = 0,
    /// Hold to dim up
    LevelCtrlUp = 1,
    /// Hold to dim down
    LevelCtrlDown = 2,
}

macro_rules! impl_try_from_u8 {
    ($ty:ident { $($value:literal => $variant:ident),+ $(,)? }) => {
        impl TryFrom<u8> for $ty {
            type Error = SwitchError;

            fn try_from(value: u8) -> Result<Self> {
                match value {
                    $($value => Ok($ty::$variant),)+
                    _ => Err(SwitchError::invalid_value()),
                }
            }
        }
    };
}

impl_try_from_u8!(SwitchType { 0 => Toggle, 1 => Momentary, 2 => Multifunction });
impl_try_from_u8!(SwitchActions { 0 => OnOff, 1 => OffOn, 2 => Toggle });
impl_try_from_u8!(RelayMode { 0 => Unlinked, 1 => Front, 2 => Single, 3 => Double, 4 => Triple, 5 => Long });
impl_try_from_u8!(LongPressMode { 0 => None, 1 => LevelCtrlUp, 2 => LevelCtrlDown });

impl TryFrom<u8> for EndpointMode {
    type Error = SwitchError;

    /// `operation_mode` attribute encoding: 0 = server, 1 = client
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(EndpointMode::ServerCapable),
            1 => Ok(EndpointMode::ClientOnly),
            _ => Err(SwitchError::invalid_value()),
        }
    }
}

impl EndpointMode {
    /// `operation_mode` attribute encoding
    pub const fn to_u8(self) -> u8 {
        match self {
            EndpointMode::ServerCapable => 0,
            EndpointMode::ClientOnly => 1,
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Default maximum pause between clicks of a multi-click (ms)
pub const DEFAULT_MAX_PAUSE_MS: u16 = 250;
/// Default minimum duration of a long press (ms)
pub const DEFAULT_MIN_LONG_PRESS_MS: u16 = 1000;

/// Durable configuration of one switch endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Configuration {
    /// GPIO pins whose combined press is this endpoint's input
    pub pin_mask: u32,
    /// Operating mode requested by the user
    pub mode: EndpointMode,
    /// Server role is unavailable on this endpoint (no relay wired)
    pub disable_server: bool,
    /// Physical behaviour of the switch
    pub switch_type: SwitchType,
    /// Actions of a toggle/momentary switch
    pub switch_actions: SwitchActions,
    /// Which multifunction gesture drives the relay
    pub relay_mode: RelayMode,
    /// What a long press does
    pub long_press_mode: LongPressMode,
    /// Maximum pause between clicks (ms), consumed by the button layer
    pub max_pause_ms: u16,
    /// Minimum long press duration (ms)
    pub min_long_press_ms: u16,
    /// Mirror local actions to bound devices in server mode
    pub relay_to_bound: bool,
    /// Keep a local level alongside on/off
    pub local_level: bool,
    /// Persist on/off changes and restore them at boot
    pub restore_last_state: bool,
    /// Last persisted on/off value (used with `restore_last_state`)
    pub last_on: bool,
    /// Groups the endpoint is a member of
    pub groups: Vec<u16, MAX_GROUPS>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            pin_mask: 0,
            mode: EndpointMode::ServerCapable,
            disable_server: false,
            switch_type: SwitchType::Toggle,
            switch_actions: SwitchActions::Toggle,
            relay_mode: RelayMode::Single,
            long_press_mode: LongPressMode::None,
            max_pause_ms: DEFAULT_MAX_PAUSE_MS,
            min_long_press_ms: DEFAULT_MIN_LONG_PRESS_MS,
            relay_to_bound: true,
            local_level: false,
            restore_last_state: false,
            last_on: false,
            groups: Vec::new(),
        }
    }
}

impl Configuration {
    /// Mode the endpoint actually runs in.
    ///
    /// An endpoint without a usable server role is client-only regardless of
    /// the requested mode.
    pub fn effective_mode(&self) -> EndpointMode {
        if self.disable_server {
            EndpointMode::ClientOnly
        } else {
            self.mode
        }
    }

    /// Add a group membership. Returns `false` if already a member or full.
    pub fn add_group(&mut self, group: u16) -> bool {
        if self.groups.contains(&group) {
            return false;
        }
        self.groups.push(group).is_ok()
    }

    /// Remove a group membership. Returns `true` if it was present.
    pub fn remove_group(&mut self, group: u16) -> bool {
        let before = self.groups.len();
        self.groups.retain(|&g| g != group);
        self.groups.len() != before
    }
}

// =============================================================================
// Button layout
// =============================================================================

/// Logical input identifier (1-based)
pub type InputId = u8;

/// Physical buttons of the device, validated at initialization.
///
/// Logical input `n` (`1..=count`) is the `n`-th button. When the device has
/// more than one button, input `count + 1` stands for "all buttons pressed
/// together" and maps to the union of every pin.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonLayout {
    pins: Vec<u8, MAX_BUTTONS>,
}

impl ButtonLayout {
    /// Validate a list of GPIO pins.
    ///
    /// # Errors
    ///
    /// - `Config(InvalidButtonCount)` for zero or more than [`MAX_BUTTONS`] pins
    /// - `Config(InvalidPin)` for a pin above 31
    /// - `Config(DuplicatePin)` when a pin is listed twice
    pub fn new(pins: &[u8]) -> Result<Self> {
        if pins.is_empty() || pins.len() > MAX_BUTTONS {
            return Err(SwitchError::invalid_button_count());
        }
        let mut seen = 0u32;
        let mut list = Vec::new();
        for &pin in pins {
            if pin > 31 {
                return Err(SwitchError::invalid_pin());
            }
            if seen & (1 << pin) != 0 {
                return Err(SwitchError::duplicate_pin());
            }
            seen |= 1 << pin;
            list.push(pin).map_err(|_| SwitchError::invalid_button_count())?;
        }
        Ok(Self { pins: list })
    }

    /// Number of physical buttons
    pub fn button_count(&self) -> usize {
        self.pins.len()
    }

    /// Number of logical inputs, including the combined one
    pub fn logical_inputs(&self) -> usize {
        if self.pins.len() > 1 {
            self.pins.len() + 1
        } else {
            1
        }
    }

    /// Pin mask of every button
    pub fn all_pins_mask(&self) -> u32 {
        self.pins.iter().fold(0, |mask, &pin| mask | (1 << pin))
    }

    /// Pin mask of a logical input, `None` if the input does not exist
    pub fn input_mask(&self, input: InputId) -> Option<u32> {
        let index = usize::from(input);
        if index == 0 {
            return None;
        }
        if index <= self.pins.len() {
            return Some(1 << self.pins[index - 1]);
        }
        if index == self.pins.len() + 1 && self.pins.len() > 1 {
            return Some(self.all_pins_mask());
        }
        None
    }

    /// Logical input whose mask equals `mask` exactly
    pub fn input_for_mask(&self, mask: u32) -> Option<InputId> {
        (1..=self.logical_inputs())
            .filter_map(|i| InputId::try_from(i).ok())
            .find(|&i| self.input_mask(i) == Some(mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_mode() {
        let mut cfg = Configuration::default();
        assert_eq!(cfg.effective_mode(), EndpointMode::ServerCapable);

        cfg.mode = EndpointMode::ClientOnly;
        assert_eq!(cfg.effective_mode(), EndpointMode::ClientOnly);

        cfg.mode = EndpointMode::ServerCapable;
        cfg.disable_server = true;
        assert_eq!(cfg.effective_mode(), EndpointMode::ClientOnly);
    }

    #[test]
    fn test_group_membership() {
        let mut cfg = Configuration::default();
        assert!(cfg.add_group(0x0001));
        assert!(!cfg.add_group(0x0001));
        for g in 2..=MAX_GROUPS as u16 {
            assert!(cfg.add_group(g));
        }
        assert!(!cfg.add_group(0x00FF));
        assert!(cfg.remove_group(0x0001));
        assert!(!cfg.remove_group(0x0001));
        assert_eq!(cfg.groups.len(), MAX_GROUPS - 1);
    }

    #[test]
    fn test_enum_decoding() {
        assert_eq!(SwitchType::try_from(2).unwrap(), SwitchType::Multifunction);
        assert_eq!(RelayMode::try_from(5).unwrap(), RelayMode::Long);
        assert_eq!(LongPressMode::try_from(1).unwrap(), LongPressMode::LevelCtrlUp);
        assert_eq!(SwitchActions::try_from(1).unwrap(), SwitchActions::OffOn);
        assert!(RelayMode::try_from(6).is_err());
        assert_eq!(EndpointMode::try_from(1).unwrap(), EndpointMode::ClientOnly);
        assert_eq!(EndpointMode::ClientOnly.to_u8(), 1);
        assert!(EndpointMode::try_from(2).is_err());
    }

    #[test]
    fn test_two_button_layout() {
        let layout = ButtonLayout::new(&[9, 10]).unwrap();
        assert_eq!(layout.button_count(), 2);
        assert_eq!(layout.logical_inputs(), 3);
        assert_eq!(layout.input_mask(1), Some(1 << 9));
        assert_eq!(layout.input_mask(2), Some(1 << 10));
        assert_eq!(layout.input_mask(3), Some((1 << 9) | (1 << 10)));
        assert_eq!(layout.input_mask(0), None);
        assert_eq!(layout.input_mask(4), None);
        assert_eq!(layout.input_for_mask(1 << 10), Some(2));
        assert_eq!(layout.input_for_mask((1 << 9) | (1 << 10)), Some(3));
        assert_eq!(layout.input_for_mask(1 << 11), None);
    }

    #[test]
    fn test_single_button_has_no_combined_input() {
        let layout = ButtonLayout::new(&[4]).unwrap();
        assert_eq!(layout.logical_inputs(), 1);
        assert_eq!(layout.input_mask(2), None);
    }

    #[test]
    fn test_layout_validation() {
        assert!(ButtonLayout::new(&[]).is_err());
        assert!(ButtonLayout::new(&[1, 2, 3, 4, 5]).is_err());
        match ButtonLayout::new(&[32]) {
            Err(SwitchError::Config(e)) => assert!(e.is_invalid_pin()),
            other => panic!("unexpected result: {other:?}"),
        }
        match ButtonLayout::new(&[3, 3]) {
            Err(SwitchError::Config(e)) => assert!(e.is_invalid_pin()),
            other => panic!("unexpected result: {other:?}"),
        }
        match ButtonLayout::new(&[]) {
            Err(SwitchError::Config(e)) => assert!(e.is_invalid_button_count()),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
