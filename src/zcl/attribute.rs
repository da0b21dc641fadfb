//! Attribute identifiers and values exposed by the switch endpoint.
//!
//! The attribute records held by [`ClusterViews`](crate::endpoint::ClusterViews)
//! are copies of the endpoint's authoritative state; these identifiers are what
//! the protocol engine uses to address them.

use crate::error::{Result, SwitchError};

/// On/Off: `OnOff` attribute (boolean)
pub const ATTR_ON_OFF: u16 = 0x0000;

/// On/Off Switch Configuration: `SwitchType` (enum8)
pub const ATTR_SWITCH_TYPE: u16 = 0x0000;
/// On/Off Switch Configuration: `SwitchActions` (enum8)
pub const ATTR_SWITCH_ACTIONS: u16 = 0x0010;
/// Manufacturer specific: switch mode (toggle/momentary/multifunction)
pub const ATTR_SWITCH_MODE: u16 = 0xff00;
/// Manufacturer specific: which click pattern drives the relay
pub const ATTR_RELAY_MODE: u16 = 0xff01;
/// Manufacturer specific: maximum pause between clicks (ms)
pub const ATTR_MAX_PAUSE: u16 = 0xff02;
/// Manufacturer specific: minimum long press duration (ms)
pub const ATTR_MIN_LONG_PRESS: u16 = 0xff03;
/// Manufacturer specific: what a long press does
pub const ATTR_LONG_PRESS_MODE: u16 = 0xff04;
/// Manufacturer specific: server or client operation mode
pub const ATTR_OPERATION_MODE: u16 = 0xff05;

/// Multistate Input: `PresentValue` (uint16)
pub const ATTR_PRESENT_VALUE: u16 = 0x0055;

/// Identify: `IdentifyTime` (uint16, seconds)
pub const ATTR_IDENTIFY_TIME: u16 = 0x0000;

/// Groups: `NameSupport` (bitmap8)
pub const ATTR_NAME_SUPPORT: u16 = 0x0000;

/// Typed attribute value as written by, or reported to, the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttributeValue {
    /// Boolean (0x10)
    Bool(bool),
    /// 8-bit enumeration (0x30)
    Enum8(u8),
    /// Unsigned 16-bit integer (0x21)
    U16(u16),
}

impl AttributeValue {
    /// Interpret the value as a boolean.
    pub fn as_bool(self) -> Result<bool> {
        match self {
            AttributeValue::Bool(v) => Ok(v),
            AttributeValue::Enum8(v) if v <= 1 => Ok(v == 1),
            _ => Err(SwitchError::invalid_value()),
        }
    }

    /// Interpret the value as an 8-bit enumeration.
    pub fn as_enum8(self) -> Result<u8> {
        match self {
            AttributeValue::Enum8(v) => Ok(v),
            _ => Err(SwitchError::invalid_value()),
        }
    }

    /// Interpret the value as an unsigned 16-bit integer.
    pub fn as_u16(self) -> Result<u16> {
        match self {
            AttributeValue::U16(v) => Ok(v),
            AttributeValue::Enum8(v) => Ok(u16::from(v)),
            AttributeValue::Bool(_) => Err(SwitchError::invalid_value()),
        }
    }
}
