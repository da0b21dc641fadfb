//! ZCL commands the switch endpoint sends and receives.
//!
//! Outbound commands ([`ZclCommand`]) are relayed to bound devices through the
//! On/Off and Level Control client clusters. Inbound commands addressed to the
//! endpoint's server clusters are decoded with the `decode` helpers.
//!
//! ## Payload Format
//!
//! ```text
//! On/Off      Off (0x00), On (0x01), Toggle (0x02)     no payload
//! Level       Move (0x01)                               [move_mode, rate]
//!             Stop (0x03)                               no payload
//! Identify    Identify (0x00)                           [time_lo, time_hi]
//!             IdentifyQuery (0x01)                      no payload
//! Groups      AddGroup (0x00)                           [id_lo, id_hi, name_len, name..]
//!             RemoveGroup (0x03)                        [id_lo, id_hi]
//!             RemoveAllGroups (0x04)                    no payload
//! ```
//!
//! ## Example
//!
//! ```rust
//! use zigbee_switch::zcl::{LevelCommand, MoveMode, ZclCommand};
//!
//! let cmd = ZclCommand::Level(LevelCommand::Move { mode: MoveMode::Up, rate: 80 });
//! let mut buf = [0u8; 4];
//! let len = cmd.encode_payload(&mut buf)?;
//! assert_eq!(&buf[..len], &[0x00, 80]);
//! # Ok::<(), zigbee_switch::SwitchError>(())
//! ```

use crate::error::{Result, SwitchError};
use crate::zcl::cluster::ClusterId;

/// Default Level Control move rate (units per second) used for hold-to-dim.
pub const DEFAULT_MOVE_RATE: u8 = 80;

/// Largest payload an outbound command can carry.
pub const MAX_COMMAND_PAYLOAD: usize = 2;

// =============================================================================
// On/Off
// =============================================================================

/// On/Off cluster commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OnOffCommand {
    /// Switch off (0x00)
    Off = 0x00,
    /// Switch on (0x01)
    On = 0x01,
    /// Toggle (0x02)
    Toggle = 0x02,
}

impl OnOffCommand {
    /// Decode an inbound On/Off command identifier.
    pub fn decode(command_id: u8) -> Result<Self> {
        match command_id {
            0x00 => Ok(OnOffCommand::Off),
            0x01 => Ok(OnOffCommand::On),
            0x02 => Ok(OnOffCommand::Toggle),
            _ => Err(SwitchError::unsupported_command()),
        }
    }
}

// =============================================================================
// Level Control
// =============================================================================

/// Direction of a Level Control move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MoveMode {
    /// Increase level (0x00)
    Up = 0x00,
    /// Decrease level (0x01)
    Down = 0x01,
}

/// Level Control cluster commands sent by the switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LevelCommand {
    /// Start moving the level continuously
    Move {
        /// Direction
        mode: MoveMode,
        /// Units per second, 0xFF selects the device default
        rate: u8,
    },
    /// Stop any move in progress
    Stop,
}

impl LevelCommand {
    /// ZCL command identifier
    pub const fn command_id(&self) -> u8 {
        match self {
            LevelCommand::Move { .. } => 0x01,
            LevelCommand::Stop => 0x03,
        }
    }
}

// =============================================================================
// Outbound command envelope
// =============================================================================

/// A command relayed to bound devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ZclCommand {
    /// On/Off client command
    OnOff(OnOffCommand),
    /// Level Control client command
    Level(LevelCommand),
}

impl ZclCommand {
    /// Cluster the command belongs to
    pub const fn cluster(&self) -> ClusterId {
        match self {
            ZclCommand::OnOff(_) => ClusterId::OnOff,
            ZclCommand::Level(_) => ClusterId::LevelControl,
        }
    }

    /// ZCL command identifier within its cluster
    pub const fn command_id(&self) -> u8 {
        match self {
            ZclCommand::OnOff(cmd) => *cmd as u8,
            ZclCommand::Level(cmd) => cmd.command_id(),
        }
    }

    /// Encode the command payload into `buf`.
    ///
    /// # Returns
    /// Number of bytes written (0 for commands without payload)
    ///
    /// # Errors
    /// Returns `SwitchError::Command` if `buf` cannot hold the payload
    pub fn encode_payload(&self, buf: &mut [u8]) -> Result<usize> {
        match self {
            ZclCommand::OnOff(_) | ZclCommand::Level(LevelCommand::Stop) => Ok(0),
            ZclCommand::Level(LevelCommand::Move { mode, rate }) => {
                if buf.len() < 2 {
                    return Err(SwitchError::payload_too_large());
                }
                buf[0] = *mode as u8;
                buf[1] = *rate;
                Ok(2)
            }
        }
    }
}

// =============================================================================
// Inbound server commands
// =============================================================================

/// Identify cluster commands received by the Identify server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IdentifyCommand {
    /// Start (or stop, with 0) identifying for the given number of seconds
    Identify(u16),
    /// Ask whether the endpoint is currently identifying
    IdentifyQuery,
}

impl IdentifyCommand {
    /// Decode an inbound Identify command
    pub fn decode(command_id: u8, payload: &[u8]) -> Result<Self> {
        match command_id {
            0x00 => {
                let time = read_u16(payload, 0)?;
                Ok(IdentifyCommand::Identify(time))
            }
            0x01 => Ok(IdentifyCommand::IdentifyQuery),
            _ => Err(SwitchError::unsupported_command()),
        }
    }
}

/// Groups cluster commands received by the Groups server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GroupsCommand {
    /// Add the endpoint to a group (group name is ignored)
    Add(u16),
    /// Remove the endpoint from a group
    Remove(u16),
    /// Remove the endpoint from every group
    RemoveAll,
}

impl GroupsCommand {
    /// Decode an inbound Groups command
    pub fn decode(command_id: u8, payload: &[u8]) -> Result<Self> {
        match command_id {
            0x00 => Ok(GroupsCommand::Add(read_u16(payload, 0)?)),
            0x03 => Ok(GroupsCommand::Remove(read_u16(payload, 0)?)),
            0x04 => Ok(GroupsCommand::RemoveAll),
            _ => Err(SwitchError::unsupported_command()),
        }
    }
}

fn read_u16(payload: &[u8], offset: usize) -> Result<u16> {
    match payload.get(offset..offset + 2) {
        Some(bytes) => Ok(u16::from_le_bytes([bytes[0], bytes[1]])),
        None => Err(SwitchError::invalid_payload()),
    }
}
