//! ZCL cluster identifiers and roles hosted by the switch endpoint.

use crate::error::{Result, SwitchError};

/// Clusters the switch endpoint knows how to host or address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum ClusterId {
    /// Identify (0x0003)
    Identify = 0x0003,
    /// Groups (0x0004)
    Groups = 0x0004,
    /// On/Off (0x0006)
    OnOff = 0x0006,
    /// On/Off Switch Configuration (0x0007)
    OnOffSwitchConfig = 0x0007,
    /// Level Control (0x0008)
    LevelControl = 0x0008,
    /// Multistate Input (Basic) (0x0012)
    MultistateInput = 0x0012,
}

impl ClusterId {
    /// Raw 16-bit cluster identifier as used on the wire.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Short name used in log messages.
    pub const fn name(self) -> &'static str {
        match self {
            ClusterId::Identify => "Identify",
            ClusterId::Groups => "Groups",
            ClusterId::OnOff => "OnOff",
            ClusterId::OnOffSwitchConfig => "OOSC",
            ClusterId::LevelControl => "LevelControl",
            ClusterId::MultistateInput => "MultistateInput",
        }
    }
}

impl TryFrom<u16> for ClusterId {
    type Error = SwitchError;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0x0003 => Ok(ClusterId::Identify),
            0x0004 => Ok(ClusterId::Groups),
            0x0006 => Ok(ClusterId::OnOff),
            0x0007 => Ok(ClusterId::OnOffSwitchConfig),
            0x0008 => Ok(ClusterId::LevelControl),
            0x0012 => Ok(ClusterId::MultistateInput),
            _ => Err(SwitchError::unsupported_cluster()),
        }
    }
}

/// Client or server instantiation of a cluster.
///
/// Independent of the endpoint's [`EndpointMode`](crate::config::EndpointMode):
/// a client-only switch still hosts server instances of OOSC and Multistate Input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClusterRole {
    /// Receives commands, owns attributes
    Server,
    /// Sends commands to servers on bound devices
    Client,
}

/// Cluster roles every switch endpoint registers.
pub const CLIENT_MODE_ROLES: [(ClusterId, ClusterRole); 5] = [
    (ClusterId::OnOff, ClusterRole::Client),
    (ClusterId::OnOffSwitchConfig, ClusterRole::Server),
    (ClusterId::MultistateInput, ClusterRole::Server),
    (ClusterId::LevelControl, ClusterRole::Client),
    (ClusterId::Identify, ClusterRole::Server),
];

/// Additional cluster roles registered when the endpoint runs in server mode.
pub const SERVER_MODE_ROLES: [(ClusterId, ClusterRole); 2] = [
    (ClusterId::OnOff, ClusterRole::Server),
    (ClusterId::Groups, ClusterRole::Server),
];
