//! Callback events delivered by the protocol engine.
//!
//! Every cluster callback is flattened into one tagged [`ClusterEvent`]; the
//! endpoint routes it by `(ClusterId, EventKind)` instead of per-cluster
//! handler overrides.

use heapless::Vec;

use crate::error::{Result, SwitchError};
use crate::zcl::attribute::AttributeValue;
use crate::zcl::cluster::ClusterId;

/// Maximum inbound command payload kept in an event
pub const MAX_EVENT_PAYLOAD: usize = 16;

/// Discriminant of [`ClusterEventKind`], used as a routing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    /// A cluster command was received
    ClusterCommand,
    /// A remote attribute write was applied by the protocol engine
    AttributeWriteCompleted,
    /// The protocol engine refreshed a cluster (timer tick, etc.)
    ClusterUpdate,
}

/// Payload of a cluster callback event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClusterEventKind {
    /// Command `id` with its raw payload
    Command {
        /// ZCL command identifier
        id: u8,
        /// Raw command payload
        payload: Vec<u8, MAX_EVENT_PAYLOAD>,
    },
    /// Attribute `attribute` now holds `value`
    AttributeWriteCompleted {
        /// Attribute identifier
        attribute: u16,
        /// New value
        value: AttributeValue,
    },
    /// Cluster refresh without further data
    Update,
}

/// A cluster callback event addressed to this endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClusterEvent {
    /// Cluster the event belongs to
    pub cluster: ClusterId,
    /// Event data
    pub kind: ClusterEventKind,
}

impl ClusterEvent {
    /// Build a command event, copying the payload.
    ///
    /// # Errors
    /// Returns `SwitchError::Zcl` if the payload exceeds [`MAX_EVENT_PAYLOAD`]
    pub fn command(cluster: ClusterId, id: u8, payload: &[u8]) -> Result<Self> {
        let payload = Vec::from_slice(payload).map_err(|_| SwitchError::invalid_payload())?;
        Ok(Self {
            cluster,
            kind: ClusterEventKind::Command { id, payload },
        })
    }

    /// Build an attribute-write-completed event.
    pub fn attribute_written(cluster: ClusterId, attribute: u16, value: AttributeValue) -> Self {
        Self {
            cluster,
            kind: ClusterEventKind::AttributeWriteCompleted { attribute, value },
        }
    }

    /// Build a cluster update event.
    pub fn update(cluster: ClusterId) -> Self {
        Self {
            cluster,
            kind: ClusterEventKind::Update,
        }
    }

    /// Routing key of this event.
    pub fn event_kind(&self) -> EventKind {
        match self.kind {
            ClusterEventKind::Command { .. } => EventKind::ClusterCommand,
            ClusterEventKind::AttributeWriteCompleted { .. } => EventKind::AttributeWriteCompleted,
            ClusterEventKind::Update => EventKind::ClusterUpdate,
        }
    }
}

/// Network membership changes of the whole device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceEvent {
    /// Device joined or rejoined the network
    Joined,
    /// Device left the network
    Left,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kinds() {
        let cmd = ClusterEvent::command(ClusterId::OnOff, 0x02, &[]).unwrap();
        assert_eq!(cmd.event_kind(), EventKind::ClusterCommand);

        let write = ClusterEvent::attribute_written(ClusterId::OnOff, 0, AttributeValue::Bool(true));
        assert_eq!(write.event_kind(), EventKind::AttributeWriteCompleted);

        assert_eq!(ClusterEvent::update(ClusterId::Identify).event_kind(), EventKind::ClusterUpdate);
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let payload = [0u8; MAX_EVENT_PAYLOAD + 1];
        assert!(ClusterEvent::command(ClusterId::Groups, 0x00, &payload).is_err());
    }
}
