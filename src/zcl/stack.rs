//! Protocol engine abstraction for the switch endpoint.
//!
//! This module provides the `ZclStack` trait that abstracts the vendor ZCL/APS
//! engine the endpoint runs on, enabling:
//! - Testability through mock implementations
//! - Flexibility to run on different ZigBee stacks
//! - Explicit per-role cluster registration instead of descriptor memory layout
//!
//! ## Design Pattern
//!
//! High-level logic (`SwitchEndpoint`, `BindingDispatcher`) depends on this
//! abstraction; the stack glue for a concrete chip implements it. All calls are
//! non-blocking: a send only queues a frame, completion is reported later on the
//! same event loop.
//!
//! ## Example
//!
//! ```rust
//! use zigbee_switch::zcl::{AttributeValue, ClusterId, ClusterRole, ZclCommand, ZclStack};
//!
//! struct LoggingStack;
//!
//! impl ZclStack for LoggingStack {
//!     fn register_cluster(&mut self, _ep: u8, _cluster: ClusterId, _role: ClusterRole) -> zigbee_switch::Result<()> {
//!         Ok(())
//!     }
//!
//!     fn send_command(&mut self, _ep: u8, _command: ZclCommand) -> zigbee_switch::Result<()> {
//!         Ok(())
//!     }
//!
//!     fn report_attribute(&mut self, _ep: u8, _cluster: ClusterId, _attr: u16, _value: AttributeValue) -> zigbee_switch::Result<()> {
//!         Ok(())
//!     }
//! }
//! ```

use crate::error::Result;
use crate::zcl::attribute::AttributeValue;
use crate::zcl::cluster::{ClusterId, ClusterRole};
use crate::zcl::command::ZclCommand;

/// Non-blocking interface to the ZCL protocol engine.
pub trait ZclStack {
    /// Register the endpoint descriptor with the engine.
    ///
    /// Default implementation does nothing. Override if the engine needs the
    /// endpoint registered before its clusters.
    fn register_endpoint(&mut self, _endpoint: u8) -> Result<()> {
        Ok(())
    }

    /// Register one cluster instance (one role) on the endpoint.
    ///
    /// Called once per role during `SwitchEndpoint::init()`.
    fn register_cluster(&mut self, endpoint: u8, cluster: ClusterId, role: ClusterRole) -> Result<()>;

    /// Queue `command` for every device bound to `(endpoint, command.cluster())`.
    ///
    /// The engine fans the frame out to all binding table entries (APS bound
    /// addressing). Returns as soon as the frame is queued.
    ///
    /// # Errors
    ///
    /// Returns `SwitchError::Command` if the frame could not be queued.
    fn send_command(&mut self, endpoint: u8, command: ZclCommand) -> Result<()>;

    /// Send an attribute report for a server attribute of the endpoint.
    fn report_attribute(
        &mut self,
        endpoint: u8,
        cluster: ClusterId,
        attribute: u16,
        value: AttributeValue,
    ) -> Result<()>;

    /// Release engine resources held for the endpoint.
    ///
    /// Default implementation does nothing.
    fn unregister_endpoint(&mut self, _endpoint: u8) {
        // Default: no-op
    }
}

impl<T: ZclStack + ?Sized> ZclStack for &mut T {
    fn register_endpoint(&mut self, endpoint: u8) -> Result<()> {
        (**self).register_endpoint(endpoint)
    }

    fn register_cluster(&mut self, endpoint: u8, cluster: ClusterId, role: ClusterRole) -> Result<()> {
        (**self).register_cluster(endpoint, cluster, role)
    }

    fn send_command(&mut self, endpoint: u8, command: ZclCommand) -> Result<()> {
        (**self).send_command(endpoint, command)
    }

    fn report_attribute(
        &mut self,
        endpoint: u8,
        cluster: ClusterId,
        attribute: u16,
        value: AttributeValue,
    ) -> Result<()> {
        (**self).report_attribute(endpoint, cluster, attribute, value)
    }

    fn unregister_endpoint(&mut self, endpoint: u8) {
        (**self).unregister_endpoint(endpoint);
    }
}
