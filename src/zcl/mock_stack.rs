//! Mock protocol engine for testing.
//!
//! This module provides a mock implementation of `ZclStack` that records every
//! registration, relayed command and attribute report so endpoint logic can be
//! tested without a radio or a vendor ZigBee stack. Storage is fixed-capacity;
//! traffic beyond capacity is dropped.
//!
//! ## Example
//!
//! ```rust
//! use zigbee_switch::zcl::mock_stack::MockStack;
//! use zigbee_switch::zcl::{OnOffCommand, ZclCommand, ZclStack};
//!
//! let mut mock = MockStack::new();
//! mock.send_command(2, ZclCommand::OnOff(OnOffCommand::Toggle)).unwrap();
//! assert_eq!(mock.sent_commands(), &[(2, ZclCommand::OnOff(OnOffCommand::Toggle))]);
//! ```

use heapless::Vec;

use crate::error::{Result, SwitchError};
use crate::zcl::attribute::AttributeValue;
use crate::zcl::cluster::{ClusterId, ClusterRole};
use crate::zcl::command::ZclCommand;
use crate::zcl::stack::ZclStack;

/// Maximum registered endpoints
pub const MAX_ENDPOINTS: usize = 4;
/// Maximum registered cluster roles
pub const MAX_CLUSTERS: usize = 32;
/// Maximum recorded commands or reports
pub const MAX_TRAFFIC: usize = 64;

/// One attribute report captured by [`MockStack`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    /// Reporting endpoint
    pub endpoint: u8,
    /// Reported cluster
    pub cluster: ClusterId,
    /// Reported attribute
    pub attribute: u16,
    /// Reported value
    pub value: AttributeValue,
}

/// Mock ZCL engine recording all traffic.
#[derive(Debug, Default)]
pub struct MockStack {
    /// Endpoints registered via `register_endpoint()`
    endpoints: Vec<u8, MAX_ENDPOINTS>,
    /// Cluster roles registered via `register_cluster()`
    clusters: Vec<(u8, ClusterId, ClusterRole), MAX_CLUSTERS>,
    /// Commands queued via `send_command()`
    sent: Vec<(u8, ZclCommand), MAX_TRAFFIC>,
    /// Reports sent via `report_attribute()`
    reports: Vec<Report, MAX_TRAFFIC>,
    /// Whether `send_command()` should fail
    fail_sends: bool,
    /// Number of cluster roles accepted before `register_cluster()` fails
    cluster_limit: Option<usize>,
}

impl MockStack {
    /// Create a new mock stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `send_command()` fail (simulates a full APS queue).
    pub fn set_fail_sends(&mut self, fail: bool) {
        self.fail_sends = fail;
    }

    /// Reject cluster registrations once `limit` roles are registered
    /// (simulates an engine running out of cluster slots).
    pub fn set_cluster_limit(&mut self, limit: Option<usize>) {
        self.cluster_limit = limit;
    }

    /// Endpoints currently registered
    pub fn endpoints(&self) -> &[u8] {
        &self.endpoints
    }

    /// Cluster roles registered so far
    pub fn registered_clusters(&self) -> &[(u8, ClusterId, ClusterRole)] {
        &self.clusters
    }

    /// Whether `(endpoint, cluster, role)` was registered
    pub fn has_cluster(&self, endpoint: u8, cluster: ClusterId, role: ClusterRole) -> bool {
        self.clusters.contains(&(endpoint, cluster, role))
    }

    /// Commands successfully queued, in order
    pub fn sent_commands(&self) -> &[(u8, ZclCommand)] {
        &self.sent
    }

    /// Attribute reports, in order
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Reports for one cluster attribute
    pub fn reports_for(&self, cluster: ClusterId, attribute: u16) -> Vec<AttributeValue, MAX_TRAFFIC> {
        self.reports
            .iter()
            .filter(|r| r.cluster == cluster && r.attribute == attribute)
            .map(|r| r.value)
            .collect()
    }

    /// Forget recorded commands and reports (registrations are kept).
    pub fn clear_traffic(&mut self) {
        self.sent.clear();
        self.reports.clear();
    }
}

impl ZclStack for MockStack {
    fn register_endpoint(&mut self, endpoint: u8) -> Result<()> {
        if !self.endpoints.contains(&endpoint) {
            self.endpoints.push(endpoint).map_err(|_| SwitchError::UnsupportedOperation)?;
        }
        Ok(())
    }

    fn register_cluster(&mut self, endpoint: u8, cluster: ClusterId, role: ClusterRole) -> Result<()> {
        if self.cluster_limit.is_some_and(|limit| self.clusters.len() >= limit) {
            return Err(SwitchError::UnsupportedOperation);
        }
        self.clusters
            .push((endpoint, cluster, role))
            .map_err(|_| SwitchError::UnsupportedOperation)
    }

    fn send_command(&mut self, endpoint: u8, command: ZclCommand) -> Result<()> {
        if self.fail_sends {
            return Err(SwitchError::send_failed());
        }
        self.sent.push((endpoint, command)).map_err(|_| SwitchError::send_failed())
    }

    fn report_attribute(
        &mut self,
        endpoint: u8,
        cluster: ClusterId,
        attribute: u16,
        value: AttributeValue,
    ) -> Result<()> {
        self.reports
            .push(Report {
                endpoint,
                cluster,
                attribute,
                value,
            })
            .map_err(|_| SwitchError::send_failed())
    }

    fn unregister_endpoint(&mut self, endpoint: u8) {
        self.endpoints.retain(|&e| e != endpoint);
        self.clusters.retain(|&(e, _, _)| e != endpoint);
    }
}
