//! Routing table for cluster callback events.
//!
//! Maps `(ClusterId, EventKind)` to the handler that processes the event.
//! Pairs without an entry are unsupported.

use crate::zcl::cluster::ClusterId;
use crate::zcl::event::EventKind;

/// Endpoint handler selected for a cluster event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Handler {
    /// Remote Off/On/Toggle on the On/Off server
    OnOffCommand,
    /// Remote write of the `OnOff` attribute
    OnOffWrite,
    /// Remote write of an On/Off Switch Configuration attribute
    SwitchConfigWrite,
    /// Identify / IdentifyQuery
    IdentifyCommand,
    /// Remote write of `IdentifyTime`
    IdentifyWrite,
    /// Add/Remove/RemoveAll group
    GroupsCommand,
    /// Refresh the attribute views
    Refresh,
}

/// Route table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Cluster of the event
    pub cluster: ClusterId,
    /// Kind of the event
    pub kind: EventKind,
    /// Handler to run
    pub handler: Handler,
}

const fn route(cluster: ClusterId, kind: EventKind, handler: Handler) -> Route {
    Route { cluster, kind, handler }
}

/// Every supported `(cluster, event kind)` pair
pub const ROUTES: [Route; 10] = [
    route(ClusterId::OnOff, EventKind::ClusterCommand, Handler::OnOffCommand),
    route(ClusterId::OnOff, EventKind::AttributeWriteCompleted, Handler::OnOffWrite),
    route(ClusterId::OnOff, EventKind::ClusterUpdate, Handler::Refresh),
    route(ClusterId::OnOffSwitchConfig, EventKind::AttributeWriteCompleted, Handler::SwitchConfigWrite),
    route(ClusterId::OnOffSwitchConfig, EventKind::ClusterUpdate, Handler::Refresh),
    route(ClusterId::Identify, EventKind::ClusterCommand, Handler::IdentifyCommand),
    route(ClusterId::Identify, EventKind::AttributeWriteCompleted, Handler::IdentifyWrite),
    route(ClusterId::Identify, EventKind::ClusterUpdate, Handler::Refresh),
    route(ClusterId::Groups, EventKind::ClusterCommand, Handler::GroupsCommand),
    route(ClusterId::MultistateInput, EventKind::ClusterUpdate, Handler::Refresh),
];

/// Find the handler for an event
pub fn lookup(cluster: ClusterId, kind: EventKind) -> Option<Handler> {
    ROUTES
        .iter()
        .find(|r| r.cluster == cluster && r.kind == kind)
        .map(|r| r.handler)
}
