//! Read-only view of the network binding table.
//!
//! Bindings are created and removed by the network (ZDO bind/unbind requests);
//! the switch core only asks whether anything is bound before relaying.

use heapless::Vec;

use crate::zcl::cluster::ClusterId;

/// Maximum number of entries held by [`StaticBindings`]
pub const MAX_BINDINGS: usize = 16;

/// Destination of a binding table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindTarget {
    /// Group-addressed binding
    Group(u16),
    /// Unicast binding to a device endpoint
    Device {
        /// IEEE (EUI-64) address of the peer
        ieee: u64,
        /// Peer endpoint
        endpoint: u8,
    },
}

/// One row of the binding table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BindingEntry {
    /// Local endpoint the binding belongs to
    pub source_endpoint: u8,
    /// Bound cluster
    pub cluster: ClusterId,
    /// Bound destination
    pub target: BindTarget,
}

/// Read access to the binding table maintained by the network layer.
pub trait BindingTable {
    /// Number of destinations bound to `(endpoint, cluster)`.
    fn bound_count(&self, endpoint: u8, cluster: ClusterId) -> usize;

    /// Whether at least one destination is bound to `(endpoint, cluster)`.
    fn has_bindings(&self, endpoint: u8, cluster: ClusterId) -> bool {
        self.bound_count(endpoint, cluster) > 0
    }
}

impl<T: BindingTable + ?Sized> BindingTable for &T {
    fn bound_count(&self, endpoint: u8, cluster: ClusterId) -> usize {
        (**self).bound_count(endpoint, cluster)
    }
}

/// Fixed-capacity binding table, for hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticBindings {
    entries: Vec<BindingEntry, MAX_BINDINGS>,
}

impl StaticBindings {
    /// Create an empty table
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Add an entry. Returns `false` if the table is full or the entry exists.
    pub fn bind(&mut self, source_endpoint: u8, cluster: ClusterId, target: BindTarget) -> bool {
        let entry = BindingEntry {
            source_endpoint,
            cluster,
            target,
        };
        if self.entries.contains(&entry) {
            return false;
        }
        self.entries.push(entry).is_ok()
    }

    /// Remove an entry. Returns `true` if it was present.
    pub fn unbind(&mut self, source_endpoint: u8, cluster: ClusterId, target: BindTarget) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| {
            !(e.source_endpoint == source_endpoint && e.cluster == cluster && e.target == target)
        });
        self.entries.len() != before
    }

    /// Destinations bound to `(endpoint, cluster)`
    pub fn targets(&self, endpoint: u8, cluster: ClusterId) -> impl Iterator<Item = &BindTarget> {
        self.entries
            .iter()
            .filter(move |e| e.source_endpoint == endpoint && e.cluster == cluster)
            .map(|e| &e.target)
    }
}

impl BindingTable for StaticBindings {
    fn bound_count(&self, endpoint: u8, cluster: ClusterId) -> usize {
        self.targets(endpoint, cluster).count()
    }
}
