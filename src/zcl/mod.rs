//! ZCL protocol boundary.
//!
//! Everything the switch core needs from the ZigBee Cluster Library engine:
//! cluster identifiers and roles, the commands it relays or receives, attribute
//! identifiers, callback events, the read-only binding table and the
//! non-blocking [`ZclStack`] trait the vendor engine is wrapped in.

pub mod attribute;
pub mod binding;
pub mod cluster;
pub mod command;
pub mod event;
pub mod mock_stack;
pub mod stack;

#[doc(inline)]
pub use attribute::AttributeValue;
#[doc(inline)]
pub use binding::{BindTarget, BindingEntry, BindingTable, StaticBindings};
#[doc(inline)]
pub use cluster::{ClusterId, ClusterRole};
#[doc(inline)]
pub use command::{GroupsCommand, IdentifyCommand, LevelCommand, MoveMode, OnOffCommand, ZclCommand};
#[doc(inline)]
pub use event::{ClusterEvent, ClusterEventKind, DeviceEvent, EventKind};
#[doc(inline)]
pub use stack::ZclStack;
