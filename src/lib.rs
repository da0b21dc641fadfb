#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![doc = include_str!("../README.md")]

//! # zigbee-switch
//!
//! Behavioral core of a ZigBee wall-switch endpoint for embedded systems.
//!
//! This crate turns debounced button events into ZCL attribute state changes,
//! commands to bound devices and persisted configuration. The ZigBee stack,
//! GPIO debouncing and flash primitives stay outside, behind small traits.
//!
//! ## Features
//!
//! - Client-only and server-capable endpoints
//! - Toggle, momentary and multifunction switches (multi-click, long press)
//! - Hold-to-dim through Level Control Move/Stop
//! - Coalesced attribute reports and configuration writes
//! - Versioned, checksummed configuration record
//! - Serial debug console for button overrides
//! - Optional Embassy event loop
//!
//! ## Example
//!
//! ```rust
//! use zigbee_switch::button::{ButtonEdge, ButtonEvent};
//! use zigbee_switch::config::{ButtonLayout, MemoryMedium, RecordStore};
//! use zigbee_switch::zcl::mock_stack::MockStack;
//! use zigbee_switch::zcl::StaticBindings;
//! use zigbee_switch::{pin_mask, SwitchEndpoint};
//!
//! const LEFT: u32 = pin_mask!(4);
//!
//! let layout = ButtonLayout::new(&[4, 5])?;
//! let store = RecordStore::new(MemoryMedium::new(), 2);
//! let mut ep = SwitchEndpoint::new(2, layout, MockStack::new(), StaticBindings::new(), store);
//! ep.set_configuration(LEFT, false)?;
//! ep.init()?;
//!
//! ep.handle_button(&ButtonEvent::new(LEFT, ButtonEdge::Press))?;
//! ep.flush()?;
//! assert_eq!(ep.state().map(|s| s.get()), Some(true));
//! # Ok::<(), zigbee_switch::SwitchError>(())
//! ```

// Macro modules (must be declared before use)
#[macro_use]
pub mod logging;
#[macro_use]
pub mod macros;

pub mod button;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
#[cfg(feature = "embassy")]
pub mod runner;
pub mod state;
pub mod zcl;

// Re-export commonly used types
#[doc(inline)]
pub use button::{ActionKind, ButtonActionInterpreter, ButtonEdge, ButtonEvent, OverrideRegister, SemanticAction};
#[doc(inline)]
pub use config::{ButtonLayout, Configuration, ConfigurationStore, EndpointMode};
#[doc(inline)]
pub use console::DebugInput;
#[doc(inline)]
pub use dispatcher::BindingDispatcher;
#[doc(inline)]
pub use endpoint::SwitchEndpoint;
#[doc(inline)]
pub use error::{Result, SwitchError};
#[doc(inline)]
pub use state::SwitchState;
#[doc(inline)]
pub use zcl::{BindingTable, ClusterEvent, ZclStack};
