//! Button input side of the switch.
//!
//! Debounced events from the hardware layer arrive as [`ButtonEvent`]s and
//! are turned into [`SemanticAction`]s by the per-endpoint
//! [`ButtonActionInterpreter`].

pub mod action;
pub mod interpreter;
pub mod override_state;

#[doc(inline)]
pub use action::{ActionKind, ActionSource, ButtonEdge, ButtonEvent, MultistateAction, SemanticAction};
#[doc(inline)]
pub use interpreter::ButtonActionInterpreter;
#[doc(inline)]
pub use override_state::OverrideRegister;
