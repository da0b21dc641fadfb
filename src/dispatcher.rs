//! Binding dispatcher: the switch's state-transition authority.
//!
//! Every [`SemanticAction`], whether it comes from a button or from the
//! network, passes through [`BindingDispatcher::dispatch`]. The dispatcher
//! decides whether the local [`SwitchState`] changes, whether a command is
//! relayed to bound devices, or both.
//!
//! ## State Machine
//!
//! ```text
//!            ┌─────────────── server mode ───────────────┐
//!            │                                           ▼
//!   Idle ────┤                                      LocalAction ──┐
//!    ▲       │                                           │        │ not relayed
//!    │       └──── client-only ───┐        relay_to_bound│        │
//!    │                            ▼        & local input ▼        │
//!    └───────────────────────  RelayAction ◄─────────────┘        │
//!    ▲                                                            │
//!    └────────────────────────────────────────────────────────────┘
//! ```
//!
//! A long-press level gesture additionally enters the `moving` sub-mode:
//! `Move` is sent when the gesture starts (and again for every held event of
//! the same input and direction); the matching `LevelStop` sends exactly one
//! `Stop` and leaves the sub-mode.

use crate::button::action::{ActionKind, ActionSource, SemanticAction};
use crate::config::EndpointMode;
use crate::state::SwitchState;
use crate::zcl::binding::BindingTable;
use crate::zcl::command::{LevelCommand, MoveMode, OnOffCommand, ZclCommand, DEFAULT_MOVE_RATE};
use crate::zcl::stack::ZclStack;

/// Level change applied locally for each `Move` of a level gesture
pub const LEVEL_STEP: u8 = 16;

/// Dispatcher state. Always `Idle` between two actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchState {
    /// Waiting for an action
    #[default]
    Idle,
    /// Mutating the local state
    LocalAction,
    /// Relaying a command to bound devices
    RelayAction,
}

/// What one dispatched action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispatchOutcome {
    /// The local state changed
    pub changed: bool,
    /// Command handed to the protocol engine
    pub relayed: Option<ZclCommand>,
}

/// Routes semantic actions to local state and bound devices.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BindingDispatcher {
    endpoint: u8,
    mode: EndpointMode,
    relay_to_bound: bool,
    state: DispatchState,
    moving: Option<(ActionSource, MoveMode)>,
}

impl BindingDispatcher {
    /// Create a dispatcher for `endpoint` running in the effective `mode`
    pub const fn new(endpoint: u8, mode: EndpointMode, relay_to_bound: bool) -> Self {
        Self {
            endpoint,
            mode,
            relay_to_bound,
            state: DispatchState::Idle,
            moving: None,
        }
    }

    /// Current dispatcher state
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Effective operating mode
    pub fn mode(&self) -> EndpointMode {
        self.mode
    }

    /// Level gesture in progress, if any
    pub fn moving(&self) -> Option<(ActionSource, MoveMode)> {
        self.moving
    }

    /// Change whether local actions are mirrored to bound devices (server mode)
    pub fn set_relay_to_bound(&mut self, relay: bool) {
        self.relay_to_bound = relay;
    }

    /// Abandon any level gesture without sending `Stop` and return to `Idle`.
    pub fn reset(&mut self) {
        self.moving = None;
        self.state = DispatchState::Idle;
    }

    /// Run one action through the state machine.
    ///
    /// `state` is the endpoint's [`SwitchState`], `None` for client-only
    /// endpoints. Missing bindings and send failures are not errors: the
    /// former is a silent no-op, the latter is logged and dropped.
    pub fn dispatch<S, B>(
        &mut self,
        action: &SemanticAction,
        state: Option<&mut SwitchState>,
        stack: &mut S,
        bindings: &B,
    ) -> DispatchOutcome
    where
        S: ZclStack,
        B: BindingTable,
    {
        let command = self.command_for(action);
        let mut outcome = DispatchOutcome::default();

        if self.mode == EndpointMode::ServerCapable {
            self.state = DispatchState::LocalAction;
            if let Some(state) = state {
                outcome.changed = Self::apply_local(action.kind, state);
            }
        }

        let relay = action.is_local() && (self.mode == EndpointMode::ClientOnly || self.relay_to_bound);
        if let (true, Some(command)) = (relay, command) {
            self.state = DispatchState::RelayAction;
            if self.relay(command, stack, bindings) {
                outcome.relayed = Some(command);
            }
        }

        self.state = DispatchState::Idle;
        outcome
    }

    /// Outbound command for an action, tracking the level gesture.
    fn command_for(&mut self, action: &SemanticAction) -> Option<ZclCommand> {
        match action.kind {
            ActionKind::Toggle => Some(ZclCommand::OnOff(OnOffCommand::Toggle)),
            ActionKind::On => Some(ZclCommand::OnOff(OnOffCommand::On)),
            ActionKind::Off => Some(ZclCommand::OnOff(OnOffCommand::Off)),
            ActionKind::LevelMoveUp | ActionKind::LevelMoveDown => {
                let mode = if action.kind == ActionKind::LevelMoveUp {
                    MoveMode::Up
                } else {
                    MoveMode::Down
                };
                if action.long_press {
                    self.moving = Some((action.source, mode));
                }
                Some(ZclCommand::Level(LevelCommand::Move {
                    mode,
                    rate: DEFAULT_MOVE_RATE,
                }))
            }
            ActionKind::LevelStop => match self.moving {
                Some((source, _)) if source == action.source => {
                    self.moving = None;
                    Some(ZclCommand::Level(LevelCommand::Stop))
                }
                _ => None,
            },
        }
    }

    fn apply_local(kind: ActionKind, state: &mut SwitchState) -> bool {
        match kind {
            ActionKind::Toggle => {
                state.toggle();
                true
            }
            ActionKind::On => state.set(true),
            ActionKind::Off => state.set(false),
            ActionKind::LevelMoveUp => match state.level() {
                Some(level) => state.set_level(level.saturating_add(LEVEL_STEP)),
                None => false,
            },
            ActionKind::LevelMoveDown => match state.level() {
                Some(level) => state.set_level(level.saturating_sub(LEVEL_STEP)),
                None => false,
            },
            ActionKind::LevelStop => false,
        }
    }

    fn relay<S: ZclStack, B: BindingTable>(&self, command: ZclCommand, stack: &mut S, bindings: &B) -> bool {
        let cluster = command.cluster();
        if !bindings.has_bindings(self.endpoint, cluster) {
            switch_log!(debug, "ep{}: nothing bound to {}, not relaying", self.endpoint, cluster.name());
            return false;
        }
        match stack.send_command(self.endpoint, command) {
            Ok(()) => {
                switch_log!(
                    debug,
                    "ep{}: relayed {} command {}",
                    self.endpoint,
                    cluster.name(),
                    command.command_id()
                );
                true
            }
            Err(_) => {
                switch_log!(warn, "ep{}: failed to relay {} command, dropped", self.endpoint, cluster.name());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zcl::binding::{BindTarget, StaticBindings};
    use crate::zcl::cluster::ClusterId;
    use crate::zcl::mock_stack::MockStack;

    const EP: u8 = 2;

    fn bound() -> StaticBindings {
        let mut table = StaticBindings::new();
        table.bind(EP, ClusterId::OnOff, BindTarget::Group(0x0001));
        table.bind(EP, ClusterId::LevelControl, BindTarget::Group(0x0001));
        table
    }

    fn toggle() -> SemanticAction {
        SemanticAction::from_input(ActionKind::Toggle, 1)
    }

    #[test]
    fn test_client_only_relays_without_local_state() {
        let mut dispatcher = BindingDispatcher::new(EP, EndpointMode::ClientOnly, false);
        let mut stack = MockStack::new();
        let bindings = bound();

        for _ in 0..3 {
            let outcome = dispatcher.dispatch(&toggle(), None, &mut stack, &bindings);
            assert!(!outcome.changed);
            assert_eq!(outcome.relayed, Some(ZclCommand::OnOff(OnOffCommand::Toggle)));
            assert_eq!(dispatcher.state(), DispatchState::Idle);
        }
        assert_eq!(stack.sent_commands().len(), 3);
    }

    #[test]
    fn test_client_only_unbound_is_silent() {
        let mut dispatcher = BindingDispatcher::new(EP, EndpointMode::ClientOnly, true);
        let mut stack = MockStack::new();
        let outcome = dispatcher.dispatch(&toggle(), None, &mut stack, &StaticBindings::new());
        assert_eq!(outcome, DispatchOutcome::default());
        assert!(stack.sent_commands().is_empty());
    }

    #[test]
    fn test_server_without_bindings_mutates_only() {
        let mut dispatcher = BindingDispatcher::new(EP, EndpointMode::ServerCapable, true);
        let mut stack = MockStack::new();
        let mut state = SwitchState::new(false, None);
        let bindings = StaticBindings::new();

        let on = SemanticAction::from_input(ActionKind::On, 1);
        assert!(dispatcher.dispatch(&on, Some(&mut state), &mut stack, &bindings).changed);
        assert!(state.get());
        assert!(!dispatcher.dispatch(&on, Some(&mut state), &mut stack, &bindings).changed);
        dispatcher.dispatch(&toggle(), Some(&mut state), &mut stack, &bindings);
        assert!(!state.get());
        assert!(stack.sent_commands().is_empty());
    }

    #[test]
    fn test_server_relays_local_actions_when_enabled() {
        let mut stack = MockStack::new();
        let mut state = SwitchState::new(false, None);
        let bindings = bound();

        let mut dispatcher = BindingDispatcher::new(EP, EndpointMode::ServerCapable, true);
        let outcome = dispatcher.dispatch(&toggle(), Some(&mut state), &mut stack, &bindings);
        assert!(outcome.changed);
        assert!(outcome.relayed.is_some());

        dispatcher.set_relay_to_bound(false);
        let outcome = dispatcher.dispatch(&toggle(), Some(&mut state), &mut stack, &bindings);
        assert!(outcome.changed);
        assert_eq!(outcome.relayed, None);
        assert_eq!(stack.sent_commands().len(), 1);
    }

    #[test]
    fn test_network_actions_are_never_relayed() {
        let mut dispatcher = BindingDispatcher::new(EP, EndpointMode::ServerCapable, true);
        let mut stack = MockStack::new();
        let mut state = SwitchState::new(false, None);

        let remote = SemanticAction::from_network(ActionKind::On);
        let outcome = dispatcher.dispatch(&remote, Some(&mut state), &mut stack, &bound());
        assert!(outcome.changed);
        assert!(state.get());
        assert!(stack.sent_commands().is_empty());
    }

    #[test]
    fn test_long_press_dim_up_then_release() {
        let mut dispatcher = BindingDispatcher::new(EP, EndpointMode::ClientOnly, false);
        let mut stack = MockStack::new();
        let bindings = bound();

        let up = SemanticAction::long_from_input(ActionKind::LevelMoveUp, 1);
        let stop = SemanticAction::long_from_input(ActionKind::LevelStop, 1);
        dispatcher.dispatch(&up, None, &mut stack, &bindings);
        assert_eq!(dispatcher.moving(), Some((ActionSource::Input(1), MoveMode::Up)));
        dispatcher.dispatch(&stop, None, &mut stack, &bindings);
        assert_eq!(dispatcher.moving(), None);

        let sent: std::vec::Vec<ZclCommand> = stack.sent_commands().iter().map(|(_, c)| *c).collect();
        assert_eq!(
            sent,
            [
                ZclCommand::Level(LevelCommand::Move { mode: MoveMode::Up, rate: DEFAULT_MOVE_RATE }),
                ZclCommand::Level(LevelCommand::Stop),
            ]
        );
    }

    #[test]
    fn test_stop_without_move_sends_nothing() {
        let mut dispatcher = BindingDispatcher::new(EP, EndpointMode::ClientOnly, false);
        let mut stack = MockStack::new();
        let bindings = bound();

        let stop = SemanticAction::long_from_input(ActionKind::LevelStop, 1);
        assert_eq!(dispatcher.dispatch(&stop, None, &mut stack, &bindings).relayed, None);

        // Stop from another input does not end the gesture
        let up = SemanticAction::long_from_input(ActionKind::LevelMoveUp, 1);
        dispatcher.dispatch(&up, None, &mut stack, &bindings);
        let other = SemanticAction::long_from_input(ActionKind::LevelStop, 2);
        assert_eq!(dispatcher.dispatch(&other, None, &mut stack, &bindings).relayed, None);
        assert!(dispatcher.moving().is_some());
        assert_eq!(stack.sent_commands().len(), 1);
    }

    #[test]
    fn test_held_events_repeat_move() {
        let mut dispatcher = BindingDispatcher::new(EP, EndpointMode::ClientOnly, false);
        let mut stack = MockStack::new();
        let bindings = bound();
        let down = SemanticAction::long_from_input(ActionKind::LevelMoveDown, 1);
        dispatcher.dispatch(&down, None, &mut stack, &bindings);
        dispatcher.dispatch(&down, None, &mut stack, &bindings);
        assert_eq!(stack.sent_commands().len(), 2);
        assert_eq!(dispatcher.moving(), Some((ActionSource::Input(1), MoveMode::Down)));
    }

    #[test]
    fn test_local_level_steps_saturate() {
        let mut dispatcher = BindingDispatcher::new(EP, EndpointMode::ServerCapable, false);
        let mut stack = MockStack::new();
        let mut state = SwitchState::new(true, Some(250));
        let bindings = StaticBindings::new();

        let up = SemanticAction::long_from_input(ActionKind::LevelMoveUp, 1);
        assert!(dispatcher.dispatch(&up, Some(&mut state), &mut stack, &bindings).changed);
        assert_eq!(state.level(), Some(255));
        assert!(!dispatcher.dispatch(&up, Some(&mut state), &mut stack, &bindings).changed);

        let stop = SemanticAction::long_from_input(ActionKind::LevelStop, 1);
        assert!(!dispatcher.dispatch(&stop, Some(&mut state), &mut stack, &bindings).changed);
        assert_eq!(state.level(), Some(255));
    }

    #[test]
    fn test_send_failure_is_swallowed() {
        let mut dispatcher = BindingDispatcher::new(EP, EndpointMode::ServerCapable, true);
        let mut stack = MockStack::new();
        stack.set_fail_sends(true);
        let mut state = SwitchState::new(false, None);

        let outcome = dispatcher.dispatch(&toggle(), Some(&mut state), &mut stack, &bound());
        assert!(outcome.changed);
        assert_eq!(outcome.relayed, None);
        assert!(state.get());
        assert_eq!(dispatcher.state(), DispatchState::Idle);
    }

    #[test]
    fn test_reset_abandons_move() {
        let mut dispatcher = BindingDispatcher::new(EP, EndpointMode::ClientOnly, false);
        let mut stack = MockStack::new();
        let bindings = bound();
        dispatcher.dispatch(&SemanticAction::long_from_input(ActionKind::LevelMoveUp, 1), None, &mut stack, &bindings);
        dispatcher.reset();
        assert_eq!(dispatcher.moving(), None);
        let stop = SemanticAction::long_from_input(ActionKind::LevelStop, 1);
        assert_eq!(dispatcher.dispatch(&stop, None, &mut stack, &bindings).relayed, None);
    }
}
