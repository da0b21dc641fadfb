//! Mapping of raw button events to semantic actions.
//!
//! The interpreter is configured once per endpoint from its [`Configuration`]
//! and [`ButtonLayout`]; `interpret()` is a pure function of the event and this
//! static policy.
//!
//! ## Policy
//!
//! ```text
//! switch type     event              action
//! ─────────────   ────────────────   ─────────────────────────────────────
//! Toggle          Press / Release    first / second of switch_actions
//! Momentary       Press              first of switch_actions
//! Multifunction   Press              Toggle            (relay_mode Front)
//!                 MultiClick(1|2|3)  Toggle            (relay_mode Single|Double|Triple)
//!                 LongPressStart     Toggle            (relay_mode Long)
//!                 LongPressStart     LevelMoveUp/Down  (long_press_mode, long)
//!                 LongPressHeld      LevelMoveUp/Down  (long_press_mode, long)
//!                 Release            LevelStop         (long_press_mode, long)
//! ```

use crate::button::action::{ActionKind, ButtonEdge, ButtonEvent, MultistateAction, SemanticAction};
use crate::config::{
    ButtonLayout, Configuration, InputId, LongPressMode, RelayMode, SwitchActions, SwitchType,
};

/// Converts button events of one endpoint into [`SemanticAction`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonActionInterpreter {
    pin_mask: u32,
    input: Option<InputId>,
    switch_type: SwitchType,
    switch_actions: SwitchActions,
    relay_mode: RelayMode,
    long_press_mode: LongPressMode,
    min_long_press_ms: u16,
}

impl ButtonActionInterpreter {
    /// Build the policy for an endpoint.
    ///
    /// An endpoint whose pin mask is zero, or does not match any logical input
    /// of `layout`, filters every event.
    pub fn new(cfg: &Configuration, layout: &ButtonLayout) -> Self {
        let input = if cfg.pin_mask == 0 {
            None
        } else {
            layout.input_for_mask(cfg.pin_mask)
        };
        Self {
            pin_mask: cfg.pin_mask,
            input,
            switch_type: cfg.switch_type,
            switch_actions: cfg.switch_actions,
            relay_mode: cfg.relay_mode,
            long_press_mode: cfg.long_press_mode,
            min_long_press_ms: cfg.min_long_press_ms,
        }
    }

    /// Logical input this endpoint listens to
    pub fn input(&self) -> Option<InputId> {
        self.input
    }

    /// Pin mask this endpoint listens to
    pub fn pin_mask(&self) -> u32 {
        self.pin_mask
    }

    /// Map a raw event to a semantic action, `None` if the event is filtered
    /// or carries no action under the current policy.
    pub fn interpret(&self, event: &ButtonEvent) -> Option<SemanticAction> {
        let input = self.accepts(event)?;
        let (first, second) = self.toggle_actions();

        match self.switch_type {
            SwitchType::Toggle => match event.edge {
                ButtonEdge::Press => Some(SemanticAction::from_input(first, input)),
                ButtonEdge::Release => Some(SemanticAction::from_input(second, input)),
                _ => None,
            },
            SwitchType::Momentary => match event.edge {
                ButtonEdge::Press => Some(SemanticAction::from_input(first, input)),
                _ => None,
            },
            SwitchType::Multifunction => self.interpret_multifunction(event.edge, input),
        }
    }

    /// Multistate Input action to report for an event (multifunction switches only).
    pub fn multistate_action(&self, event: &ButtonEvent) -> Option<MultistateAction> {
        self.accepts(event)?;
        if self.switch_type != SwitchType::Multifunction {
            return None;
        }
        match event.edge {
            ButtonEdge::MultiClick(1) => Some(MultistateAction::Single),
            ButtonEdge::MultiClick(2) => Some(MultistateAction::Double),
            ButtonEdge::MultiClick(3) => Some(MultistateAction::Triple),
            ButtonEdge::LongPressStart => Some(MultistateAction::Hold),
            ButtonEdge::Release if event.duration_ms >= self.min_long_press_ms => {
                Some(MultistateAction::Release)
            }
            _ => None,
        }
    }

    /// Multistate Input `PresentValue` for an event
    pub fn multistate_value(&self, event: &ButtonEvent) -> Option<u16> {
        self.multistate_action(event).map(MultistateAction::value)
    }

    fn accepts(&self, event: &ButtonEvent) -> Option<InputId> {
        if event.input_mask != self.pin_mask {
            return None;
        }
        self.input
    }

    fn toggle_actions(&self) -> (ActionKind, ActionKind) {
        match self.switch_actions {
            SwitchActions::OnOff => (ActionKind::On, ActionKind::Off),
            SwitchActions::OffOn => (ActionKind::Off, ActionKind::On),
            SwitchActions::Toggle => (ActionKind::Toggle, ActionKind::Toggle),
        }
    }

    fn level_move(&self) -> Option<ActionKind> {
        match self.long_press_mode {
            LongPressMode::None => None,
            LongPressMode::LevelCtrlUp => Some(ActionKind::LevelMoveUp),
            LongPressMode::LevelCtrlDown => Some(ActionKind::LevelMoveDown),
        }
    }

    fn interpret_multifunction(&self, edge: ButtonEdge, input: InputId) -> Option<SemanticAction> {
        let toggle = Some(SemanticAction::from_input(ActionKind::Toggle, input));
        match (edge, self.relay_mode) {
            (ButtonEdge::Press, RelayMode::Front)
            | (ButtonEdge::MultiClick(1), RelayMode::Single)
            | (ButtonEdge::MultiClick(2), RelayMode::Double)
            | (ButtonEdge::MultiClick(3), RelayMode::Triple)
            | (ButtonEdge::LongPressStart, RelayMode::Long) => toggle,
            (ButtonEdge::LongPressStart | ButtonEdge::LongPressHeld, mode) if mode != RelayMode::Long => self
                .level_move()
                .map(|kind| SemanticAction::long_from_input(kind, input)),
            (ButtonEdge::Release, mode) if mode != RelayMode::Long => {
                self.level_move()?;
                Some(SemanticAction::long_from_input(ActionKind::LevelStop, input))
            }
            _ => None,
        }
    }
}
