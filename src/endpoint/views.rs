//! Cluster attribute views.
//!
//! Each record mirrors the attributes one cluster role exposes to the
//! network. The views are refreshed from [`Configuration`] and
//! [`SwitchState`] and never written back: they are not a second source of
//! truth.

use crate::config::{Configuration, MAX_GROUPS};
use crate::state::SwitchState;
use crate::zcl::attribute::{
    AttributeValue, ATTR_LONG_PRESS_MODE, ATTR_MAX_PAUSE, ATTR_MIN_LONG_PRESS, ATTR_OPERATION_MODE,
    ATTR_RELAY_MODE, ATTR_SWITCH_ACTIONS, ATTR_SWITCH_MODE, ATTR_SWITCH_TYPE,
};

/// On/Off server attributes (server mode only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OnOffView {
    /// `OnOff` (0x0000)
    pub on_off: bool,
}

/// On/Off Switch Configuration server attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchConfigView {
    /// `SwitchType` (0x0000) and custom `switch_mode` (0xff00)
    pub switch_type: u8,
    /// `SwitchActions` (0x0010)
    pub switch_actions: u8,
    /// `relay_mode` (0xff01)
    pub relay_mode: u8,
    /// `max_pause` (0xff02)
    pub max_pause_ms: u16,
    /// `min_long_press` (0xff03)
    pub min_long_press_ms: u16,
    /// `long_press_mode` (0xff04)
    pub long_press_mode: u8,
    /// `operation_mode` (0xff05), the persisted request
    pub operation_mode: u8,
}

impl SwitchConfigView {
    /// Every attribute with its identifier, in report order
    pub fn attributes(&self) -> [(u16, AttributeValue); 8] {
        [
            (ATTR_SWITCH_TYPE, AttributeValue::Enum8(self.switch_type)),
            (ATTR_SWITCH_ACTIONS, AttributeValue::Enum8(self.switch_actions)),
            (ATTR_SWITCH_MODE, AttributeValue::Enum8(self.switch_type)),
            (ATTR_RELAY_MODE, AttributeValue::Enum8(self.relay_mode)),
            (ATTR_MAX_PAUSE, AttributeValue::U16(self.max_pause_ms)),
            (ATTR_MIN_LONG_PRESS, AttributeValue::U16(self.min_long_press_ms)),
            (ATTR_LONG_PRESS_MODE, AttributeValue::Enum8(self.long_press_mode)),
            (ATTR_OPERATION_MODE, AttributeValue::Enum8(self.operation_mode)),
        ]
    }
}

/// Multistate Input server attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MultistateView {
    /// `PresentValue` (0x0055), last reported action
    pub present_value: u16,
}

/// Identify server attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IdentifyView {
    /// `IdentifyTime` (0x0000), seconds left
    pub identify_time: u16,
}

impl IdentifyView {
    /// Whether the endpoint is identifying
    pub fn is_identifying(&self) -> bool {
        self.identify_time > 0
    }
}

/// Groups server attributes (server mode only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GroupsView {
    /// `NameSupport` (0x0000), always 0
    pub name_support: u8,
    /// Number of groups the endpoint is a member of
    pub group_count: u8,
}

/// Attribute records of every cluster role the endpoint registered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClusterViews {
    /// On/Off server, `None` in client-only mode
    pub on_off: Option<OnOffView>,
    /// On/Off Switch Configuration server
    pub switch_config: SwitchConfigView,
    /// Multistate Input server
    pub multistate: MultistateView,
    /// Identify server
    pub identify: IdentifyView,
    /// Groups server, `None` in client-only mode
    pub groups: Option<GroupsView>,
}

impl ClusterViews {
    /// Create the views for an endpoint, with or without server roles.
    pub fn new(server: bool) -> Self {
        Self {
            on_off: server.then(OnOffView::default),
            groups: server.then(GroupsView::default),
            ..Self::default()
        }
    }

    /// Refresh every view from the authoritative data.
    pub fn refresh(&mut self, cfg: &Configuration, state: Option<&SwitchState>) {
        if let (Some(view), Some(state)) = (self.on_off.as_mut(), state) {
            view.on_off = state.get();
        }

        self.switch_config = SwitchConfigView {
            switch_type: cfg.switch_type as u8,
            switch_actions: cfg.switch_actions as u8,
            relay_mode: cfg.relay_mode as u8,
            max_pause_ms: cfg.max_pause_ms,
            min_long_press_ms: cfg.min_long_press_ms,
            long_press_mode: cfg.long_press_mode as u8,
            operation_mode: cfg.mode.to_u8(),
        };

        if let Some(groups) = self.groups.as_mut() {
            debug_assert!(cfg.groups.len() <= MAX_GROUPS);
            groups.group_count = cfg.groups.len() as u8;
        }
    }
}
