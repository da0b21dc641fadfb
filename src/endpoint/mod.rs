//! Switch endpoint: the root of the behavioral core.
//!
//! A [`SwitchEndpoint`] owns the endpoint's [`Configuration`], its
//! [`SwitchState`] (server mode only), the [`BindingDispatcher`], the
//! [`ButtonActionInterpreter`] and the [`ClusterViews`]. Every input, be it a
//! button event, a cluster callback or a network membership change, enters
//! through one of its methods and is folded into the dispatcher paths.
//!
//! ## Lifecycle
//!
//! ```text
//! new() ──► set_configuration() ──► init() ──► steady state ──► teardown()
//!                  ▲                                                 │
//!                  └─────────────────────────────────────────────────┘
//! ```
//!
//! Calls made in the wrong phase return [`SwitchError::InvalidState`].
//!
//! ## Example
//!
//! ```rust
//! use zigbee_switch::button::{ButtonEdge, ButtonEvent};
//! use zigbee_switch::config::{ButtonLayout, MemoryMedium, RecordStore};
//! use zigbee_switch::endpoint::SwitchEndpoint;
//! use zigbee_switch::zcl::mock_stack::MockStack;
//! use zigbee_switch::zcl::StaticBindings;
//!
//! let layout = ButtonLayout::new(&[4, 5])?;
//! let store = RecordStore::new(MemoryMedium::new(), 2);
//! let mut ep = SwitchEndpoint::new(2, layout, MockStack::new(), StaticBindings::new(), store);
//!
//! ep.set_configuration(1 << 4, false)?;
//! ep.init()?;
//!
//! ep.handle_button(&ButtonEvent::new(1 << 4, ButtonEdge::Press))?;
//! assert_eq!(ep.state().map(|s| s.get()), Some(true));
//! ep.flush()?;
//! # Ok::<(), zigbee_switch::SwitchError>(())
//! ```

pub mod routes;
pub mod views;

use crate::button::action::{ActionKind, ButtonEvent, SemanticAction};
use crate::button::interpreter::ButtonActionInterpreter;
use crate::config::{
    ButtonLayout, Configuration, ConfigurationStore, EndpointMode, LongPressMode, RelayMode, SwitchActions,
    SwitchType,
};
use crate::dispatcher::{BindingDispatcher, DispatchOutcome};
use crate::error::{Result, SwitchError};
use crate::state::SwitchState;
use crate::zcl::attribute::{
    AttributeValue, ATTR_IDENTIFY_TIME, ATTR_LONG_PRESS_MODE, ATTR_MAX_PAUSE, ATTR_MIN_LONG_PRESS, ATTR_ON_OFF,
    ATTR_OPERATION_MODE, ATTR_PRESENT_VALUE, ATTR_RELAY_MODE, ATTR_SWITCH_ACTIONS, ATTR_SWITCH_MODE,
    ATTR_SWITCH_TYPE,
};
use crate::zcl::binding::BindingTable;
use crate::zcl::cluster::{ClusterId, CLIENT_MODE_ROLES, SERVER_MODE_ROLES};
use crate::zcl::command::{GroupsCommand, IdentifyCommand, OnOffCommand};
use crate::zcl::event::{ClusterEvent, ClusterEventKind, DeviceEvent};
use crate::zcl::stack::ZclStack;

use routes::Handler;

#[doc(inline)]
pub use views::ClusterViews;

/// Lifecycle phase of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lifecycle {
    /// Constructed, wiring not yet set
    Created,
    /// Wiring set, waiting for `init()`
    Configured,
    /// Initialized and processing events
    Running,
    /// Torn down; may be initialized again
    TornDown,
}

/// One ZigBee wall-switch endpoint.
#[derive(Debug)]
pub struct SwitchEndpoint<S, B, C> {
    endpoint: u8,
    layout: ButtonLayout,
    stack: S,
    bindings: B,
    store: C,
    lifecycle: Lifecycle,
    wiring: Option<(u32, bool)>,
    config: Configuration,
    mode: EndpointMode,
    state: Option<SwitchState>,
    dispatcher: BindingDispatcher,
    interpreter: ButtonActionInterpreter,
    views: ClusterViews,
    store_unreadable: bool,
    persist_pending: bool,
}

impl<S, B, C> SwitchEndpoint<S, B, C>
where
    S: ZclStack,
    B: BindingTable,
    C: ConfigurationStore,
{
    /// Create an endpoint. Nothing is registered until [`init`](Self::init).
    pub fn new(endpoint: u8, layout: ButtonLayout, stack: S, bindings: B, store: C) -> Self {
        let config = Configuration::default();
        let interpreter = ButtonActionInterpreter::new(&config, &layout);
        Self {
            endpoint,
            layout,
            stack,
            bindings,
            store,
            lifecycle: Lifecycle::Created,
            wiring: None,
            mode: config.effective_mode(),
            dispatcher: BindingDispatcher::new(endpoint, config.effective_mode(), config.relay_to_bound),
            interpreter,
            config,
            state: None,
            views: ClusterViews::default(),
            store_unreadable: false,
            persist_pending: false,
        }
    }

    /// Set the hardware wiring of the endpoint.
    ///
    /// `pin_mask` selects the logical input (zero disables the buttons);
    /// `disable_server` marks an endpoint without a relay, which forces
    /// client-only mode.
    ///
    /// # Errors
    ///
    /// - `InvalidState` once the endpoint is running
    /// - `Config(InvalidPin)` if `pin_mask` is not a logical input of the layout
    pub fn set_configuration(&mut self, pin_mask: u32, disable_server: bool) -> Result<()> {
        if self.lifecycle == Lifecycle::Running {
            return Err(SwitchError::InvalidState);
        }
        if pin_mask != 0 && self.layout.input_for_mask(pin_mask).is_none() {
            return Err(SwitchError::invalid_pin());
        }
        self.wiring = Some((pin_mask, disable_server));
        self.lifecycle = Lifecycle::Configured;
        Ok(())
    }

    /// Restore the configuration, compute the mode, register the endpoint and
    /// its cluster roles, and build the state.
    ///
    /// On first boot (no stored or a corrupt record) the defaults are used and
    /// saved. If the medium fails to read, the defaults are used but the stored
    /// record is left alone until the next `init()`.
    pub fn init(&mut self) -> Result<()> {
        let (pin_mask, disable_server) = match (self.lifecycle, self.wiring) {
            (Lifecycle::Configured | Lifecycle::TornDown, Some(wiring)) => wiring,
            _ => return Err(SwitchError::InvalidState),
        };

        let mut unreadable = false;
        let (mut cfg, mut save) = match self.load_configuration() {
            Ok(cfg) => (cfg, false),
            Err(SwitchError::Config(e)) if e.is_missing() => {
                switch_log!(info, "ep{}: no stored configuration, using defaults", self.endpoint);
                (Configuration::default(), true)
            }
            Err(_) => {
                switch_log!(warn, "ep{}: configuration unreadable, using defaults", self.endpoint);
                unreadable = true;
                (Configuration::default(), false)
            }
        };
        if cfg.pin_mask != pin_mask || cfg.disable_server != disable_server {
            cfg.pin_mask = pin_mask;
            cfg.disable_server = disable_server;
            save = true;
        }

        let mode = cfg.effective_mode();
        let server = mode == EndpointMode::ServerCapable;

        if let Err(e) = self.register_roles(server) {
            switch_log!(warn, "ep{}: cluster registration failed", self.endpoint);
            self.stack.unregister_endpoint(self.endpoint);
            return Err(e);
        }

        let on = cfg.restore_last_state && cfg.last_on;
        let level = cfg.local_level.then_some(0);
        self.state = server.then(|| SwitchState::new(on, level));
        self.dispatcher = BindingDispatcher::new(self.endpoint, mode, cfg.relay_to_bound);
        self.interpreter = ButtonActionInterpreter::new(&cfg, &self.layout);
        self.views = ClusterViews::new(server);
        self.config = cfg;
        self.mode = mode;
        self.store_unreadable = unreadable;
        self.persist_pending = false;
        self.lifecycle = Lifecycle::Running;

        if save {
            self.persist();
        }
        self.refresh_views();

        switch_log!(
            info,
            "ep{}: initialized, pins={}, server mode={}",
            self.endpoint,
            pin_mask,
            server
        );
        Ok(())
    }

    /// Unregister the endpoint and drop its runtime state.
    pub fn teardown(&mut self) -> Result<()> {
        self.ensure_running()?;
        self.stack.unregister_endpoint(self.endpoint);
        self.state = None;
        self.views = ClusterViews::default();
        self.dispatcher.reset();
        self.lifecycle = Lifecycle::TornDown;
        switch_log!(info, "ep{}: torn down", self.endpoint);
        Ok(())
    }

    // =========================================================================
    // Steady state
    // =========================================================================

    /// Run a semantic action through the dispatcher.
    pub fn report_action(&mut self, action: SemanticAction) -> Result<DispatchOutcome> {
        self.ensure_running()?;
        let outcome = self
            .dispatcher
            .dispatch(&action, self.state.as_mut(), &mut self.stack, &self.bindings);
        if outcome.changed {
            if let Some(_state) = &self.state {
                switch_log!(info, "ep{}: state changed to {}", self.endpoint, _state.get());
            }
        }
        self.refresh_views();
        Ok(outcome)
    }

    /// Handle a debounced button event.
    ///
    /// Reports the Multistate Input action of multifunction switches, then
    /// dispatches the semantic action, if any.
    pub fn handle_button(&mut self, event: &ButtonEvent) -> Result<Option<DispatchOutcome>> {
        self.ensure_running()?;

        if let Some(value) = self.interpreter.multistate_value(event) {
            self.views.multistate.present_value = value;
            switch_log!(debug, "ep{}: reporting multistate action {}", self.endpoint, value);
            self.report(ClusterId::MultistateInput, ATTR_PRESENT_VALUE, AttributeValue::U16(value));
        }

        match self.interpreter.interpret(event) {
            Some(action) => self.report_action(action).map(Some),
            None => Ok(None),
        }
    }

    /// Handle a cluster callback from the protocol engine.
    ///
    /// # Errors
    ///
    /// `Zcl(..)` for unsupported events, attributes, commands and malformed
    /// payloads. The endpoint is unchanged in that case.
    pub fn handle_cluster_event(&mut self, event: &ClusterEvent) -> Result<()> {
        self.ensure_running()?;
        let Some(handler) = routes::lookup(event.cluster, event.event_kind()) else {
            switch_log!(debug, "ep{}: no route for {} event", self.endpoint, event.cluster.name());
            return Err(SwitchError::unsupported_cluster());
        };

        match (handler, &event.kind) {
            (Handler::OnOffCommand, ClusterEventKind::Command { id, .. }) => self.on_off_command(*id),
            (Handler::OnOffWrite, ClusterEventKind::AttributeWriteCompleted { attribute, value }) => {
                self.on_off_write(*attribute, *value)
            }
            (Handler::SwitchConfigWrite, ClusterEventKind::AttributeWriteCompleted { attribute, value }) => {
                self.switch_config_write(*attribute, *value)
            }
            (Handler::IdentifyCommand, ClusterEventKind::Command { id, payload }) => {
                self.identify_command(IdentifyCommand::decode(*id, payload)?);
                Ok(())
            }
            (Handler::IdentifyWrite, ClusterEventKind::AttributeWriteCompleted { attribute, value }) => {
                if *attribute != ATTR_IDENTIFY_TIME {
                    return Err(SwitchError::unsupported_attribute());
                }
                self.identify_command(IdentifyCommand::Identify(value.as_u16()?));
                Ok(())
            }
            (Handler::GroupsCommand, ClusterEventKind::Command { id, payload }) => {
                self.groups_command(GroupsCommand::decode(*id, payload)?)
            }
            (Handler::Refresh, _) => {
                self.refresh_views();
                Ok(())
            }
            _ => Err(SwitchError::unsupported_cluster()),
        }
    }

    /// Handle a network membership change of the device.
    pub fn handle_device_event(&mut self, event: DeviceEvent) -> Result<()> {
        self.ensure_running()?;
        match event {
            DeviceEvent::Joined => {
                switch_log!(info, "ep{}: device joined, re-announcing", self.endpoint);
                if let Some(state) = self.state.as_mut() {
                    state.request_report();
                }
                self.flush()?;
                for (attribute, value) in self.views.switch_config.attributes() {
                    self.report(ClusterId::OnOffSwitchConfig, attribute, value);
                }
            }
            DeviceEvent::Left => {
                switch_log!(info, "ep{}: device left the network", self.endpoint);
                self.dispatcher.reset();
                self.views.identify.identify_time = 0;
            }
        }
        Ok(())
    }

    /// One report/persist cycle.
    ///
    /// Emits at most one On/Off attribute report and at most one
    /// configuration write, reflecting the final state of the cycle. A
    /// configuration write that failed earlier is retried here.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_running()?;
        let mut save = self.persist_pending;
        if let Some(state) = self.state.as_mut() {
            let pending = state.take_pending();
            let on = state.get();

            if pending.report {
                switch_log!(debug, "ep{}: reporting state {}", self.endpoint, on);
                self.report(ClusterId::OnOff, ATTR_ON_OFF, AttributeValue::Bool(on));
            }
            if pending.persist && self.config.restore_last_state {
                self.config.last_on = on;
                save = true;
            }
        }
        if save {
            self.persist();
        }
        self.refresh_views();
        Ok(())
    }

    /// Advance the identify timer by `elapsed_secs`.
    pub fn tick(&mut self, elapsed_secs: u16) -> Result<()> {
        self.ensure_running()?;
        let identify = &mut self.views.identify;
        if identify.is_identifying() {
            identify.identify_time = identify.identify_time.saturating_sub(elapsed_secs);
            if !identify.is_identifying() {
                switch_log!(debug, "ep{}: identify finished", self.endpoint);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Endpoint number
    pub fn endpoint_id(&self) -> u8 {
        self.endpoint
    }

    /// Current lifecycle phase
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Effective operating mode (valid once initialized)
    pub fn mode(&self) -> EndpointMode {
        self.mode
    }

    /// Whether the endpoint owns an on/off state
    pub fn runs_in_server_mode(&self) -> bool {
        self.state.is_some()
    }

    /// Local state, `None` for client-only endpoints
    pub fn state(&self) -> Option<&SwitchState> {
        self.state.as_ref()
    }

    /// Active configuration
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Button layout of the device
    pub fn layout(&self) -> &ButtonLayout {
        &self.layout
    }

    /// Cluster attribute views
    pub fn views(&self) -> &ClusterViews {
        &self.views
    }

    /// The dispatcher
    pub fn dispatcher(&self) -> &BindingDispatcher {
        &self.dispatcher
    }

    /// The button interpreter
    pub fn interpreter(&self) -> &ButtonActionInterpreter {
        &self.interpreter
    }

    /// Whether the endpoint is identifying
    pub fn is_identifying(&self) -> bool {
        self.views.identify.is_identifying()
    }

    /// The protocol engine
    pub fn stack(&self) -> &S {
        &self.stack
    }

    /// Mutable access to the protocol engine
    pub fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    /// The binding table
    pub fn bindings(&self) -> &B {
        &self.bindings
    }

    /// The configuration store
    pub fn store(&self) -> &C {
        &self.store
    }

    /// Mutable access to the configuration store
    pub fn store_mut(&mut self) -> &mut C {
        &mut self.store
    }

    // =========================================================================
    // Cluster handlers
    // =========================================================================

    fn on_off_command(&mut self, id: u8) -> Result<()> {
        let command = OnOffCommand::decode(id)?;
        if self.state.is_none() {
            switch_log!(debug, "ep{}: ignoring On/Off command in client mode", self.endpoint);
            return Ok(());
        }
        let kind = match command {
            OnOffCommand::Off => ActionKind::Off,
            OnOffCommand::On => ActionKind::On,
            OnOffCommand::Toggle => ActionKind::Toggle,
        };
        self.report_action(SemanticAction::from_network(kind)).map(|_| ())
    }

    fn on_off_write(&mut self, attribute: u16, value: AttributeValue) -> Result<()> {
        if attribute != ATTR_ON_OFF {
            return Err(SwitchError::unsupported_attribute());
        }
        let kind = if value.as_bool()? { ActionKind::On } else { ActionKind::Off };
        if self.state.is_none() {
            switch_log!(debug, "ep{}: ignoring On/Off write in client mode", self.endpoint);
            return Ok(());
        }
        self.report_action(SemanticAction::from_network(kind)).map(|_| ())
    }

    fn switch_config_write(&mut self, attribute: u16, value: AttributeValue) -> Result<()> {
        let cfg = &mut self.config;
        match attribute {
            ATTR_SWITCH_TYPE | ATTR_SWITCH_MODE => cfg.switch_type = SwitchType::try_from(value.as_enum8()?)?,
            ATTR_SWITCH_ACTIONS => cfg.switch_actions = SwitchActions::try_from(value.as_enum8()?)?,
            ATTR_RELAY_MODE => cfg.relay_mode = RelayMode::try_from(value.as_enum8()?)?,
            ATTR_MAX_PAUSE => cfg.max_pause_ms = value.as_u16()?,
            ATTR_MIN_LONG_PRESS => cfg.min_long_press_ms = value.as_u16()?,
            ATTR_LONG_PRESS_MODE => cfg.long_press_mode = LongPressMode::try_from(value.as_enum8()?)?,
            ATTR_OPERATION_MODE => {
                cfg.mode = EndpointMode::try_from(value.as_enum8()?)?;
                switch_log!(info, "ep{}: operation mode stored, applies after restart", self.endpoint);
            }
            _ => return Err(SwitchError::unsupported_attribute()),
        }

        switch_log!(debug, "ep{}: switch configuration attribute {} written", self.endpoint, attribute);
        self.interpreter = ButtonActionInterpreter::new(&self.config, &self.layout);
        self.persist();
        self.refresh_views();
        Ok(())
    }

    fn identify_command(&mut self, command: IdentifyCommand) {
        match command {
            IdentifyCommand::Identify(seconds) => {
                switch_log!(info, "ep{}: identify for {} s", self.endpoint, seconds);
                self.views.identify.identify_time = seconds;
            }
            IdentifyCommand::IdentifyQuery => {
                switch_log!(
                    debug,
                    "ep{}: identify query, {} s left",
                    self.endpoint,
                    self.views.identify.identify_time
                );
            }
        }
    }

    fn groups_command(&mut self, command: GroupsCommand) -> Result<()> {
        if self.state.is_none() {
            switch_log!(debug, "ep{}: ignoring Groups command in client mode", self.endpoint);
            return Ok(());
        }
        let changed = match command {
            GroupsCommand::Add(group) => {
                let added = self.config.add_group(group);
                if !added && !self.config.groups.contains(&group) {
                    switch_log!(warn, "ep{}: group table full, {} not added", self.endpoint, group);
                }
                added
            }
            GroupsCommand::Remove(group) => self.config.remove_group(group),
            GroupsCommand::RemoveAll => {
                let had_groups = !self.config.groups.is_empty();
                self.config.groups.clear();
                had_groups
            }
        };
        if changed {
            self.persist();
            self.refresh_views();
        }
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn ensure_running(&self) -> Result<()> {
        if self.lifecycle == Lifecycle::Running {
            Ok(())
        } else {
            Err(SwitchError::InvalidState)
        }
    }

    fn load_configuration(&mut self) -> Result<Configuration> {
        self.store.load().map_err(|e| {
            if e.is_not_found() {
                SwitchError::configuration_missing()
            } else {
                e
            }
        })
    }

    fn register_roles(&mut self, server: bool) -> Result<()> {
        self.stack.register_endpoint(self.endpoint)?;
        for (cluster, role) in CLIENT_MODE_ROLES {
            self.stack.register_cluster(self.endpoint, cluster, role)?;
        }
        if server {
            for (cluster, role) in SERVER_MODE_ROLES {
                self.stack.register_cluster(self.endpoint, cluster, role)?;
            }
        }
        Ok(())
    }

    /// Save the configuration. A failed write stays pending for the next
    /// `flush()`. Nothing is written while the stored record is unreadable.
    fn persist(&mut self) {
        if self.store_unreadable {
            switch_log!(warn, "ep{}: stored configuration unreadable, not overwriting", self.endpoint);
            return;
        }
        match self.store.save(&self.config) {
            Ok(()) => {
                self.persist_pending = false;
                switch_log!(debug, "ep{}: configuration saved", self.endpoint);
            }
            Err(_) => {
                self.persist_pending = true;
                switch_log!(warn, "ep{}: configuration write failed", self.endpoint);
            }
        }
    }

    fn report(&mut self, cluster: ClusterId, attribute: u16, value: AttributeValue) {
        if self.stack.report_attribute(self.endpoint, cluster, attribute, value).is_err() {
            switch_log!(
                warn,
                "ep{}: report of {} attribute {} failed",
                self.endpoint,
                cluster.name(),
                attribute
            );
        }
    }

    fn refresh_views(&mut self) {
        self.views.refresh(&self.config, self.state.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::action::ButtonEdge;
    use crate::config::{MemoryMedium, RecordStore};
    use crate::zcl::binding::{BindTarget, StaticBindings};
    use crate::zcl::cluster::ClusterRole;
    use crate::zcl::command::{LevelCommand, MoveMode, ZclCommand};
    use crate::zcl::mock_stack::MockStack;

    const EP: u8 = 2;
    const LEFT: u32 = 1 << 4;
    const RIGHT: u32 = 1 << 5;

    type TestEndpoint = SwitchEndpoint<MockStack, StaticBindings, RecordStore<MemoryMedium>>;

    fn endpoint_with(bindings: StaticBindings, stored: Option<Configuration>) -> TestEndpoint {
        let mut store = RecordStore::new(MemoryMedium::new(), u16::from(EP));
        if let Some(cfg) = stored {
            store.save(&cfg).unwrap();
        }
        let layout = ButtonLayout::new(&[4, 5]).unwrap();
        SwitchEndpoint::new(EP, layout, MockStack::new(), bindings, store)
    }

    fn running(pin_mask: u32, disable_server: bool) -> TestEndpoint {
        let mut ep = endpoint_with(StaticBindings::new(), None);
        ep.set_configuration(pin_mask, disable_server).unwrap();
        ep.init().unwrap();
        ep
    }

    fn bound_on_off() -> StaticBindings {
        let mut table = StaticBindings::new();
        table.bind(EP, ClusterId::OnOff, BindTarget::Group(1));
        table.bind(EP, ClusterId::LevelControl, BindTarget::Group(1));
        table
    }

    fn press(mask: u32) -> ButtonEvent {
        ButtonEvent::new(mask, ButtonEdge::Press)
    }

    #[test]
    fn test_lifecycle_order_is_enforced() {
        let mut ep = endpoint_with(StaticBindings::new(), None);
        assert!(matches!(ep.init(), Err(SwitchError::InvalidState)));
        assert!(matches!(ep.flush(), Err(SwitchError::InvalidState)));
        assert!(matches!(ep.handle_button(&press(LEFT)), Err(SwitchError::InvalidState)));

        ep.set_configuration(LEFT, false).unwrap();
        ep.init().unwrap();
        assert_eq!(ep.lifecycle(), Lifecycle::Running);
        assert!(matches!(ep.init(), Err(SwitchError::InvalidState)));
        assert!(matches!(ep.set_configuration(RIGHT, false), Err(SwitchError::InvalidState)));

        ep.teardown().unwrap();
        assert!(matches!(ep.report_action(SemanticAction::from_input(ActionKind::On, 1)), Err(SwitchError::InvalidState)));
        ep.init().unwrap();
        assert_eq!(ep.lifecycle(), Lifecycle::Running);
    }

    #[test]
    fn test_invalid_pin_mask_rejected() {
        let mut ep = endpoint_with(StaticBindings::new(), None);
        assert!(ep.set_configuration(1 << 7, false).is_err());
        assert_eq!(ep.lifecycle(), Lifecycle::Created);
    }

    #[test]
    fn test_first_boot_saves_defaults() {
        let ep = running(LEFT, false);
        assert_eq!(ep.store().medium().write_count(), 1);
        assert_eq!(ep.configuration().pin_mask, LEFT);
        assert!(ep.runs_in_server_mode());
    }

    #[test]
    fn test_stored_configuration_is_restored() {
        let stored = Configuration {
            pin_mask: LEFT,
            switch_type: SwitchType::Momentary,
            restore_last_state: true,
            last_on: true,
            ..Configuration::default()
        };
        let mut ep = endpoint_with(StaticBindings::new(), Some(stored.clone()));
        ep.set_configuration(LEFT, false).unwrap();
        ep.init().unwrap();
        assert_eq!(ep.configuration(), &stored);
        assert_eq!(ep.state().map(SwitchState::get), Some(true));
        // Unchanged configuration is not written again
        assert_eq!(ep.store().medium().write_count(), 1);
    }

    #[test]
    fn test_server_mode_registers_all_roles() {
        let ep = running(LEFT, false);
        let stack = ep.stack();
        assert_eq!(stack.endpoints(), &[EP]);
        assert_eq!(stack.registered_clusters().len(), 7);
        assert!(stack.has_cluster(EP, ClusterId::OnOff, ClusterRole::Server));
        assert!(stack.has_cluster(EP, ClusterId::Groups, ClusterRole::Server));
        assert!(stack.has_cluster(EP, ClusterId::LevelControl, ClusterRole::Client));
    }

    #[test]
    fn test_client_mode_registers_client_roles_only() {
        let ep = running(LEFT, true);
        assert_eq!(ep.mode(), EndpointMode::ClientOnly);
        assert!(ep.state().is_none());
        assert_eq!(ep.stack().registered_clusters().len(), 5);
        assert!(!ep.stack().has_cluster(EP, ClusterId::OnOff, ClusterRole::Server));
        assert!(ep.views().on_off.is_none());
    }

    #[test]
    fn test_server_button_toggles_without_bindings() {
        let mut ep = running(LEFT, false);
        for expected in [true, false, true] {
            let outcome = ep.handle_button(&press(LEFT)).unwrap().unwrap();
            assert!(outcome.changed);
            assert_eq!(ep.state().map(SwitchState::get), Some(expected));
        }
        assert!(ep.stack().sent_commands().is_empty());
        assert_eq!(ep.views().on_off.map(|v| v.on_off), Some(true));
    }

    #[test]
    fn test_client_button_relays_once_per_action() {
        let mut ep = endpoint_with(bound_on_off(), None);
        ep.set_configuration(LEFT, true).unwrap();
        ep.init().unwrap();

        ep.handle_button(&press(LEFT)).unwrap();
        ep.handle_button(&ButtonEvent::new(LEFT, ButtonEdge::Release)).unwrap();
        assert_eq!(
            ep.stack().sent_commands(),
            &[
                (EP, ZclCommand::OnOff(OnOffCommand::Toggle)),
                (EP, ZclCommand::OnOff(OnOffCommand::Toggle)),
            ]
        );
        assert!(ep.state().is_none());
    }

    #[test]
    fn test_flush_coalesces_reports() {
        let mut ep = running(LEFT, false);
        ep.report_action(SemanticAction::from_network(ActionKind::On)).unwrap();
        ep.report_action(SemanticAction::from_network(ActionKind::On)).unwrap();
        ep.report_action(SemanticAction::from_network(ActionKind::Off)).unwrap();
        ep.flush().unwrap();
        ep.flush().unwrap();
        assert_eq!(
            ep.stack().reports_for(ClusterId::OnOff, ATTR_ON_OFF),
            [AttributeValue::Bool(false)]
        );
    }

    #[test]
    fn test_restore_last_state_persists_on_flush() {
        let stored = Configuration {
            pin_mask: LEFT,
            restore_last_state: true,
            ..Configuration::default()
        };
        let mut ep = endpoint_with(StaticBindings::new(), Some(stored));
        ep.set_configuration(LEFT, false).unwrap();
        ep.init().unwrap();

        ep.report_action(SemanticAction::from_network(ActionKind::On)).unwrap();
        ep.report_action(SemanticAction::from_network(ActionKind::Toggle)).unwrap();
        ep.report_action(SemanticAction::from_network(ActionKind::Toggle)).unwrap();
        ep.flush().unwrap();
        assert_eq!(ep.store().medium().write_count(), 2);
        assert!(ep.store_mut().load().unwrap().last_on);
    }

    #[test]
    fn test_on_off_command_and_write() {
        let mut ep = running(LEFT, false);
        ep.handle_cluster_event(&ClusterEvent::command(ClusterId::OnOff, 0x01, &[]).unwrap())
            .unwrap();
        assert_eq!(ep.state().map(SwitchState::get), Some(true));

        let write = ClusterEvent::attribute_written(ClusterId::OnOff, ATTR_ON_OFF, AttributeValue::Bool(false));
        ep.handle_cluster_event(&write).unwrap();
        assert_eq!(ep.state().map(SwitchState::get), Some(false));

        let bad = ClusterEvent::command(ClusterId::OnOff, 0x42, &[]).unwrap();
        assert!(ep.handle_cluster_event(&bad).is_err());
    }

    #[test]
    fn test_network_commands_not_relayed() {
        let mut ep = endpoint_with(bound_on_off(), None);
        ep.set_configuration(LEFT, false).unwrap();
        ep.init().unwrap();
        ep.handle_cluster_event(&ClusterEvent::command(ClusterId::OnOff, 0x02, &[]).unwrap())
            .unwrap();
        assert!(ep.stack().sent_commands().is_empty());
        assert_eq!(ep.state().map(SwitchState::get), Some(true));
    }

    #[test]
    fn test_client_mode_ignores_on_off_commands() {
        let mut ep = running(LEFT, true);
        ep.handle_cluster_event(&ClusterEvent::command(ClusterId::OnOff, 0x01, &[]).unwrap())
            .unwrap();
        assert!(ep.state().is_none());
    }

    #[test]
    fn test_switch_config_write_updates_policy_and_persists() {
        let mut ep = running(LEFT, false);
        let writes = ep.store().medium().write_count();

        let write = ClusterEvent::attribute_written(ClusterId::OnOffSwitchConfig, ATTR_SWITCH_MODE, AttributeValue::Enum8(1));
        ep.handle_cluster_event(&write).unwrap();
        assert_eq!(ep.configuration().switch_type, SwitchType::Momentary);
        assert_eq!(ep.views().switch_config.switch_type, 1);
        assert_eq!(ep.store().medium().write_count(), writes + 1);

        // Momentary: release does nothing any more
        ep.handle_button(&press(LEFT)).unwrap();
        assert_eq!(ep.handle_button(&ButtonEvent::new(LEFT, ButtonEdge::Release)).unwrap(), None);
        assert_eq!(ep.state().map(SwitchState::get), Some(true));
    }

    #[test]
    fn test_switch_config_write_rejects_bad_values() {
        let mut ep = running(LEFT, false);
        let writes = ep.store().medium().write_count();
        let bad_value = ClusterEvent::attribute_written(ClusterId::OnOffSwitchConfig, ATTR_RELAY_MODE, AttributeValue::Enum8(9));
        assert!(ep.handle_cluster_event(&bad_value).is_err());
        let bad_attr = ClusterEvent::attribute_written(ClusterId::OnOffSwitchConfig, 0x1234, AttributeValue::Enum8(0));
        match ep.handle_cluster_event(&bad_attr) {
            Err(SwitchError::Zcl(e)) => assert!(e.is_unsupported_attribute()),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(ep.configuration().relay_mode, RelayMode::Single);
        assert_eq!(ep.store().medium().write_count(), writes);
    }

    #[test]
    fn test_operation_mode_applies_after_reinit() {
        let mut ep = running(LEFT, false);
        let write =
            ClusterEvent::attribute_written(ClusterId::OnOffSwitchConfig, ATTR_OPERATION_MODE, AttributeValue::Enum8(1));
        ep.handle_cluster_event(&write).unwrap();
        assert_eq!(ep.mode(), EndpointMode::ServerCapable);
        assert_eq!(ep.views().switch_config.operation_mode, 1);

        ep.teardown().unwrap();
        ep.init().unwrap();
        assert_eq!(ep.mode(), EndpointMode::ClientOnly);
        assert!(ep.state().is_none());
    }

    #[test]
    fn test_identify_timer() {
        let mut ep = running(LEFT, false);
        let identify = ClusterEvent::command(ClusterId::Identify, 0x00, &[5, 0]).unwrap();
        ep.handle_cluster_event(&identify).unwrap();
        assert!(ep.is_identifying());
        ep.tick(3).unwrap();
        assert_eq!(ep.views().identify.identify_time, 2);
        ep.handle_cluster_event(&ClusterEvent::command(ClusterId::Identify, 0x01, &[]).unwrap())
            .unwrap();
        ep.tick(3).unwrap();
        assert!(!ep.is_identifying());

        let truncated = ClusterEvent::command(ClusterId::Identify, 0x00, &[5]).unwrap();
        assert!(ep.handle_cluster_event(&truncated).is_err());
    }

    #[test]
    fn test_groups_membership_is_persisted() {
        let mut ep = running(LEFT, false);
        let add = ClusterEvent::command(ClusterId::Groups, 0x00, &[0x34, 0x12, 0x00]).unwrap();
        ep.handle_cluster_event(&add).unwrap();
        assert_eq!(ep.configuration().groups.as_slice(), &[0x1234]);
        assert_eq!(ep.views().groups.map(|g| g.group_count), Some(1));
        assert_eq!(ep.store_mut().load().unwrap().groups.as_slice(), &[0x1234]);

        let remove_all = ClusterEvent::command(ClusterId::Groups, 0x04, &[]).unwrap();
        ep.handle_cluster_event(&remove_all).unwrap();
        assert!(ep.store_mut().load().unwrap().groups.is_empty());
    }

    #[test]
    fn test_unrouted_event_is_unsupported() {
        let mut ep = running(LEFT, false);
        let event = ClusterEvent::command(ClusterId::LevelControl, 0x01, &[0, 10]).unwrap();
        assert!(ep.handle_cluster_event(&event).is_err());
    }

    #[test]
    fn test_join_reannounces_state_and_config() {
        let mut ep = running(LEFT, false);
        ep.handle_device_event(DeviceEvent::Joined).unwrap();
        assert_eq!(
            ep.stack().reports_for(ClusterId::OnOff, ATTR_ON_OFF),
            [AttributeValue::Bool(false)]
        );
        assert_eq!(
            ep.stack().reports_for(ClusterId::OnOffSwitchConfig, ATTR_OPERATION_MODE),
            [AttributeValue::Enum8(0)]
        );
    }

    #[test]
    fn test_leave_abandons_level_move() {
        let stored = Configuration {
            pin_mask: LEFT,
            switch_type: SwitchType::Multifunction,
            long_press_mode: LongPressMode::LevelCtrlUp,
            ..Configuration::default()
        };
        let mut ep = endpoint_with(bound_on_off(), Some(stored));
        ep.set_configuration(LEFT, true).unwrap();
        ep.init().unwrap();

        ep.handle_button(&ButtonEvent::new(LEFT, ButtonEdge::LongPressStart)).unwrap();
        assert!(ep.dispatcher().moving().is_some());
        ep.handle_device_event(DeviceEvent::Left).unwrap();
        assert!(ep.dispatcher().moving().is_none());

        ep.handle_button(&ButtonEvent::new(LEFT, ButtonEdge::Release)).unwrap();
        assert_eq!(
            ep.stack().sent_commands(),
            &[(EP, ZclCommand::Level(LevelCommand::Move { mode: MoveMode::Up, rate: 80 }))]
        );
    }

    #[test]
    fn test_multistate_reports() {
        let stored = Configuration {
            pin_mask: LEFT,
            switch_type: SwitchType::Multifunction,
            ..Configuration::default()
        };
        let mut ep = endpoint_with(StaticBindings::new(), Some(stored));
        ep.set_configuration(LEFT, false).unwrap();
        ep.init().unwrap();

        ep.handle_button(&ButtonEvent::new(LEFT, ButtonEdge::MultiClick(2))).unwrap();
        ep.handle_button(&ButtonEvent::new(LEFT, ButtonEdge::MultiClick(1))).unwrap();
        assert_eq!(
            ep.stack().reports_for(ClusterId::MultistateInput, ATTR_PRESENT_VALUE),
            [AttributeValue::U16(2), AttributeValue::U16(1)]
        );
        assert_eq!(ep.views().multistate.present_value, 1);
        // Single click drives the relay in the default relay mode
        assert_eq!(ep.state().map(SwitchState::get), Some(true));
    }

    #[test]
    fn test_write_failure_is_not_fatal() {
        let mut ep = running(LEFT, false);
        ep.store_mut().medium_mut().set_fail_writes(true);
        let write = ClusterEvent::attribute_written(ClusterId::OnOffSwitchConfig, ATTR_MAX_PAUSE, AttributeValue::U16(400));
        ep.handle_cluster_event(&write).unwrap();
        assert_eq!(ep.configuration().max_pause_ms, 400);
    }

    #[test]
    fn test_unreadable_store_is_not_overwritten() {
        let mut stored = Configuration {
            pin_mask: LEFT,
            switch_type: SwitchType::Momentary,
            ..Configuration::default()
        };
        stored.add_group(0x1234);
        let mut ep = endpoint_with(StaticBindings::new(), Some(stored.clone()));
        ep.store_mut().medium_mut().set_fail_reads(true);
        ep.set_configuration(LEFT, false).unwrap();
        ep.init().unwrap();

        // Running on defaults, but the record is left alone
        assert_eq!(ep.configuration().switch_type, SwitchType::Toggle);
        let write = ClusterEvent::attribute_written(ClusterId::OnOffSwitchConfig, ATTR_MAX_PAUSE, AttributeValue::U16(400));
        ep.handle_cluster_event(&write).unwrap();
        ep.flush().unwrap();
        assert_eq!(ep.store().medium().write_count(), 1);

        ep.teardown().unwrap();
        ep.store_mut().medium_mut().set_fail_reads(false);
        ep.init().unwrap();
        assert_eq!(ep.configuration(), &stored);
    }

    #[test]
    fn test_coalesced_cycle_writes_once() {
        let stored = Configuration {
            pin_mask: LEFT,
            restore_last_state: true,
            ..Configuration::default()
        };
        let mut ep = endpoint_with(StaticBindings::new(), Some(stored));
        ep.set_configuration(LEFT, false).unwrap();
        ep.init().unwrap();
        let writes = ep.store().medium().write_count();

        ep.report_action(SemanticAction::from_network(ActionKind::On)).unwrap();
        ep.report_action(SemanticAction::from_network(ActionKind::On)).unwrap();
        ep.report_action(SemanticAction::from_network(ActionKind::Off)).unwrap();
        ep.flush().unwrap();
        ep.flush().unwrap();

        assert_eq!(
            ep.stack().reports_for(ClusterId::OnOff, ATTR_ON_OFF),
            [AttributeValue::Bool(false)]
        );
        assert_eq!(ep.store().medium().write_count(), writes + 1);
        assert!(!ep.store_mut().load().unwrap().last_on);
    }

    #[test]
    fn test_failed_state_write_is_retried() {
        let stored = Configuration {
            pin_mask: LEFT,
            restore_last_state: true,
            ..Configuration::default()
        };
        let mut ep = endpoint_with(StaticBindings::new(), Some(stored));
        ep.set_configuration(LEFT, false).unwrap();
        ep.init().unwrap();
        let writes = ep.store().medium().write_count();

        ep.store_mut().medium_mut().set_fail_writes(true);
        ep.report_action(SemanticAction::from_network(ActionKind::On)).unwrap();
        ep.flush().unwrap();
        assert_eq!(ep.store().medium().write_count(), writes);
        assert!(!ep.store_mut().load().unwrap().last_on);

        ep.store_mut().medium_mut().set_fail_writes(false);
        ep.flush().unwrap();
        assert_eq!(ep.store().medium().write_count(), writes + 1);
        assert!(ep.store_mut().load().unwrap().last_on);

        // Nothing left to retry
        ep.flush().unwrap();
        assert_eq!(ep.store().medium().write_count(), writes + 1);
    }

    #[test]
    fn test_failed_config_write_is_retried_on_flush() {
        let mut ep = running(LEFT, true);
        ep.store_mut().medium_mut().set_fail_writes(true);
        let write = ClusterEvent::attribute_written(ClusterId::OnOffSwitchConfig, ATTR_MIN_LONG_PRESS, AttributeValue::U16(900));
        ep.handle_cluster_event(&write).unwrap();

        ep.store_mut().medium_mut().set_fail_writes(false);
        ep.flush().unwrap();
        assert_eq!(ep.store_mut().load().unwrap().min_long_press_ms, 900);
    }

    #[test]
    fn test_failed_registration_is_rolled_back() {
        let mut ep = endpoint_with(StaticBindings::new(), None);
        ep.stack_mut().set_cluster_limit(Some(3));
        ep.set_configuration(LEFT, false).unwrap();
        assert!(matches!(ep.init(), Err(SwitchError::UnsupportedOperation)));
        assert_eq!(ep.lifecycle(), Lifecycle::Configured);
        assert!(ep.stack().endpoints().is_empty());
        assert!(ep.stack().registered_clusters().is_empty());

        ep.stack_mut().set_cluster_limit(None);
        ep.init().unwrap();
        assert_eq!(ep.stack().endpoints(), &[EP]);
        assert_eq!(ep.stack().registered_clusters().len(), 7);
    }

    #[test]
    fn test_teardown_resets_views() {
        let stored = Configuration {
            pin_mask: LEFT,
            switch_type: SwitchType::Multifunction,
            ..Configuration::default()
        };
        let mut ep = endpoint_with(StaticBindings::new(), Some(stored));
        ep.set_configuration(LEFT, false).unwrap();
        ep.init().unwrap();
        ep.handle_cluster_event(&ClusterEvent::command(ClusterId::Identify, 0x00, &[30, 0]).unwrap())
            .unwrap();
        ep.handle_button(&ButtonEvent::new(LEFT, ButtonEdge::MultiClick(2))).unwrap();
        assert!(ep.is_identifying());

        ep.teardown().unwrap();
        assert!(!ep.is_identifying());
        assert_eq!(ep.views().multistate.present_value, 0);
        assert!(ep.views().on_off.is_none());
    }

    #[test]
    fn test_teardown_unregisters() {
        let mut ep = running(LEFT, false);
        ep.teardown().unwrap();
        assert!(ep.stack().endpoints().is_empty());
        assert!(ep.state().is_none());
        assert_eq!(ep.lifecycle(), Lifecycle::TornDown);
    }
}
