//! Authoritative on/off (and level) state of a server-capable endpoint.
//!
//! Every mutation raises a report intent and a persist intent. Intents are
//! coalesced: any number of mutations between two calls to
//! [`SwitchState::take_pending`] produce a single report and a single write
//! carrying the final value.
//!
//! ## Example
//!
//! ```rust
//! use zigbee_switch::state::SwitchState;
//!
//! let mut state = SwitchState::new(false, None);
//! state.set(true);
//! state.set(true);
//! state.set(false);
//!
//! let pending = state.take_pending();
//! assert!(pending.report && pending.persist);
//! assert!(!state.get());
//! assert!(state.take_pending().is_empty());
//! ```

/// Report/persist work produced since the last cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingIntents {
    /// An On/Off attribute report is due
    pub report: bool,
    /// The state should be written to storage
    pub persist: bool,
}

impl PendingIntents {
    /// Nothing to do
    pub const fn is_empty(&self) -> bool {
        !self.report && !self.persist
    }
}

/// On/off value plus optional level, with coalesced change signalling.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchState {
    on: bool,
    level: Option<u8>,
    dirty: bool,
    pending: PendingIntents,
}

impl SwitchState {
    /// Create the state. `level` is `Some` only when the endpoint keeps a local level.
    pub const fn new(on: bool, level: Option<u8>) -> Self {
        Self {
            on,
            level,
            dirty: false,
            pending: PendingIntents {
                report: false,
                persist: false,
            },
        }
    }

    /// Current on/off value
    pub fn get(&self) -> bool {
        self.on
    }

    /// Set the on/off value.
    ///
    /// Setting the current value is a no-op. Returns `true` if the value changed.
    pub fn set(&mut self, on: bool) -> bool {
        if self.on == on {
            return false;
        }
        self.on = on;
        self.mark_changed();
        true
    }

    /// Invert the on/off value and return the new one
    pub fn toggle(&mut self) -> bool {
        self.set(!self.on);
        self.on
    }

    /// Current level, `None` without level capability
    pub fn level(&self) -> Option<u8> {
        self.level
    }

    /// Set the level.
    ///
    /// Ignored without level capability. Returns `true` if the level changed.
    pub fn set_level(&mut self, value: u8) -> bool {
        match self.level {
            Some(current) if current != value => {
                self.level = Some(value);
                self.mark_changed();
                true
            }
            _ => false,
        }
    }

    /// Whether a mutation happened since the last completed cycle
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force a report without changing anything (re-announce after join)
    pub fn request_report(&mut self) {
        self.pending.report = true;
    }

    /// Take the coalesced intents and complete the cycle
    pub fn take_pending(&mut self) -> PendingIntents {
        self.dirty = false;
        core::mem::take(&mut self.pending)
    }

    fn mark_changed(&mut self) {
        self.dirty = true;
        self.pending.report = true;
        self.pending.persist = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_parity() {
        for initial in [false, true] {
            for n in 0..7u32 {
                let mut state = SwitchState::new(initial, None);
                for _ in 0..n {
                    state.toggle();
                }
                assert_eq!(state.get(), initial ^ (n % 2 == 1), "initial={initial} n={n}");
            }
        }
    }

    #[test]
    fn test_set_same_value_is_noop() {
        let mut state = SwitchState::new(true, None);
        assert!(!state.set(true));
        assert!(!state.is_dirty());
        assert!(state.take_pending().is_empty());
    }

    #[test]
    fn test_coalesced_intents() {
        let mut state = SwitchState::new(false, None);
        state.set(true);
        state.set(true);
        state.set(false);
        assert!(state.is_dirty());

        let pending = state.take_pending();
        assert_eq!(pending, PendingIntents { report: true, persist: true });
        assert!(!state.get());
        assert!(!state.is_dirty());
        assert!(state.take_pending().is_empty());
    }

    #[test]
    fn test_level_requires_capability() {
        let mut state = SwitchState::new(false, None);
        assert!(!state.set_level(10));
        assert_eq!(state.level(), None);

        let mut state = SwitchState::new(false, Some(0));
        assert!(state.set_level(10));
        assert!(!state.set_level(10));
        assert_eq!(state.level(), Some(10));
        assert!(state.take_pending().persist);
    }

    #[test]
    fn test_request_report_does_not_persist() {
        let mut state = SwitchState::new(false, None);
        state.request_report();
        let pending = state.take_pending();
        assert!(pending.report);
        assert!(!pending.persist);
        assert!(!state.get());
    }
}
