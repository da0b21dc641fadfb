//! Async event loop for the switch endpoint (feature `embassy`).
//!
//! Interrupt handlers and the protocol engine glue only enqueue
//! [`InputEvent`]s into an [`EventChannel`]; the [`SwitchRunner`] drains it
//! into the endpoint and runs the report/persist cycle on a fixed period.
//!
//! ## Example
//!
//! ```rust,ignore
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use zigbee_switch::runner::{EventChannel, InputEvent, SwitchRunner};
//!
//! static EVENTS: EventChannel<CriticalSectionRawMutex> = EventChannel::new();
//!
//! // In the button task:
//! // EVENTS.send(InputEvent::Button(event)).await;
//!
//! // In the main task, after endpoint.init():
//! // SwitchRunner::new(&mut endpoint, EVENTS.receiver()).run().await;
//! ```

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, Receiver};
use embassy_time::{Duration, Ticker};

use crate::button::action::ButtonEvent;
use crate::config::ConfigurationStore;
use crate::endpoint::SwitchEndpoint;
use crate::error::Result;
use crate::zcl::binding::BindingTable;
use crate::zcl::event::{ClusterEvent, DeviceEvent};
use crate::zcl::stack::ZclStack;

/// Depth of the event queue
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// Period of the report/persist cycle
pub const REPORT_PERIOD: Duration = Duration::from_millis(250);

/// Anything the endpoint reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    /// Debounced button event
    Button(ButtonEvent),
    /// Cluster callback from the protocol engine
    Cluster(ClusterEvent),
    /// Network membership change
    Device(DeviceEvent),
}

/// Queue of events consumed by a [`SwitchRunner`]
pub type EventChannel<M> = Channel<M, InputEvent, EVENT_QUEUE_DEPTH>;

/// Drives one endpoint from an event queue.
pub struct SwitchRunner<'a, M: RawMutex, S, B, C> {
    endpoint: &'a mut SwitchEndpoint<S, B, C>,
    events: Receiver<'a, M, InputEvent, EVENT_QUEUE_DEPTH>,
    ticker: Ticker,
    elapsed_ms: u64,
}

impl<M: RawMutex, S, B, C> core::fmt::Debug for SwitchRunner<'_, M, S, B, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SwitchRunner")
            .field("elapsed_ms", &self.elapsed_ms)
            .finish_non_exhaustive()
    }
}

impl<'a, M, S, B, C> SwitchRunner<'a, M, S, B, C>
where
    M: RawMutex,
    S: ZclStack,
    B: BindingTable,
    C: ConfigurationStore,
{
    /// Create a runner for an initialized endpoint
    pub fn new(
        endpoint: &'a mut SwitchEndpoint<S, B, C>,
        events: Receiver<'a, M, InputEvent, EVENT_QUEUE_DEPTH>,
    ) -> Self {
        Self {
            endpoint,
            events,
            ticker: Ticker::every(REPORT_PERIOD),
            elapsed_ms: 0,
        }
    }

    /// Process events forever. Errors are logged and the loop continues.
    pub async fn run(mut self) -> ! {
        loop {
            if let Err(_e) = self.step().await {
                switch_log!(warn, "ep{}: event rejected", self.endpoint.endpoint_id());
            }
        }
    }

    /// Wait for the next event or report period and process it.
    pub async fn step(&mut self) -> Result<()> {
        let next = select(self.events.receive(), self.ticker.next()).await;
        match next {
            Either::First(event) => self.handle_event(&event),
            Either::Second(()) => self.on_period(),
        }
    }

    /// Feed one event to the endpoint.
    pub fn handle_event(&mut self, event: &InputEvent) -> Result<()> {
        match event {
            InputEvent::Button(button) => self.endpoint.handle_button(button).map(|_| ()),
            InputEvent::Cluster(cluster) => self.endpoint.handle_cluster_event(cluster),
            InputEvent::Device(device) => self.endpoint.handle_device_event(*device),
        }
    }

    fn on_period(&mut self) -> Result<()> {
        self.endpoint.flush()?;
        self.elapsed_ms += REPORT_PERIOD.as_millis();
        if self.elapsed_ms >= 1000 {
            self.elapsed_ms -= 1000;
            self.endpoint.tick(1)?;
        }
        Ok(())
    }
}
