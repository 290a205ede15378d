//! Delayed dispatch on background tasks.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::core::StateMachine;
use crate::dispatch::dispatcher::EventDispatcher;

/// Where a delayed dispatch should be delivered once its delay elapses.
#[derive(Clone, Debug)]
pub enum DispatchTarget {
    /// Broadcast to every machine subscribed to the event at fire time.
    Broadcast,
    /// Deliver directly to one machine, regardless of subscription.
    Machine(StateMachine),
}

impl EventDispatcher {
    /// Schedule a dispatch of the event named `event_name` after `delay`.
    ///
    /// Spawns a Tokio task that sleeps for the delay, resolves the event by
    /// name through [`get_event`](Self::get_event), and dispatches it to the
    /// target. Resolution happens at fire time, not at scheduling time: if
    /// no event with that name has been subscribed by then, the task logs
    /// and does nothing — an expected outcome, not an error.
    ///
    /// Dropping the returned handle leaves the task running detached, which
    /// is the usual fire-and-forget pattern for a state scheduling its own
    /// next transition. Aborting the handle cancels a pending dispatch, but
    /// the delivery-time source-match check in
    /// [`StateMachine::handle_event`] remains the correctness backstop: a
    /// dispatch that fires after its machine has moved on is a no-op either
    /// way.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cascade::{DispatchTarget, Event, EventDispatcher, State, StateBehavior, StateMachine};
    /// use std::time::Duration;
    ///
    /// struct Lamp(&'static str);
    ///
    /// impl StateBehavior for Lamp {
    ///     fn name(&self) -> &str {
    ///         self.0
    ///     }
    ///
    ///     fn on_enter(&self, _machine: &StateMachine, _dispatcher: &EventDispatcher) {}
    /// }
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let amber = State::new(Lamp("Amber"));
    /// let red = State::new(Lamp("Red"));
    /// let a2r = Event::new("A2R", amber.clone(), red.clone());
    ///
    /// let dispatcher = EventDispatcher::new();
    /// let light = StateMachine::new("north");
    /// light.init(&amber, &dispatcher);
    /// dispatcher.subscribe(&a2r, [light.clone()]);
    ///
    /// let pending = dispatcher.dispatch_after(
    ///     "A2R",
    ///     Duration::from_millis(10),
    ///     DispatchTarget::Machine(light.clone()),
    /// );
    /// pending.await.unwrap();
    ///
    /// assert_eq!(light.current_state(), Some(red));
    /// # }
    /// ```
    ///
    /// [`StateMachine::handle_event`]: crate::StateMachine::handle_event
    pub fn dispatch_after(
        &self,
        event_name: impl Into<String>,
        delay: Duration,
        target: DispatchTarget,
    ) -> JoinHandle<()> {
        let dispatcher = self.clone();
        let name = event_name.into();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match dispatcher.get_event(&name) {
                Some(event) => match &target {
                    DispatchTarget::Broadcast => dispatcher.dispatch(&event),
                    DispatchTarget::Machine(machine) => dispatcher.dispatch_to(&event, machine),
                },
                None => {
                    tracing::debug!(event = %name, "delayed dispatch skipped, event not subscribed");
                }
            }
        })
    }
}
