//! The shared event dispatcher and its subscription registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::core::{Event, EventId, StateMachine};

#[derive(Default)]
struct Registry {
    entries: HashMap<EventId, Subscription>,
}

struct Subscription {
    event: Event,
    machines: Vec<StateMachine>,
}

/// Shared registry routing events to subscribed state machines.
///
/// The dispatcher maps each subscribed event to an ordered list of machines
/// and delivers dispatch calls to all of them (broadcast) or to one machine
/// regardless of subscription (direct). It owns the subscription table but
/// not the machines or events it references.
///
/// Dispatchers are cheap clonable handles over one shared registry; pass a
/// clone wherever routing is needed — into enter callbacks, delayed-dispatch
/// tasks, a driving loop — rather than keeping any global instance. The
/// registry is guarded by a read/write lock, so subscriptions may change
/// from one task while another is mid-broadcast.
///
/// # Example
///
/// ```rust
/// use cascade::{Event, EventDispatcher, State, StateBehavior, StateMachine};
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
/// let red = State::new(Lamp("Red"));
/// let green = State::new(Lamp("Green"));
/// let go = Event::new("R2G", red.clone(), green.clone());
///
/// let dispatcher = EventDispatcher::new();
/// let north = StateMachine::new("north");
/// let south = StateMachine::new("south");
/// north.init(&red, &dispatcher);
/// south.init(&red, &dispatcher);
///
/// dispatcher.subscribe(&go, [north.clone(), south.clone()]);
/// dispatcher.dispatch(&go);
///
/// assert_eq!(north.current_state(), Some(green.clone()));
/// assert_eq!(south.current_state(), Some(green));
/// ```
#[derive(Clone, Default)]
pub struct EventDispatcher {
    registry: Arc<RwLock<Registry>>,
}

impl EventDispatcher {
    /// Create a dispatcher with an empty subscription registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe each of `machines`, in order, to `event`.
    ///
    /// Entries append to the event's subscriber list, so subscription order
    /// is broadcast order. Subscribing the same machine to the same event
    /// twice yields two entries and two deliveries per broadcast; nothing is
    /// deduplicated.
    pub fn subscribe(&self, event: &Event, machines: impl IntoIterator<Item = StateMachine>) {
        let mut registry = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let subscription = registry
            .entries
            .entry(event.id())
            .or_insert_with(|| Subscription {
                event: event.clone(),
                machines: Vec::new(),
            });
        for machine in machines {
            tracing::trace!(
                event = event.name(),
                machine = machine.name(),
                "subscribed"
            );
            subscription.machines.push(machine);
        }
    }

    /// Remove every subscriber entry for `machine` from `event`.
    ///
    /// Removal is scoped to the given event: the machine's subscriptions to
    /// other events are untouched. The event itself stays registered, so
    /// [`get_event`](Self::get_event) keeps resolving its name afterwards.
    pub fn unsubscribe(&self, event: &Event, machine: &StateMachine) {
        let mut registry = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(subscription) = registry.entries.get_mut(&event.id()) {
            subscription.machines.retain(|m| m.id() != machine.id());
            tracing::trace!(
                event = event.name(),
                machine = machine.name(),
                "unsubscribed"
            );
        }
    }

    /// Broadcast `event` to every machine currently subscribed to it, in
    /// subscription order.
    ///
    /// The subscriber list is snapshotted before delivery begins, so enter
    /// and exit callbacks may subscribe or unsubscribe machines without
    /// affecting the broadcast in flight. Delivery is sequential on the
    /// caller's task; a slow callback in one subscriber delays the rest.
    pub fn dispatch(&self, event: &Event) {
        let subscribers: Vec<StateMachine> = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            registry
                .entries
                .get(&event.id())
                .map(|subscription| subscription.machines.clone())
                .unwrap_or_default()
        };
        tracing::debug!(
            event = event.name(),
            subscribers = subscribers.len(),
            "broadcast"
        );
        for machine in &subscribers {
            machine.handle_event(event, self);
        }
    }

    /// Deliver `event` to exactly one machine, bypassing subscription
    /// membership entirely.
    ///
    /// The machine need not be subscribed to the event, or to anything.
    pub fn dispatch_to(&self, event: &Event, machine: &StateMachine) {
        tracing::debug!(
            event = event.name(),
            machine = machine.name(),
            "direct dispatch"
        );
        machine.handle_event(event, self);
    }

    /// Look up a previously subscribed-to event by name.
    ///
    /// Only events that have been passed to [`subscribe`](Self::subscribe)
    /// at least once are discoverable; an event that exists but was never
    /// subscribed is invisible here. `None` is a normal outcome — a delayed
    /// dispatch firing after the topology changed handles it by skipping —
    /// not an error.
    pub fn get_event(&self, name: &str) -> Option<Event> {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        registry
            .entries
            .values()
            .find(|subscription| subscription.event.name() == name)
            .map(|subscription| subscription.event.clone())
    }

    /// Number of subscriber entries for `event`, duplicates included.
    pub fn subscriber_count(&self, event: &Event) -> usize {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        registry
            .entries
            .get(&event.id())
            .map(|subscription| subscription.machines.len())
            .unwrap_or(0)
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len();
        f.debug_struct("EventDispatcher")
            .field("events", &events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{State, StateBehavior};
    use std::sync::Mutex;

    struct Plain(&'static str);

    impl StateBehavior for Plain {
        fn name(&self) -> &str {
            self.0
        }

        fn on_enter(&self, _machine: &StateMachine, _dispatcher: &EventDispatcher) {}
    }

    struct Journaling {
        name: &'static str,
        journal: Arc<Mutex<Vec<String>>>,
    }

    impl StateBehavior for Journaling {
        fn name(&self) -> &str {
            self.name
        }

        fn on_enter(&self, machine: &StateMachine, _dispatcher: &EventDispatcher) {
            self.journal
                .lock()
                .unwrap()
                .push(format!("{}:{}", machine.name(), self.name));
        }
    }

    #[test]
    fn broadcast_reaches_subscribers_in_order() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let red = State::new(Plain("Red"));
        let green = State::new(Journaling {
            name: "Green",
            journal: journal.clone(),
        });
        let r2g = Event::new("R2G", red.clone(), green);

        let dispatcher = EventDispatcher::new();
        let a = StateMachine::new("A");
        let b = StateMachine::new("B");
        let c = StateMachine::new("C");
        for machine in [&a, &b, &c] {
            machine.init(&red, &dispatcher);
        }
        dispatcher.subscribe(&r2g, [a, b, c]);

        dispatcher.dispatch(&r2g);

        let entries = journal.lock().unwrap().clone();
        assert_eq!(entries, vec!["A:Green", "B:Green", "C:Green"]);
    }

    #[test]
    fn broadcast_without_subscribers_is_a_no_op() {
        let red = State::new(Plain("Red"));
        let green = State::new(Plain("Green"));
        let r2g = Event::new("R2G", red, green);
        let dispatcher = EventDispatcher::new();

        dispatcher.dispatch(&r2g);
    }

    #[test]
    fn direct_dispatch_ignores_membership() {
        let red = State::new(Plain("Red"));
        let green = State::new(Plain("Green"));
        let r2g = Event::new("R2G", red.clone(), green.clone());
        let dispatcher = EventDispatcher::new();
        let machine = StateMachine::new("loner");
        machine.init(&red, &dispatcher);

        dispatcher.dispatch_to(&r2g, &machine);

        assert_eq!(machine.current_state(), Some(green));
    }

    #[test]
    fn duplicate_subscription_delivers_twice() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let red = State::new(Journaling {
            name: "Red",
            journal: journal.clone(),
        });
        let cycle = Event::new("R2R", red.clone(), red.clone());

        let dispatcher = EventDispatcher::new();
        let machine = StateMachine::new("M");
        machine.init(&red, &dispatcher);
        journal.lock().unwrap().clear();
        dispatcher.subscribe(&cycle, [machine.clone(), machine.clone()]);

        dispatcher.dispatch(&cycle);

        assert_eq!(dispatcher.subscriber_count(&cycle), 2);
        assert_eq!(journal.lock().unwrap().len(), 2);
    }

    #[test]
    fn unsubscribe_is_scoped_to_the_given_event() {
        let red = State::new(Plain("Red"));
        let green = State::new(Plain("Green"));
        let amber = State::new(Plain("Amber"));
        let r2g = Event::new("R2G", red.clone(), green.clone());
        let g2a = Event::new("G2A", green.clone(), amber.clone());

        let dispatcher = EventDispatcher::new();
        let machine = StateMachine::new("M");
        machine.init(&red, &dispatcher);
        dispatcher.subscribe(&r2g, [machine.clone()]);
        dispatcher.subscribe(&g2a, [machine.clone()]);

        dispatcher.unsubscribe(&r2g, &machine);

        dispatcher.dispatch(&r2g);
        assert_eq!(machine.current_state(), Some(red.clone()));

        // Still subscribed to the other event.
        dispatcher.dispatch_to(&r2g, &machine);
        dispatcher.dispatch(&g2a);
        assert_eq!(machine.current_state(), Some(amber));
    }

    #[test]
    fn unsubscribe_removes_duplicate_entries() {
        let red = State::new(Plain("Red"));
        let green = State::new(Plain("Green"));
        let r2g = Event::new("R2G", red, green);

        let dispatcher = EventDispatcher::new();
        let machine = StateMachine::new("M");
        dispatcher.subscribe(&r2g, [machine.clone(), machine.clone()]);
        assert_eq!(dispatcher.subscriber_count(&r2g), 2);

        dispatcher.unsubscribe(&r2g, &machine);

        assert_eq!(dispatcher.subscriber_count(&r2g), 0);
    }

    #[test]
    fn get_event_resolves_only_subscribed_events() {
        let red = State::new(Plain("Red"));
        let green = State::new(Plain("Green"));
        let r2g = Event::new("R2G", red, green);
        let dispatcher = EventDispatcher::new();

        assert!(dispatcher.get_event("R2G").is_none());

        dispatcher.subscribe(&r2g, [StateMachine::new("M")]);

        assert_eq!(dispatcher.get_event("R2G"), Some(r2g));
        assert!(dispatcher.get_event("G2A").is_none());
    }

    #[test]
    fn get_event_survives_unsubscribe() {
        let red = State::new(Plain("Red"));
        let green = State::new(Plain("Green"));
        let r2g = Event::new("R2G", red, green);
        let dispatcher = EventDispatcher::new();
        let machine = StateMachine::new("M");
        dispatcher.subscribe(&r2g, [machine.clone()]);

        dispatcher.unsubscribe(&r2g, &machine);

        assert_eq!(dispatcher.get_event("R2G"), Some(r2g));
    }
}
