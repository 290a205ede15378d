//! Builder for wiring a complete topology.

use std::collections::{HashMap, HashSet};

use crate::builder::error::BuildError;
use crate::core::{Event, EventId, State, StateMachine};
use crate::dispatch::EventDispatcher;

/// Builder collecting machines, initial states, and subscriptions into a
/// wired dispatcher.
///
/// `build` validates the collected topology, creates a fresh
/// [`EventDispatcher`], applies every subscription, and only then
/// initializes the machines in registration order — so enter callbacks that
/// dispatch during initialization already see the full subscription table.
///
/// The builder is a convenience; the wiring API on [`EventDispatcher`] and
/// [`StateMachine`] can be used directly instead.
///
/// # Example
///
/// ```rust
/// use cascade::{Event, EventDispatcher, State, StateBehavior, StateMachine, TopologyBuilder};
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
/// let north = StateMachine::new("north");
/// let south = StateMachine::new("south");
///
/// let dispatcher = TopologyBuilder::new()
///     .machine(north.clone(), red.clone())
///     .machine(south.clone(), red.clone())
///     .subscribe(go.clone(), [north.clone(), south.clone()])
///     .build()
///     .unwrap();
///
/// dispatcher.dispatch(&go);
/// assert_eq!(north.current_state(), Some(green.clone()));
/// assert_eq!(south.current_state(), Some(green));
/// ```
#[derive(Default)]
pub struct TopologyBuilder {
    machines: Vec<(StateMachine, State)>,
    subscriptions: Vec<(Event, Vec<StateMachine>)>,
}

impl TopologyBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a machine with the state it starts in.
    pub fn machine(mut self, machine: StateMachine, initial: State) -> Self {
        self.machines.push((machine, initial));
        self
    }

    /// Subscribe machines to an event, in the given order.
    ///
    /// May be called repeatedly for the same event; subscriber lists append.
    pub fn subscribe(
        mut self,
        event: Event,
        machines: impl IntoIterator<Item = StateMachine>,
    ) -> Self {
        self.subscriptions
            .push((event, machines.into_iter().collect()));
        self
    }

    /// Validate the topology, wire a dispatcher, and initialize every
    /// machine.
    ///
    /// Fails if no machine was registered, a machine was registered twice,
    /// or one event name is bound to two distinct events (which would make
    /// name lookup ambiguous).
    pub fn build(self) -> Result<EventDispatcher, BuildError> {
        if self.machines.is_empty() {
            return Err(BuildError::NoMachines);
        }

        let mut seen = HashSet::new();
        for (machine, _) in &self.machines {
            if !seen.insert(machine.id()) {
                return Err(BuildError::DuplicateMachine {
                    name: machine.name().to_string(),
                });
            }
        }

        let mut names: HashMap<&str, EventId> = HashMap::new();
        for (event, _) in &self.subscriptions {
            match names.get(event.name()) {
                Some(id) if *id != event.id() => {
                    return Err(BuildError::DuplicateEventName {
                        name: event.name().to_string(),
                    });
                }
                _ => {
                    names.insert(event.name(), event.id());
                }
            }
        }

        let dispatcher = EventDispatcher::new();
        for (event, machines) in &self.subscriptions {
            dispatcher.subscribe(event, machines.iter().cloned());
        }
        for (machine, initial) in &self.machines {
            machine.init(initial, &dispatcher);
        }
        Ok(dispatcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateBehavior;
    use std::sync::{Arc, Mutex};

    struct Plain(&'static str);

    impl StateBehavior for Plain {
        fn name(&self) -> &str {
            self.0
        }

        fn on_enter(&self, _machine: &StateMachine, _dispatcher: &EventDispatcher) {}
    }

    #[test]
    fn build_requires_a_machine() {
        let result = TopologyBuilder::new().build();
        assert!(matches!(result, Err(BuildError::NoMachines)));
    }

    #[test]
    fn build_rejects_duplicate_machines() {
        let red = State::new(Plain("Red"));
        let machine = StateMachine::new("M");

        let result = TopologyBuilder::new()
            .machine(machine.clone(), red.clone())
            .machine(machine, red)
            .build();

        assert!(matches!(
            result,
            Err(BuildError::DuplicateMachine { name }) if name == "M"
        ));
    }

    #[test]
    fn build_rejects_colliding_event_names() {
        let red = State::new(Plain("Red"));
        let green = State::new(Plain("Green"));
        let first = Event::new("GO", red.clone(), green.clone());
        let second = Event::new("GO", green, red.clone());
        let machine = StateMachine::new("M");

        let result = TopologyBuilder::new()
            .machine(machine.clone(), red)
            .subscribe(first, [machine.clone()])
            .subscribe(second, [machine])
            .build();

        assert!(matches!(
            result,
            Err(BuildError::DuplicateEventName { name }) if name == "GO"
        ));
    }

    #[test]
    fn repeated_subscription_of_one_event_is_allowed() {
        let red = State::new(Plain("Red"));
        let green = State::new(Plain("Green"));
        let go = Event::new("GO", red.clone(), green.clone());
        let a = StateMachine::new("A");
        let b = StateMachine::new("B");

        let dispatcher = TopologyBuilder::new()
            .machine(a.clone(), red.clone())
            .machine(b.clone(), red)
            .subscribe(go.clone(), [a])
            .subscribe(go.clone(), [b])
            .build()
            .unwrap();

        assert_eq!(dispatcher.subscriber_count(&go), 2);
    }

    #[test]
    fn build_initializes_machines() {
        let red = State::new(Plain("Red"));
        let machine = StateMachine::new("M");

        TopologyBuilder::new()
            .machine(machine.clone(), red.clone())
            .build()
            .unwrap();

        assert_eq!(machine.current_state(), Some(red));
    }

    struct Announcing {
        name: &'static str,
        announce: Option<&'static str>,
        reached: Arc<Mutex<Vec<String>>>,
    }

    impl StateBehavior for Announcing {
        fn name(&self) -> &str {
            self.name
        }

        fn on_enter(&self, machine: &StateMachine, dispatcher: &EventDispatcher) {
            self.reached
                .lock()
                .unwrap()
                .push(format!("{}:{}", machine.name(), self.name));
            if let Some(event_name) = self.announce {
                if let Some(event) = dispatcher.get_event(event_name) {
                    dispatcher.dispatch(&event);
                }
            }
        }
    }

    #[test]
    fn subscriptions_are_live_during_initialization() {
        let reached = Arc::new(Mutex::new(Vec::new()));
        // The controller's initial state broadcasts "GO" as it is entered;
        // the light must already be subscribed for the cascade to land.
        let all_stop = State::new(Announcing {
            name: "AllStop",
            announce: Some("GO"),
            reached: reached.clone(),
        });
        let red = State::new(Announcing {
            name: "Red",
            announce: None,
            reached: reached.clone(),
        });
        let green = State::new(Announcing {
            name: "Green",
            announce: None,
            reached: reached.clone(),
        });
        let go = Event::new("GO", red.clone(), green.clone());

        let light = StateMachine::new("light");
        let controller = StateMachine::new("controller");

        TopologyBuilder::new()
            .machine(light.clone(), red)
            .machine(controller.clone(), all_stop)
            .subscribe(go, [light.clone()])
            .build()
            .unwrap();

        assert_eq!(light.current_state(), Some(green));
        let entries = reached.lock().unwrap().clone();
        assert_eq!(
            entries,
            vec!["light:Red", "controller:AllStop", "light:Green"]
        );
    }
}
