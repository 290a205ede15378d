//! Named transition descriptors.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::state::State;

/// Stable identifier assigned to an event at construction.
///
/// Subscription tables are keyed by `EventId`, so two events that happen to
/// share a display name never share subscribers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An immutable, named descriptor of a permitted transition.
///
/// An event binds a human-readable name to exactly two states: the source a
/// machine must currently be in for the event to apply, and the destination
/// it moves to. All three are fixed at construction; construction cannot
/// fail. Clones are cheap and share the same identity.
///
/// The name is used for lookup through
/// [`EventDispatcher::get_event`](crate::EventDispatcher::get_event); it is
/// not required to be unique, though topologies built through
/// [`TopologyBuilder`](crate::TopologyBuilder) reject colliding names so
/// that lookup stays unambiguous.
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
/// assert_eq!(go.name(), "R2G");
/// assert_eq!(go.source(), &red);
/// assert_eq!(go.destination(), &green);
/// ```
#[derive(Clone)]
pub struct Event {
    inner: Arc<EventInner>,
}

struct EventInner {
    id: EventId,
    name: String,
    source: State,
    destination: State,
}

impl Event {
    /// Create an event named `name` describing the transition from `source`
    /// to `destination`.
    pub fn new(name: impl Into<String>, source: State, destination: State) -> Self {
        Self {
            inner: Arc::new(EventInner {
                id: EventId::new(),
                name: name.into(),
                source,
                destination,
            }),
        }
    }

    /// The event's stable identifier.
    pub fn id(&self) -> EventId {
        self.inner.id
    }

    /// The event's display/lookup name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The state a machine must be in for this event to apply.
    pub fn source(&self) -> &State {
        &self.inner.source
    }

    /// The state a machine moves to when this event applies.
    pub fn destination(&self) -> &State {
        &self.inner.destination
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Event {}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("source", &self.inner.source.name())
            .field("destination", &self.inner.destination.name())
            .finish()
    }
}
