//! State behaviors and the shared `State` handle.
//!
//! A state is a behavior unit with entry/exit callbacks. The same state may
//! be the source or destination of many events and may be the current state
//! of many machines at the same time, so states are handed around as cheap
//! clonable handles sharing one behavior object.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::machine::StateMachine;
use crate::dispatch::EventDispatcher;

/// Stable identifier assigned to a state at construction.
///
/// Identity of a state is the handle it was created as, not its display
/// name: two states built from behaviors with the same name are still
/// distinct.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct StateId(Uuid);

impl StateId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Behavior of a state: what happens when a machine enters or leaves it.
///
/// `on_enter` runs after the machine's current-state reference has been
/// updated to this state; `on_exit` runs before it moves away. An enter
/// callback may dispatch further events through the given dispatcher,
/// synchronously or by scheduling a delayed dispatch — that is how
/// transition cascades are built.
///
/// Work scheduled from `on_enter` is not cancelled when the machine later
/// leaves the state. A late delivery is absorbed by the source-match check
/// in [`StateMachine::handle_event`], so behaviors do not need their own
/// cancellation bookkeeping.
///
/// An exit callback runs while its machine's transition lock is held and
/// must not synchronously dispatch an event targeting that same machine;
/// enter callbacks have no such restriction.
///
/// # Example
///
/// ```rust
/// use cascade::{EventDispatcher, State, StateBehavior, StateMachine};
///
/// struct Red;
///
/// impl StateBehavior for Red {
///     fn name(&self) -> &str {
///         "Red"
///     }
///
///     fn on_enter(&self, machine: &StateMachine, _dispatcher: &EventDispatcher) {
///         println!("{} stopped", machine.name());
///     }
/// }
///
/// let red = State::new(Red);
/// assert_eq!(red.name(), "Red");
/// ```
pub trait StateBehavior: Send + Sync {
    /// Display name used for logging and transition records.
    ///
    /// Names carry no identity; see [`StateId`].
    fn name(&self) -> &str;

    /// Called once per transition into this state, after the machine's
    /// current-state reference points here.
    fn on_enter(&self, machine: &StateMachine, dispatcher: &EventDispatcher);

    /// Called once per transition out of this state, before the machine's
    /// current-state reference moves.
    ///
    /// Defaults to doing nothing.
    fn on_exit(&self, _machine: &StateMachine, _dispatcher: &EventDispatcher) {}
}

/// Clonable handle to a shared state.
///
/// Clones share the same id and behavior object; handle equality is id
/// equality. Events hold `State` handles as their source and destination,
/// and machines hold one as their current state.
///
/// # Example
///
/// ```rust
/// use cascade::{EventDispatcher, State, StateBehavior, StateMachine};
///
/// struct Idle;
///
/// impl StateBehavior for Idle {
///     fn name(&self) -> &str {
///         "Idle"
///     }
///
///     fn on_enter(&self, _machine: &StateMachine, _dispatcher: &EventDispatcher) {}
/// }
///
/// let idle = State::new(Idle);
/// let same = idle.clone();
/// let other = State::new(Idle);
///
/// assert_eq!(idle, same);
/// assert_ne!(idle, other);
/// ```
#[derive(Clone)]
pub struct State {
    id: StateId,
    behavior: Arc<dyn StateBehavior>,
}

impl State {
    /// Wrap a behavior in a new state handle with a fresh id.
    pub fn new(behavior: impl StateBehavior + 'static) -> Self {
        Self {
            id: StateId::new(),
            behavior: Arc::new(behavior),
        }
    }

    /// The state's stable identifier.
    pub fn id(&self) -> StateId {
        self.id
    }

    /// The behavior's display name.
    pub fn name(&self) -> &str {
        self.behavior.name()
    }

    pub(crate) fn enter(&self, machine: &StateMachine, dispatcher: &EventDispatcher) {
        self.behavior.on_enter(machine, dispatcher);
    }

    pub(crate) fn exit(&self, machine: &StateMachine, dispatcher: &EventDispatcher) {
        self.behavior.on_exit(machine, dispatcher);
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for State {}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}
