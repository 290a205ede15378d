//! State machines: one current state, advanced by matching events.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::event::Event;
use crate::core::history::{TransitionLog, TransitionRecord};
use crate::core::state::State;
use crate::dispatch::EventDispatcher;

/// Stable identifier assigned to a machine at construction.
///
/// Machine names are display-only and need not be unique; subscriber lists
/// compare machines by `MachineId`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct MachineId(Uuid);

impl MachineId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A state machine: a display name plus one current state, advanced by
/// events whose source matches that state.
///
/// Machines are cheap clonable handles; clones share identity and state,
/// which is what lets the same machine be held by a dispatcher's subscriber
/// list, a delayed-dispatch task, and the caller at once.
///
/// Only two operations mutate the current state: [`init`](Self::init)
/// unconditionally, and [`handle_event`](Self::handle_event) conditionally.
/// Transitions on one machine are serialized internally, so timer tasks and
/// a driving loop may deliver events to the same machine concurrently; the
/// current-state reference is never read mid-update.
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
/// let light = StateMachine::new("north");
/// light.init(&red, &dispatcher);
///
/// light.handle_event(&go, &dispatcher);
/// assert_eq!(light.current_state(), Some(green));
/// ```
#[derive(Clone)]
pub struct StateMachine {
    inner: Arc<MachineInner>,
}

struct MachineInner {
    id: MachineId,
    name: String,
    // Serializes the check-exit-update sequence; never held across on_enter
    // so enter callbacks may dispatch back into this machine.
    transition: Mutex<()>,
    current: RwLock<Option<State>>,
    log: Mutex<TransitionLog>,
}

impl StateMachine {
    /// Create a machine with the given display name and no current state.
    ///
    /// The machine ignores all events until [`init`](Self::init) is called.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(MachineInner {
                id: MachineId::new(),
                name: name.into(),
                transition: Mutex::new(()),
                current: RwLock::new(None),
                log: Mutex::new(TransitionLog::new()),
            }),
        }
    }

    /// The machine's stable identifier.
    pub fn id(&self) -> MachineId {
        self.inner.id
    }

    /// The machine's display name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The machine's current state, or `None` before the first `init`.
    pub fn current_state(&self) -> Option<State> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of the transitions taken since the last `init`.
    pub fn log(&self) -> TransitionLog {
        self.inner
            .log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Unconditionally set the current state and invoke its enter callback.
    ///
    /// Used once per machine at topology setup. Calling it again on a
    /// running machine is permitted: it overwrites the current state
    /// *without* invoking the previous state's exit callback and starts a
    /// fresh transition log. This asymmetry with
    /// [`handle_event`](Self::handle_event) is intentional.
    pub fn init(&self, state: &State, dispatcher: &EventDispatcher) {
        {
            let _transition = self
                .inner
                .transition
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *self
                .inner
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner) = Some(state.clone());
            *self
                .inner
                .log
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = TransitionLog::new();
        }
        tracing::debug!(machine = self.name(), state = state.name(), "initialized");
        state.enter(self, dispatcher);
    }

    /// Apply `event` if its source matches the current state.
    ///
    /// On a match: the current state's exit callback runs, the current-state
    /// reference moves to the event's destination, and the destination's
    /// enter callback runs — each exactly once, in that order. On a
    /// mismatch the call is a silent no-op, not an error; that is what lets
    /// one event be broadcast to machines in varying states, and what
    /// absorbs deliveries from stale delayed dispatches.
    pub fn handle_event(&self, event: &Event, dispatcher: &EventDispatcher) {
        let transition = self
            .inner
            .transition
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let current = self
            .inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(current) = current else {
            tracing::trace!(
                machine = self.name(),
                event = event.name(),
                "event ignored, machine not initialized"
            );
            return;
        };
        if current != *event.source() {
            tracing::trace!(
                machine = self.name(),
                event = event.name(),
                current = current.name(),
                expected = event.source().name(),
                "event ignored, source does not match"
            );
            return;
        }

        // Exit runs before the current-state reference moves.
        current.exit(self, dispatcher);
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(event.destination().clone());
        {
            let mut log = self
                .inner
                .log
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *log = log.record(TransitionRecord {
                from: current.name().to_string(),
                to: event.destination().name().to_string(),
                timestamp: Utc::now(),
            });
        }
        drop(transition);

        tracing::debug!(
            machine = self.name(),
            event = event.name(),
            from = current.name(),
            to = event.destination().name(),
            "transitioned"
        );
        event.destination().enter(self, dispatcher);
    }
}

impl PartialEq for StateMachine {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for StateMachine {}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field(
                "current",
                &self.current_state().map(|s| s.name().to_string()),
            )
            .finish()
    }
}
