//! Cascade: an event-driven finite state machine framework.
//!
//! Independent state machines transition in response to named events, and a
//! shared [`EventDispatcher`] lets machines broadcast events to any number
//! of other machines subscribed to them — or deliver them directly to one
//! machine — optionally after a time delay on a background task.
//!
//! # Core Concepts
//!
//! - **[`Event`]**: an immutable, named descriptor of a permitted transition
//!   from one state to another
//! - **[`State`]**: a behavior unit with enter/exit callbacks, shared across
//!   events and machines via the [`StateBehavior`] trait
//! - **[`StateMachine`]**: holds one current state and applies an event only
//!   when the event's source matches it
//! - **[`EventDispatcher`]**: the registry routing events to subscribers,
//!   with broadcast, direct, and delayed dispatch
//!
//! An enter callback may ask the dispatcher to dispatch further events,
//! synchronously or after a delay, so a topology keeps itself moving: one
//! transition schedules the next, forming a self-sustaining cascade. A
//! delayed dispatch that arrives after its machine has already moved on is
//! silently ignored by the source-match check — that no-op guard, not
//! cancellation, is what keeps stale timers harmless.
//!
//! # Example
//!
//! ```rust
//! use cascade::{Event, EventDispatcher, State, StateBehavior, StateMachine};
//!
//! struct Lamp(&'static str);
//!
//! impl StateBehavior for Lamp {
//!     fn name(&self) -> &str {
//!         self.0
//!     }
//!
//!     fn on_enter(&self, machine: &StateMachine, _dispatcher: &EventDispatcher) {
//!         println!("{} is now {}", machine.name(), self.0);
//!     }
//! }
//!
//! let red = State::new(Lamp("Red"));
//! let green = State::new(Lamp("Green"));
//! let go = Event::new("R2G", red.clone(), green.clone());
//!
//! let dispatcher = EventDispatcher::new();
//! let light = StateMachine::new("north");
//! light.init(&red, &dispatcher);
//! dispatcher.subscribe(&go, [light.clone()]);
//!
//! dispatcher.dispatch(&go);
//! assert_eq!(light.current_state(), Some(green));
//! ```

pub mod builder;
pub mod core;
pub mod dispatch;

// Re-export commonly used types
pub use crate::builder::{BuildError, TopologyBuilder};
pub use crate::core::{
    Event, EventId, MachineId, State, StateBehavior, StateId, StateMachine, TransitionLog,
    TransitionRecord,
};
pub use crate::dispatch::{DispatchTarget, EventDispatcher};
