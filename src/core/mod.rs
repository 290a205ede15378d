//! Core state machine types.
//!
//! This module contains the building blocks of a topology:
//! - States and their enter/exit behaviors via the `StateBehavior` trait
//! - Events as immutable named transition descriptors
//! - State machines with the conditional transition guard
//! - Transition logging for observability
//!
//! Everything here is identified by stable ids assigned at construction;
//! display names are for humans and logs only.

mod event;
mod history;
mod machine;
mod state;

pub use event::{Event, EventId};
pub use history::{TransitionLog, TransitionRecord};
pub use machine::{MachineId, StateMachine};
pub use state::{State, StateBehavior, StateId};
