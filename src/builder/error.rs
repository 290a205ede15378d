//! Build errors for topology construction.

use thiserror::Error;

/// Errors that can occur when building a topology.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No state machines registered. Call .machine(machine, initial) before .build()")]
    NoMachines,

    #[error("State machine '{name}' registered more than once")]
    DuplicateMachine { name: String },

    #[error("Event name '{name}' is bound to two distinct events")]
    DuplicateEventName { name: String },
}
