//! Event routing: the shared dispatcher, subscriptions, and delayed
//! dispatch.
//!
//! This module is the hub of a topology: machines broadcast events to any
//! number of other machines subscribed to them, deliver events directly to
//! one machine, or schedule either form after a delay on a background task.

mod dispatcher;
mod scheduler;

pub use dispatcher::EventDispatcher;
pub use scheduler::DispatchTarget;
