//! Event dispatch: turning raw hook messages into handler calls.
//!
//! [`dispatcher::Dispatcher`] holds the only mutable state in the core (the
//! pressed-key set) and the [`handler::HandlerSlot`]. Nothing in here can fail
//! outward: every error is reported as a value.

pub mod dispatcher;
pub mod handler;

pub use dispatcher::{DispatchOutcome, DispatchStats, Dispatcher, SharedDispatcher};
pub use handler::{
    handler_fn, BoxError, EventHandler, HandlerError, HandlerResult, HandlerSlot,
};
