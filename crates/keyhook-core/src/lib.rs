//! # keyhook-core
//!
//! Platform-free core of keyhook: everything between a raw low-level hook
//! message and the call into the user's handler.
//!
//! This crate has no dependency on OS APIs. The `keyhook` crate owns the
//! actual hook registration and message loop, and feeds raw codes in here.
//!
//! - **`keymap`**: static translation tables from Virtual Key codes, mouse
//!   messages and keyboard window messages to semantic identifiers.
//! - **`domain`**: the event types delivered to handlers and the ordered,
//!   duplicate-free set of held keys.
//! - **`dispatch`**: the dispatcher that ties the two together and the
//!   single-slot handler registration.

pub mod dispatch;
pub mod domain;
pub mod keymap;

pub use dispatch::{
    handler_fn, DispatchOutcome, DispatchStats, Dispatcher, EventHandler, HandlerError,
    HandlerResult, HandlerSlot, SharedDispatcher,
};
pub use domain::event::{Event, EventType, KeyboardEvent, MouseEvent};
pub use domain::pressed::PressedKeySet;
pub use keymap::{
    translate_key, translate_message, translate_mouse, KeyId, MouseButtonId, UnknownCodeError,
};
