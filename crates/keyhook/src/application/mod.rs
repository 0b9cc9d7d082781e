//! Application layer of keyhook.
//!
//! Sits between the platform-free core (`keyhook_core`) and the OS adapters in
//! `infrastructure`. Nothing in here talks to the OS directly; the session is
//! generic over a [`HookBackend`](crate::infrastructure::hook::HookBackend).
//!
//! # Sub-modules
//!
//! - **`session`**: installs hooks, runs the message loop and guarantees
//!   every hook is released on every exit path.
//!
//! - **`bindings`**: the trigger/held-keys/message bindings and the handler
//!   that prints them, used by the `keyhook` binary.

pub mod bindings;
pub mod session;
