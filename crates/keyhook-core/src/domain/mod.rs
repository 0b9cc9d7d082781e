//! Domain entities for keyhook.
//!
//! Pure data with no OS dependencies: the event types handed to the handler
//! and the pressed-key set the dispatcher maintains. Everything here compiles
//! and tests on any platform.

/// Keyboard/mouse events and their direction.
pub mod event;

/// Ordered, duplicate-free set of held keys.
pub mod pressed;
