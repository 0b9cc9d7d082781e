//! The handler contract and its single-slot registration.
//!
//! A handler runs synchronously inside the OS hook callback, so it must return
//! quickly and must not block. Whatever it does (return an error or panic),
//! the failure is converted into a [`HandlerError`] here and never reaches the
//! OS callback boundary.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use thiserror::Error;

use crate::domain::event::Event;

/// Error type handlers may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of a single handler invocation.
pub type HandlerResult = Result<(), BoxError>;

/// A failed handler invocation, caught at the dispatcher boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("handler returned an error: {0}")]
    Failed(String),
    #[error("handler panicked: {0}")]
    Panicked(String),
}

/// Receives every translated event.
///
/// Implemented for any `FnMut(&Event) -> HandlerResult`; wrap a closure in
/// [`handler_fn`] to get its signature inferred.
#[cfg_attr(test, mockall::automock)]
pub trait EventHandler {
    fn handle(&mut self, event: &Event) -> HandlerResult;
}

impl<F> EventHandler for F
where
    F: FnMut(&Event) -> HandlerResult,
{
    fn handle(&mut self, event: &Event) -> HandlerResult {
        self(event)
    }
}

/// Identity helper that pins a closure to the handler signature.
pub fn handler_fn<F>(f: F) -> F
where
    F: FnMut(&Event) -> HandlerResult,
{
    f
}

/// Single-slot handler registration shared by the dispatcher and its owner.
///
/// Cloning yields another reference to the same slot, so a handler can
/// capture a clone and replace or clear itself while it runs. During an
/// invocation the handler is taken out of the slot; it is put back afterwards
/// only if nobody called [`set`](Self::set) or [`clear`](Self::clear) in the
/// meantime.
#[derive(Clone, Default)]
pub struct HandlerSlot {
    inner: Rc<SlotInner>,
}

#[derive(Default)]
struct SlotInner {
    handler: RefCell<Option<Box<dyn EventHandler>>>,
    generation: Cell<u64>,
}

impl HandlerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handler`, replacing any previous one.
    pub fn set<H>(&self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.replace(Some(Box::new(handler)));
    }

    pub fn clear(&self) {
        self.replace(None);
    }

    /// Returns `true` when a handler is installed and not currently running.
    pub fn is_set(&self) -> bool {
        self.inner.handler.borrow().is_some()
    }

    fn replace(&self, handler: Option<Box<dyn EventHandler>>) {
        *self.inner.handler.borrow_mut() = handler;
        self.inner.generation.set(self.inner.generation.get().wrapping_add(1));
    }

    /// Runs the handler on `event`, if one is set.
    ///
    /// Returns `None` when the slot is empty.
    pub(crate) fn invoke(&self, event: &Event) -> Option<Result<(), HandlerError>> {
        let mut handler = self.inner.handler.borrow_mut().take()?;
        let generation = self.inner.generation.get();

        let result = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(event)));

        if self.inner.generation.get() == generation {
            *self.inner.handler.borrow_mut() = Some(handler);
        }

        Some(match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(HandlerError::Failed(e.to_string())),
            Err(payload) => Err(HandlerError::Panicked(panic_message(payload.as_ref()))),
        })
    }
}

impl fmt::Debug for HandlerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSlot")
            .field("set", &self.is_set())
            .field("generation", &self.inner.generation.get())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{EventType, MouseEvent};
    use crate::keymap::MouseButtonId;

    fn click() -> Event {
        Event::Mouse(MouseEvent {
            current_key: MouseButtonId::LButton,
            event_type: EventType::KeyDown,
            wheel_delta: None,
        })
    }

    #[test]
    fn test_empty_slot_invokes_nothing() {
        let slot = HandlerSlot::new();
        assert!(!slot.is_set());
        assert!(slot.invoke(&click()).is_none());
    }

    #[test]
    fn test_mock_handler_receives_each_event() {
        // Arrange
        let mut mock = MockEventHandler::new();
        mock.expect_handle().times(2).returning(|_| Ok(()));
        let slot = HandlerSlot::new();
        slot.set(mock);

        // Act
        let first = slot.invoke(&click());
        let second = slot.invoke(&click());

        // Assert
        assert_eq!(first, Some(Ok(())));
        assert_eq!(second, Some(Ok(())));
        assert!(slot.is_set());
    }

    #[test]
    fn test_returned_error_becomes_failed() {
        let slot = HandlerSlot::new();
        slot.set(handler_fn(|_| Err("disk full".into())));

        let result = slot.invoke(&click());

        assert_eq!(
            result,
            Some(Err(HandlerError::Failed("disk full".to_string())))
        );
        assert!(slot.is_set(), "a failing handler stays registered");
    }

    #[test]
    fn test_panic_becomes_panicked() {
        let slot = HandlerSlot::new();
        slot.set(handler_fn(|_| panic!("boom")));

        let result = slot.invoke(&click());

        assert_eq!(result, Some(Err(HandlerError::Panicked("boom".to_string()))));
        assert!(slot.is_set(), "a panicking handler stays registered");
    }

    #[test]
    fn test_handler_can_replace_itself() {
        let slot = HandlerSlot::new();
        let inner = slot.clone();
        slot.set(handler_fn(move |_| {
            inner.set(handler_fn(|_| Err("second".into())));
            Ok(())
        }));

        assert_eq!(slot.invoke(&click()), Some(Ok(())));
        assert_eq!(
            slot.invoke(&click()),
            Some(Err(HandlerError::Failed("second".to_string())))
        );
    }

    #[test]
    fn test_handler_can_clear_itself() {
        let slot = HandlerSlot::new();
        let inner = slot.clone();
        slot.set(handler_fn(move |_| {
            inner.clear();
            Ok(())
        }));

        assert_eq!(slot.invoke(&click()), Some(Ok(())));
        assert!(!slot.is_set());
        assert!(slot.invoke(&click()).is_none());
    }
}
