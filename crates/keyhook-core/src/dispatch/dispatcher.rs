//! Event dispatcher: the logic behind each low-level hook callback.
//!
//! The OS backend hands every raw keyboard/mouse message to [`Dispatcher`],
//! which translates it, updates the pressed-key set and runs the handler.
//! Every method is total: translation failures and handler failures come back
//! as a [`DispatchOutcome`] value, so the backend can always forward the event
//! to the next hook in the chain afterwards.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::handler::{HandlerError, HandlerSlot};
use crate::domain::event::{Event, EventType, KeyboardEvent, MouseEvent};
use crate::domain::pressed::PressedKeySet;
use crate::keymap::{self, mouse::WM_MOUSEMOVE, KeyId, UnknownCodeError};

/// Dispatcher shared between the session and the OS hook callback.
///
/// Deliberately `!Send`: the callback only ever runs on the installing thread.
pub type SharedDispatcher = Rc<RefCell<Dispatcher>>;

/// What happened to one raw message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event was built and the handler accepted it.
    Delivered(Event),
    /// The event was built but no handler is set.
    Unhandled(Event),
    /// The handler failed; the event still counts as processed.
    HandlerFailed(Event, HandlerError),
    /// A mouse move, which carries no button.
    Ignored,
    /// A raw code had no translation.
    Dropped(UnknownCodeError),
}

impl DispatchOutcome {
    /// The event built for this message, if any.
    pub fn event(&self) -> Option<&Event> {
        match self {
            DispatchOutcome::Delivered(e)
            | DispatchOutcome::Unhandled(e)
            | DispatchOutcome::HandlerFailed(e, _) => Some(e),
            DispatchOutcome::Ignored | DispatchOutcome::Dropped(_) => None,
        }
    }
}

/// Running counters kept by the dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Raw messages received, including ignored and dropped ones.
    pub received: u64,
    pub delivered: u64,
    pub unhandled: u64,
    pub ignored: u64,
    pub dropped: u64,
    pub handler_failures: u64,
}

/// Translates raw hook messages into [`Event`]s and delivers them.
///
/// Owns the [`PressedKeySet`]; outside code only ever sees snapshots.
#[derive(Debug, Default)]
pub struct Dispatcher {
    pressed: PressedKeySet,
    handler: HandlerSlot,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dispatcher that delivers to an existing handler slot.
    pub fn with_handler_slot(handler: HandlerSlot) -> Self {
        Self {
            handler,
            ..Self::default()
        }
    }

    pub fn into_shared(self) -> SharedDispatcher {
        Rc::new(RefCell::new(self))
    }

    /// Returns another reference to this dispatcher's handler slot.
    pub fn handler_slot(&self) -> HandlerSlot {
        self.handler.clone()
    }

    pub fn pressed_keys(&self) -> Vec<KeyId> {
        self.pressed.snapshot()
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Forgets all held keys, e.g. after the keyboard hook is removed and
    /// key-ups can no longer be observed.
    pub fn reset_pressed(&mut self) {
        self.pressed.clear();
    }

    /// Handles one `WH_KEYBOARD_LL` message.
    ///
    /// `vk_code` is `KBDLLHOOKSTRUCT::vkCode`, `message` is the hook's `wParam`.
    pub fn on_keyboard(&mut self, vk_code: u32, message: u32) -> DispatchOutcome {
        self.stats.received += 1;

        let key = match keymap::translate_key(vk_code) {
            Ok(key) => key,
            Err(e) => return self.drop_message(e),
        };
        let event_type = match keymap::translate_message(message) {
            Ok(event_type) => event_type,
            Err(e) => return self.drop_message(e),
        };

        match event_type {
            EventType::KeyDown => {
                self.pressed.add(key);
            }
            EventType::KeyUp => {
                self.pressed.remove(key);
            }
            EventType::None => {}
        }

        self.deliver(Event::Keyboard(KeyboardEvent {
            current_key: key,
            event_type,
            pressed_keys: self.pressed.snapshot(),
        }))
    }

    /// Handles one `WH_MOUSE_LL` message.
    ///
    /// `message` is the hook's `wParam`; `mouse_data` is
    /// `MSLLHOOKSTRUCT::mouseData`, whose high word holds the wheel delta.
    pub fn on_mouse(&mut self, message: u32, mouse_data: u32) -> DispatchOutcome {
        self.stats.received += 1;

        if message == WM_MOUSEMOVE {
            self.stats.ignored += 1;
            return DispatchOutcome::Ignored;
        }

        let (button, event_type) = match keymap::translate_mouse(message) {
            Ok(entry) => entry,
            Err(e) => return self.drop_message(e),
        };
        let wheel_delta = button.is_wheel().then(|| wheel_delta_of(mouse_data));

        self.deliver(Event::Mouse(MouseEvent {
            current_key: button,
            event_type,
            wheel_delta,
        }))
    }

    fn deliver(&mut self, event: Event) -> DispatchOutcome {
        match self.handler.invoke(&event) {
            None => {
                self.stats.unhandled += 1;
                DispatchOutcome::Unhandled(event)
            }
            Some(Ok(())) => {
                trace!(?event, "event delivered");
                self.stats.delivered += 1;
                DispatchOutcome::Delivered(event)
            }
            Some(Err(e)) => {
                warn!(?event, "input handler failed: {e}");
                self.stats.handler_failures += 1;
                DispatchOutcome::HandlerFailed(event, e)
            }
        }
    }

    fn drop_message(&mut self, error: UnknownCodeError) -> DispatchOutcome {
        debug!("dropping input event: {error}");
        self.stats.dropped += 1;
        DispatchOutcome::Dropped(error)
    }
}

/// Extracts the signed wheel delta from the high word of `mouseData`.
fn wheel_delta_of(mouse_data: u32) -> i16 {
    (mouse_data >> 16) as u16 as i16
}
