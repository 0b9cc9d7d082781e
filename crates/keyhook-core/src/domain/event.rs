//! Structured input events delivered to the handler.

use serde::{Deserialize, Serialize};

use crate::keymap::{KeyId, MouseButtonId};

/// Direction of an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    KeyDown,
    KeyUp,
    /// Wheel rotation has no up/down.
    None,
}

/// A translated keyboard event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardEvent {
    pub current_key: KeyId,
    pub event_type: EventType,
    /// Keys held after this event was applied, in press order.
    pub pressed_keys: Vec<KeyId>,
}

impl KeyboardEvent {
    /// Returns `true` if `key` is held.
    ///
    /// A merged modifier (`Ctrl`, `Alt`, `Shift`, `Win`) counts as held when
    /// either of its side-specific keys is.
    pub fn is_held(&self, key: KeyId) -> bool {
        self.pressed_keys.iter().any(|&held| key.covers(held))
    }

    pub fn is_key_down(&self, key: KeyId) -> bool {
        self.event_type == EventType::KeyDown && key.covers(self.current_key)
    }
}

/// A translated mouse event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseEvent {
    pub current_key: MouseButtonId,
    pub event_type: EventType,
    /// Signed wheel delta (multiples of 120) for wheel events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wheel_delta: Option<i16>,
}

/// An input event, keyboard or mouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Keyboard(KeyboardEvent),
    Mouse(MouseEvent),
}

impl Event {
    pub fn event_type(&self) -> EventType {
        match self {
            Event::Keyboard(e) => e.event_type,
            Event::Mouse(e) => e.event_type,
        }
    }

    pub fn as_keyboard(&self) -> Option<&KeyboardEvent> {
        match self {
            Event::Keyboard(e) => Some(e),
            Event::Mouse(_) => None,
        }
    }

    pub fn as_mouse(&self) -> Option<&MouseEvent> {
        match self {
            Event::Mouse(e) => Some(e),
            Event::Keyboard(_) => None,
        }
    }
}

impl From<KeyboardEvent> for Event {
    fn from(event: KeyboardEvent) -> Self {
        Event::Keyboard(event)
    }
}

impl From<MouseEvent> for Event {
    fn from(event: MouseEvent) -> Self {
        Event::Mouse(event)
    }
}
