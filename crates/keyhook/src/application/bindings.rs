//! Key bindings: print a message when a trigger fires.
//!
//! A [`Binding`] pairs a [`Trigger`] (a key or a mouse button) with a list of
//! keys that must be held at the same time. [`BindingHandler`] is the
//! [`EventHandler`] the `keyhook` binary installs. On every KeyDown (or wheel
//! step) it writes the message of each matching binding as one line.
//!
//! Mouse events carry no pressed-key snapshot, so the handler remembers the
//! snapshot of the most recent keyboard event and checks `held` against that.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use keyhook_core::{Event, EventHandler, EventType, HandlerResult, KeyId, MouseButtonId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What fires a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Trigger {
    Key(KeyId),
    Mouse(MouseButtonId),
}

/// Error returned when a string names neither a key nor a mouse button.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is neither a key nor a mouse button name")]
pub struct ParseTriggerError(pub String);

impl Trigger {
    /// Returns `true` if `event` is a press of this trigger.
    ///
    /// Wheel rotation has no up/down, so a wheel trigger fires on every step.
    pub fn fires_on(&self, event: &Event) -> bool {
        match (self, event) {
            (Trigger::Key(key), Event::Keyboard(e)) => e.is_key_down(*key),
            (Trigger::Mouse(button), Event::Mouse(e)) => {
                e.current_key == *button
                    && match e.event_type {
                        EventType::KeyDown => true,
                        EventType::None => button.is_wheel(),
                        EventType::KeyUp => false,
                    }
            }
            _ => false,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Key(key) => key.fmt(f),
            Trigger::Mouse(button) => button.fmt(f),
        }
    }
}

impl FromStr for Trigger {
    type Err = ParseTriggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(key) = s.parse::<KeyId>() {
            return Ok(Trigger::Key(key));
        }
        s.parse::<MouseButtonId>()
            .map(Trigger::Mouse)
            .map_err(|_| ParseTriggerError(s.to_string()))
    }
}

impl TryFrom<String> for Trigger {
    type Error = ParseTriggerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Trigger> for String {
    fn from(trigger: Trigger) -> Self {
        trigger.to_string()
    }
}

/// One configured binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub trigger: Trigger,
    /// Keys that must be held when the trigger fires. Merged modifiers
    /// (`Ctrl`, `Alt`, `Shift`, `Win`) accept either side.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub held: Vec<KeyId>,
    pub message: String,
}

impl Binding {
    pub fn new(trigger: Trigger, held: Vec<KeyId>, message: impl Into<String>) -> Self {
        Self {
            trigger,
            held,
            message: message.into(),
        }
    }

    /// Returns `true` if `event` fires this binding while `pressed` is held.
    pub fn matches(&self, event: &Event, pressed: &[KeyId]) -> bool {
        self.trigger.fires_on(event)
            && self
                .held
                .iter()
                .all(|&want| pressed.iter().any(|&key| want.covers(key)))
    }
}

/// Writes the message of every binding that fires, one per line.
pub struct BindingHandler<W> {
    bindings: Vec<Binding>,
    pressed: Vec<KeyId>,
    out: W,
    fired: u64,
}

impl<W: Write> BindingHandler<W> {
    pub fn new(bindings: Vec<Binding>, out: W) -> Self {
        Self {
            bindings,
            pressed: Vec::new(),
            out,
            fired: 0,
        }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Total number of messages written so far.
    pub fn fired(&self) -> u64 {
        self.fired
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Records the held keys carried by `event` and returns the messages of
    /// the bindings it fires, in configuration order.
    pub fn matching_messages(&mut self, event: &Event) -> Vec<String> {
        if let Event::Keyboard(e) = event {
            self.pressed.clone_from(&e.pressed_keys);
        }
        self.bindings
            .iter()
            .filter(|binding| binding.matches(event, &self.pressed))
            .map(|binding| binding.message.clone())
            .collect()
    }
}

impl<W: Write> EventHandler for BindingHandler<W> {
    fn handle(&mut self, event: &Event) -> HandlerResult {
        let messages = self.matching_messages(event);
        if messages.is_empty() {
            return Ok(());
        }
        for message in &messages {
            writeln!(self.out, "{message}")?;
            self.fired += 1;
        }
        self.out.flush()?;
        Ok(())
    }
}
