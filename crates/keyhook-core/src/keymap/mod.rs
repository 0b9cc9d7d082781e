//! Raw code translation tables.
//!
//! Three fixed mappings turn OS-native integers into semantic identifiers:
//!
//! | Table            | Input                         | Output                         |
//! |------------------|-------------------------------|--------------------------------|
//! | `windows_vk`     | Virtual Key code              | [`KeyId`]                      |
//! | `mouse`          | low-level mouse message       | ([`MouseButtonId`], [`EventType`]) |
//! | `message`        | keyboard window message       | [`EventType`]                  |
//!
//! Each lookup is pure: the same code always yields the same answer. A code
//! absent from its table yields [`UnknownCodeError`] and is never coerced to
//! a fallback.

use std::fmt;

use thiserror::Error;

use crate::domain::event::EventType;

pub mod key;
pub mod message;
pub mod mouse;
pub mod windows_vk;

pub use key::{KeyId, ParseKeyIdError};
pub use mouse::{MouseButtonId, ParseMouseButtonError};

/// Identifies which translation table rejected a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeTable {
    VirtualKey,
    MouseMessage,
    WindowMessage,
}

impl fmt::Display for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CodeTable::VirtualKey => "virtual-key",
            CodeTable::MouseMessage => "mouse message",
            CodeTable::WindowMessage => "window message",
        })
    }
}

/// A raw code that has no entry in its translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown {table} code {code} (0x{code:X})")]
pub struct UnknownCodeError {
    pub table: CodeTable,
    pub code: u32,
}

impl UnknownCodeError {
    pub const fn new(table: CodeTable, code: u32) -> Self {
        Self { table, code }
    }
}

/// Translates a raw Virtual Key code to a [`KeyId`].
pub fn translate_key(code: u32) -> Result<KeyId, UnknownCodeError> {
    windows_vk::vk_to_key(code)
}

/// Translates a raw low-level mouse message to a button and event type.
///
/// Wheel messages yield [`EventType::None`].
pub fn translate_mouse(code: u32) -> Result<(MouseButtonId, EventType), UnknownCodeError> {
    mouse::message_to_button(code)
}

/// Classifies a raw keyboard window message.
pub fn translate_message(code: u32) -> Result<EventType, UnknownCodeError> {
    message::message_to_event_type(code)
}
