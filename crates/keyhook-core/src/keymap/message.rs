//! Keyboard window-message classification.
//!
//! `WH_KEYBOARD_LL` passes one of four messages as `wParam`. The `WM_SYS*`
//! variants are sent instead of the plain ones while Alt is involved (Alt
//! itself, Alt+key, F10), and classify the same way.

use super::{CodeTable, UnknownCodeError};
use crate::domain::event::EventType;

pub const WM_KEYDOWN: u32 = 0x0100;
pub const WM_KEYUP: u32 = 0x0101;
pub const WM_SYSKEYDOWN: u32 = 0x0104;
pub const WM_SYSKEYUP: u32 = 0x0105;

/// Classifies a keyboard hook message as [`EventType::KeyDown`] or
/// [`EventType::KeyUp`].
///
/// # Errors
///
/// Returns [`UnknownCodeError`] for any other message.
pub fn message_to_event_type(message: u32) -> Result<EventType, UnknownCodeError> {
    match message {
        WM_KEYDOWN | WM_SYSKEYDOWN => Ok(EventType::KeyDown),
        WM_KEYUP | WM_SYSKEYUP => Ok(EventType::KeyUp),
        _ => Err(UnknownCodeError::new(CodeTable::WindowMessage, message)),
    }
}
