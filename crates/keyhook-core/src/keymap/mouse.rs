//! Low-level mouse message translation.
//!
//! `WH_MOUSE_LL` passes the window message (`WM_LBUTTONDOWN`, `WM_MOUSEWHEEL`,
//! …) as the hook's `wParam`. This table maps each button/wheel message to a
//! [`MouseButtonId`] and an [`EventType`]. Wheels carry no up/down, so they
//! translate to [`EventType::None`].
//!
//! `WM_MOUSEMOVE` is deliberately absent: a move has no button. The dispatcher
//! checks [`WM_MOUSEMOVE`] before translating and skips the event.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CodeTable, UnknownCodeError};
use crate::domain::event::EventType;

pub const WM_MOUSEMOVE: u32 = 0x0200;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_RBUTTONDOWN: u32 = 0x0204;
pub const WM_RBUTTONUP: u32 = 0x0205;
pub const WM_MBUTTONDOWN: u32 = 0x0207;
pub const WM_MBUTTONUP: u32 = 0x0208;
pub const WM_MOUSEWHEEL: u32 = 0x020A;
pub const WM_XBUTTONDOWN: u32 = 0x020B;
pub const WM_XBUTTONUP: u32 = 0x020C;
pub const WM_MOUSEHWHEEL: u32 = 0x020E;

/// A semantic mouse button (or wheel) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MouseButtonId {
    LButton,
    RButton,
    /// The middle button (pressing the wheel).
    WheelButton,
    /// Vertical wheel rotation.
    Wheel,
    /// Either side button; the hook message does not say which.
    XButton,
    /// Horizontal wheel rotation.
    HWheel,
}

/// Error returned when a string is not the name of any [`MouseButtonId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mouse button name '{0}'")]
pub struct ParseMouseButtonError(pub String);

impl MouseButtonId {
    pub const ALL: [MouseButtonId; 6] = [
        MouseButtonId::LButton,
        MouseButtonId::RButton,
        MouseButtonId::WheelButton,
        MouseButtonId::Wheel,
        MouseButtonId::XButton,
        MouseButtonId::HWheel,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            MouseButtonId::LButton => "LButton",
            MouseButtonId::RButton => "RButton",
            MouseButtonId::WheelButton => "WheelButton",
            MouseButtonId::Wheel => "Wheel",
            MouseButtonId::XButton => "XButton",
            MouseButtonId::HWheel => "HWheel",
        }
    }

    /// Returns `true` for the wheel axes, whose events carry a delta.
    pub const fn is_wheel(self) -> bool {
        matches!(self, MouseButtonId::Wheel | MouseButtonId::HWheel)
    }
}

impl fmt::Display for MouseButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MouseButtonId {
    type Err = ParseMouseButtonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MouseButtonId::ALL
            .iter()
            .copied()
            .find(|button| button.name() == s)
            .ok_or_else(|| ParseMouseButtonError(s.to_string()))
    }
}

impl TryFrom<String> for MouseButtonId {
    type Error = ParseMouseButtonError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MouseButtonId> for String {
    fn from(button: MouseButtonId) -> Self {
        button.name().to_string()
    }
}

/// Translates a low-level mouse message to a button and event type.
///
/// # Errors
///
/// Returns [`UnknownCodeError`] for `WM_MOUSEMOVE` and any message not in the
/// table.
pub fn message_to_button(message: u32) -> Result<(MouseButtonId, EventType), UnknownCodeError> {
    use EventType::{KeyDown, KeyUp};
    use MouseButtonId::*;

    let entry = match message {
        WM_LBUTTONDOWN => (LButton, KeyDown),
        WM_LBUTTONUP => (LButton, KeyUp),
        WM_RBUTTONDOWN => (RButton, KeyDown),
        WM_RBUTTONUP => (RButton, KeyUp),
        WM_MBUTTONDOWN => (WheelButton, KeyDown),
        WM_MBUTTONUP => (WheelButton, KeyUp),
        WM_MOUSEWHEEL => (Wheel, EventType::None),
        WM_XBUTTONDOWN => (XButton, KeyDown),
        WM_XBUTTONUP => (XButton, KeyUp),
        WM_MOUSEHWHEEL => (HWheel, EventType::None),
        _ => return Err(UnknownCodeError::new(CodeTable::MouseMessage, message)),
    };
    Ok(entry)
}
