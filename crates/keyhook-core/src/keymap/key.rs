//! Semantic keyboard identifiers.
//!
//! [`KeyId`] is the closed set of keys that keyhook can report. Each variant's
//! discriminant is the raw code that produces it: Windows Virtual Key codes
//! (0x08–0xDE) for real keys, and codes from 1000 upwards for the synthetic
//! mouse hotkeys and the merged modifiers (`Ctrl`, `Alt`, `Shift`, `Win`).
//!
//! Every identifier has a canonical display name (`"Lcontrol"`, `"A"`,
//! `"Oem_Plus"`, `"mouse left"`, …). The name is what [`Display`] prints, what
//! [`FromStr`] accepts, and what serde reads and writes, so config files can
//! say `held = ["Lcontrol"]`.
//!
//! [`Display`]: std::fmt::Display
//! [`FromStr`]: std::str::FromStr

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A semantic key identifier.
///
/// The numeric value of each variant is the raw code it is translated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[repr(u16)]
pub enum KeyId {
    // Control and navigation
    Back = 8,
    Tab = 9,
    Return = 13,
    Capital = 20,
    Escape = 27,
    Space = 32,
    Prior = 33,
    Next = 34,
    End = 35,
    Home = 36,
    Left = 37,
    Up = 38,
    Right = 39,
    Down = 40,
    Snapshot = 44,
    Delete = 46,

    // Digit row
    Digit0 = 48,
    Digit1 = 49,
    Digit2 = 50,
    Digit3 = 51,
    Digit4 = 52,
    Digit5 = 53,
    Digit6 = 54,
    Digit7 = 55,
    Digit8 = 56,
    Digit9 = 57,

    // Letters
    A = 65,
    B = 66,
    C = 67,
    D = 68,
    E = 69,
    F = 70,
    G = 71,
    H = 72,
    I = 73,
    J = 74,
    K = 75,
    L = 76,
    M = 77,
    N = 78,
    O = 79,
    P = 80,
    Q = 81,
    R = 82,
    S = 83,
    T = 84,
    U = 85,
    V = 86,
    W = 87,
    X = 88,
    Y = 89,
    Z = 90,

    Lwin = 91,
    Rwin = 92,
    App = 93,
    Sleep = 95,

    // Numpad
    Numpad0 = 96,
    Numpad1 = 97,
    Numpad2 = 98,
    Numpad3 = 99,
    Numpad4 = 100,
    Numpad5 = 101,
    Numpad6 = 102,
    Numpad7 = 103,
    Numpad8 = 104,
    Numpad9 = 105,
    Multiply = 106,
    Add = 107,
    Subtract = 109,
    Decimal = 110,
    Divide = 111,

    // Function keys
    F1 = 112,
    F2 = 113,
    F3 = 114,
    F4 = 115,
    F5 = 116,
    F6 = 117,
    F7 = 118,
    F8 = 119,
    F9 = 120,
    F10 = 121,
    F11 = 122,
    F12 = 123,

    Numlock = 144,

    // Side-specific modifiers
    Lshift = 160,
    Rshift = 161,
    Lcontrol = 162,
    Rcontrol = 163,
    Lmenu = 164,
    Rmenu = 165,

    // OEM punctuation
    Oem1 = 186,
    OemPlus = 187,
    OemComma = 188,
    OemMinus = 189,
    OemPeriod = 190,
    Oem2 = 191,
    Oem3 = 192,
    Oem4 = 219,
    Oem5 = 220,
    Oem6 = 221,
    Oem7 = 222,

    // Synthetic mouse hotkeys
    MouseMove = 1000,
    MouseLeft = 1001,
    MouseRight = 1002,
    MouseMiddle = 1003,
    MouseWheelUp = 1004,
    MouseWheelDown = 1005,

    // Merged modifiers (either side)
    Ctrl = 1010,
    Alt = 1011,
    Shift = 1012,
    Win = 1013,
}

/// Error returned when a string is not the display name of any [`KeyId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key name '{0}'")]
pub struct ParseKeyIdError(pub String);

impl KeyId {
    /// Every key identifier, ordered by raw code.
    pub const ALL: [KeyId; 111] = {
        use KeyId::*;
        [
            Back, Tab, Return, Capital, Escape, Space, Prior, Next, End, Home, Left, Up, Right,
            Down, Snapshot, Delete, Digit0, Digit1, Digit2, Digit3, Digit4, Digit5, Digit6,
            Digit7, Digit8, Digit9, A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T,
            U, V, W, X, Y, Z, Lwin, Rwin, App, Sleep, Numpad0, Numpad1, Numpad2, Numpad3,
            Numpad4, Numpad5, Numpad6, Numpad7, Numpad8, Numpad9, Multiply, Add, Subtract,
            Decimal, Divide, F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12, Numlock, Lshift,
            Rshift, Lcontrol, Rcontrol, Lmenu, Rmenu, Oem1, OemPlus, OemComma, OemMinus,
            OemPeriod, Oem2, Oem3, Oem4, Oem5, Oem6, Oem7, MouseMove, MouseLeft, MouseRight,
            MouseMiddle, MouseWheelUp, MouseWheelDown, Ctrl, Alt, Shift, Win,
        ]
    };

    /// Returns the raw code this identifier is translated from.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Returns the merged modifier for a side-specific modifier key.
    ///
    /// `Lcontrol`/`Rcontrol` become `Ctrl`, `Lmenu`/`Rmenu` become `Alt`,
    /// `Lshift`/`Rshift` become `Shift` and `Lwin`/`Rwin` become `Win`.
    /// Every other key (including the merged ones) returns `None`.
    pub const fn merged(self) -> Option<KeyId> {
        match self {
            KeyId::Lcontrol | KeyId::Rcontrol => Some(KeyId::Ctrl),
            KeyId::Lmenu | KeyId::Rmenu => Some(KeyId::Alt),
            KeyId::Lshift | KeyId::Rshift => Some(KeyId::Shift),
            KeyId::Lwin | KeyId::Rwin => Some(KeyId::Win),
            _ => None,
        }
    }

    /// Returns `true` for `Ctrl`, `Alt`, `Shift` and `Win`.
    pub const fn is_merged(self) -> bool {
        matches!(self, KeyId::Ctrl | KeyId::Alt | KeyId::Shift | KeyId::Win)
    }

    /// Returns `true` if `self` names `other`, either exactly or as the merged
    /// form of a side-specific modifier.
    pub fn covers(self, other: KeyId) -> bool {
        self == other || other.merged() == Some(self)
    }

    /// Canonical display name.
    pub const fn name(self) -> &'static str {
        match self {
            KeyId::Back => "Back",
            KeyId::Tab => "Tab",
            KeyId::Return => "Return",
            KeyId::Capital => "Capital",
            KeyId::Escape => "Escape",
            KeyId::Space => "Space",
            KeyId::Prior => "Prior",
            KeyId::Next => "Next",
            KeyId::End => "End",
            KeyId::Home => "Home",
            KeyId::Left => "Left",
            KeyId::Up => "Up",
            KeyId::Right => "Right",
            KeyId::Down => "Down",
            KeyId::Snapshot => "Snapshot",
            KeyId::Delete => "Delete",
            KeyId::Digit0 => "0",
            KeyId::Digit1 => "1",
            KeyId::Digit2 => "2",
            KeyId::Digit3 => "3",
            KeyId::Digit4 => "4",
            KeyId::Digit5 => "5",
            KeyId::Digit6 => "6",
            KeyId::Digit7 => "7",
            KeyId::Digit8 => "8",
            KeyId::Digit9 => "9",
            KeyId::A => "A",
            KeyId::B => "B",
            KeyId::C => "C",
            KeyId::D => "D",
            KeyId::E => "E",
            KeyId::F => "F",
            KeyId::G => "G",
            KeyId::H => "H",
            KeyId::I => "I",
            KeyId::J => "J",
            KeyId::K => "K",
            KeyId::L => "L",
            KeyId::M => "M",
            KeyId::N => "N",
            KeyId::O => "O",
            KeyId::P => "P",
            KeyId::Q => "Q",
            KeyId::R => "R",
            KeyId::S => "S",
            KeyId::T => "T",
            KeyId::U => "U",
            KeyId::V => "V",
            KeyId::W => "W",
            KeyId::X => "X",
            KeyId::Y => "Y",
            KeyId::Z => "Z",
            KeyId::Lwin => "Lwin",
            KeyId::Rwin => "Rwin",
            KeyId::App => "App",
            KeyId::Sleep => "Sleep",
            KeyId::Numpad0 => "Numpad0",
            KeyId::Numpad1 => "Numpad1",
            KeyId::Numpad2 => "Numpad2",
            KeyId::Numpad3 => "Numpad3",
            KeyId::Numpad4 => "Numpad4",
            KeyId::Numpad5 => "Numpad5",
            KeyId::Numpad6 => "Numpad6",
            KeyId::Numpad7 => "Numpad7",
            KeyId::Numpad8 => "Numpad8",
            KeyId::Numpad9 => "Numpad9",
            KeyId::Multiply => "Multiply",
            KeyId::Add => "Add",
            KeyId::Subtract => "Subtract",
            KeyId::Decimal => "Decimal",
            KeyId::Divide => "Divide",
            KeyId::F1 => "F1",
            KeyId::F2 => "F2",
            KeyId::F3 => "F3",
            KeyId::F4 => "F4",
            KeyId::F5 => "F5",
            KeyId::F6 => "F6",
            KeyId::F7 => "F7",
            KeyId::F8 => "F8",
            KeyId::F9 => "F9",
            KeyId::F10 => "F10",
            KeyId::F11 => "F11",
            KeyId::F12 => "F12",
            KeyId::Numlock => "Numlock",
            KeyId::Lshift => "Lshift",
            KeyId::Rshift => "Rshift",
            KeyId::Lcontrol => "Lcontrol",
            KeyId::Rcontrol => "Rcontrol",
            KeyId::Lmenu => "Lmenu",
            KeyId::Rmenu => "Rmenu",
            KeyId::Oem1 => "Oem_1",
            KeyId::OemPlus => "Oem_Plus",
            KeyId::OemComma => "Oem_Comma",
            KeyId::OemMinus => "Oem_Minus",
            KeyId::OemPeriod => "Oem_Period",
            KeyId::Oem2 => "Oem_2",
            KeyId::Oem3 => "Oem_3",
            KeyId::Oem4 => "Oem_4",
            KeyId::Oem5 => "Oem_5",
            KeyId::Oem6 => "Oem_6",
            KeyId::Oem7 => "Oem_7",
            KeyId::MouseMove => "mouse move",
            KeyId::MouseLeft => "mouse left",
            KeyId::MouseRight => "mouse right",
            KeyId::MouseMiddle => "mouse middle",
            KeyId::MouseWheelUp => "mouse wheel up",
            KeyId::MouseWheelDown => "mouse wheel down",
            KeyId::Ctrl => "Ctrl",
            KeyId::Alt => "Alt",
            KeyId::Shift => "Shift",
            KeyId::Win => "Win",
        }
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyId {
    type Err = ParseKeyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyId::ALL
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ParseKeyIdError(s.to_string()))
    }
}

impl TryFrom<String> for KeyId {
    type Error = ParseKeyIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyId> for String {
    fn from(key: KeyId) -> Self {
        key.name().to_string()
    }
}
