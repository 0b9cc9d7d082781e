//! Windows Virtual Key (VK) code to [`KeyId`] translation table.
//!
//! `WH_KEYBOARD_LL` reports every key event with a VK code in
//! `KBDLLHOOKSTRUCT::vkCode`. Real keys use codes 0x00–0xFF, so those are
//! resolved through `VK_TABLE`, a compile-time array of 256 entries indexed by
//! VK code. Lookup is an O(1) index on the hook hot path.
//!
//! The synthetic mouse hotkeys and merged modifiers (codes 1000–1013) never
//! come from the OS. They are accepted here so that every [`KeyId`] can be
//! looked up by its own code.
//!
//! Reference: https://learn.microsoft.com/windows/win32/inputdev/virtual-key-codes

use super::key::KeyId;
use super::{CodeTable, UnknownCodeError};

/// Translates a raw Virtual Key code to a [`KeyId`].
///
/// # Errors
///
/// Returns [`UnknownCodeError`] when `vk` has no mapping. Unmapped codes are
/// never coerced to a fallback key.
pub fn vk_to_key(vk: u32) -> Result<KeyId, UnknownCodeError> {
    let found = match usize::try_from(vk) {
        Ok(index) if index < VK_TABLE.len() => VK_TABLE[index],
        _ => synthetic_key(vk),
    };
    found.ok_or(UnknownCodeError::new(CodeTable::VirtualKey, vk))
}

/// Looks up the codes above the VK range (mouse hotkeys and merged modifiers).
fn synthetic_key(code: u32) -> Option<KeyId> {
    KeyId::ALL
        .iter()
        .rev()
        .take_while(|key| key.code() >= 256)
        .copied()
        .find(|key| key.code() == code)
}

/// VK → [`KeyId`] table indexed by VK code (0x00–0xFF).
///
/// Built from [`KeyId::ALL`], whose discriminants are the VK codes, so the
/// table and the enum cannot disagree.
const VK_TABLE: [Option<KeyId>; 256] = {
    let mut t: [Option<KeyId>; 256] = [None; 256];
    let mut i = 0;
    while i < KeyId::ALL.len() {
        let key = KeyId::ALL[i];
        let code = key as usize;
        if code < 256 {
            t[code] = Some(key);
        }
        i += 1;
    }
    t
};
