//! The set of currently held keys.

use crate::keymap::KeyId;

/// Keys currently held down, in the order they were pressed.
///
/// Insertion and removal are idempotent: a repeated key-down (auto-repeat)
/// leaves the set unchanged, and a key-up for a key that was never seen
/// (e.g. pressed before the hook was installed) is ignored. No key ever
/// appears twice.
///
/// The set holds at most a few dozen keys, so a `Vec` with linear search is
/// both ordered and fast enough.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressedKeySet {
    keys: Vec<KeyId>,
}

impl PressedKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `key` unless it is already held. Returns `true` if it was added.
    pub fn add(&mut self, key: KeyId) -> bool {
        if self.contains(key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    /// Removes `key` if it is held. Returns `true` if it was removed.
    pub fn remove(&mut self, key: KeyId) -> bool {
        match self.keys.iter().position(|&held| held == key) {
            Some(index) => {
                self.keys.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, key: KeyId) -> bool {
        self.keys.contains(&key)
    }

    /// Copies the held keys in press order.
    pub fn snapshot(&self) -> Vec<KeyId> {
        self.keys.clone()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}
