//! Best-effort release of hooks on Ctrl+C or console close.
//!
//! The primary release path is [`HookSession`](crate::application::session::HookSession)
//! itself: it uninstalls every hook when its loop returns and again on drop.
//! This module adds a fallback. A process-wide `ctrlc` handler asks every
//! registered loop to quit, so those same release paths run on the loop
//! threads instead of the process dying with hooks still installed.
//!
//! The OS may still kill the process without running any of this.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

use tracing::{info, warn};

use super::hook::QuitHandle;

static EXIT_HOOKS: Mutex<Vec<(u64, QuitHandle)>> = Mutex::new(Vec::new());
static NEXT_ID: AtomicU64 = AtomicU64::new(1);
static SIGNAL_HANDLER: OnceLock<bool> = OnceLock::new();

/// Keeps a quit handle registered until dropped.
#[derive(Debug)]
#[must_use = "the exit hook is removed as soon as the registration is dropped"]
pub struct ExitHookRegistration {
    id: u64,
}

impl Drop for ExitHookRegistration {
    fn drop(&mut self) {
        let mut hooks = EXIT_HOOKS.lock().unwrap_or_else(PoisonError::into_inner);
        hooks.retain(|(id, _)| *id != self.id);
    }
}

/// Registers `quit` to be requested when the process receives Ctrl+C or its
/// console is closed.
///
/// The `ctrlc` handler is installed on first use. If that fails, a warning is
/// logged and the registration still works through [`fire_exit_hooks`].
pub fn register_exit_hook(quit: QuitHandle) -> ExitHookRegistration {
    install_signal_handler();

    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    EXIT_HOOKS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push((id, quit));
    ExitHookRegistration { id }
}

/// Requests quit on every registered loop. Returns how many were asked.
pub fn fire_exit_hooks() -> usize {
    // Clone out so quit requests never run under the registry lock.
    let hooks: Vec<QuitHandle> = EXIT_HOOKS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .map(|(_, quit)| quit.clone())
        .collect();

    for quit in &hooks {
        quit.request();
    }
    hooks.len()
}

/// Returns `true` if the process-wide signal handler is active.
pub fn signal_handler_installed() -> bool {
    install_signal_handler()
}

fn install_signal_handler() -> bool {
    *SIGNAL_HANDLER.get_or_init(|| {
        match ctrlc::set_handler(|| {
            let asked = fire_exit_hooks();
            info!(loops = asked, "exit signal received; stopping hook loops");
        }) {
            Ok(()) => true,
            Err(e) => {
                warn!("failed to set Ctrl+C handler, hooks are only released on normal exit: {e}");
                false
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    use super::*;

    fn counting_handle() -> (QuitHandle, Arc<AtomicU32>) {
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let handle = QuitHandle::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (handle, count)
    }

    #[test]
    fn test_fire_requests_quit_on_registered_handle() {
        // Arrange
        let (handle, count) = counting_handle();
        let _registration = register_exit_hook(handle);

        // Act
        let asked = fire_exit_hooks();

        // Assert
        assert!(asked >= 1);
        assert!(count.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn test_dropped_registration_is_not_fired() {
        // Arrange
        let (handle, count) = counting_handle();
        let registration = register_exit_hook(handle);
        drop(registration);
        let before = count.load(Ordering::SeqCst);

        // Act
        fire_exit_hooks();

        // Assert
        assert_eq!(count.load(Ordering::SeqCst), before);
    }

    #[test]
    fn test_signal_handler_install_is_stable() {
        let first = signal_handler_installed();
        let second = signal_handler_installed();
        assert_eq!(first, second);
    }
}
