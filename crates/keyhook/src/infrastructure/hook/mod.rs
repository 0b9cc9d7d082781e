//! OS hook backends.
//!
//! A [`HookBackend`] is the boundary to the operating system. It can:
//!
//! - register a low-level hook of a given [`HookKind`] bound to a dispatcher,
//! - unregister it again,
//! - block for the next thread message and dispatch it,
//! - hand out a [`QuitHandle`] that stops that blocking loop from any thread.
//!
//! On Windows, [`windows::WindowsHookBackend`] installs `WH_KEYBOARD_LL` and
//! `WH_MOUSE_LL`. The OS invokes their callbacks from inside `GetMessageW` on
//! the installing thread. Tests use [`mock::MockHookBackend`], which replays a
//! script of raw messages through the same delivery path.
//!
//! # The hook-chain rule
//!
//! Whatever happens while a raw event is processed, the backend forwards it to
//! the next hook afterwards (`CallNextHookEx` on Windows). [`deliver`] is the
//! single entry point backends use, and it turns every possible failure into
//! a return value, including a poisoned or busy dispatcher and a panic.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use keyhook_core::{DispatchOutcome, SharedDispatcher};
use thiserror::Error;
use tracing::{debug, error};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// The two kinds of low-level hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    Keyboard,
    Mouse,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HookKind::Keyboard => "keyboard",
            HookKind::Mouse => "mouse",
        })
    }
}

/// Backend-assigned identifier of one OS registration (the `HHOOK` value on
/// Windows). Only meaningful to the backend that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(pub usize);

/// A raw message as delivered by a low-level hook, before translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInputEvent {
    /// `WH_KEYBOARD_LL`: `KBDLLHOOKSTRUCT::vkCode` and the `wParam` message.
    Keyboard { vk_code: u32, message: u32 },
    /// `WH_MOUSE_LL`: the `wParam` message and `MSLLHOOKSTRUCT::mouseData`.
    Mouse { message: u32, mouse_data: u32 },
}

impl RawInputEvent {
    pub fn kind(&self) -> HookKind {
        match self {
            RawInputEvent::Keyboard { .. } => HookKind::Keyboard,
            RawInputEvent::Mouse { .. } => HookKind::Mouse,
        }
    }
}

/// A hook could not be installed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    #[error("a {kind} hook is already installed")]
    AlreadyInstalled { kind: HookKind },
    #[error("the OS rejected the {kind} hook: {reason}")]
    Rejected { kind: HookKind, reason: String },
}

impl InstallError {
    pub fn kind(&self) -> HookKind {
        match self {
            InstallError::AlreadyInstalled { kind } | InstallError::Rejected { kind, .. } => *kind,
        }
    }
}

/// The message pump itself failed. Terminal for the loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to retrieve the next thread message: {reason}")]
pub struct LoopRetrievalError {
    pub reason: String,
}

/// Result of one blocking pump step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpOutcome {
    /// A message was retrieved and dispatched; keep pumping.
    Dispatched,
    /// The quit signal arrived.
    Quit,
}

/// Thread-safe request to stop a running message loop.
#[derive(Clone)]
pub struct QuitHandle(Arc<dyn Fn() + Send + Sync>);

impl QuitHandle {
    pub fn new<F>(request: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self(Arc::new(request))
    }

    /// Asks the loop to stop. Safe to call more than once and from any thread.
    pub fn request(&self) {
        (self.0)()
    }
}

impl fmt::Debug for QuitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuitHandle").finish_non_exhaustive()
    }
}

/// OS boundary for low-level hooks and the thread message pump.
///
/// Every method must be called on the thread that created the backend; the
/// OS invokes hook callbacks on that thread only.
pub trait HookBackend {
    /// Registers a low-level hook of `kind` that delivers to `dispatcher`.
    fn register(
        &mut self,
        kind: HookKind,
        dispatcher: SharedDispatcher,
    ) -> Result<HookId, InstallError>;

    /// Unregisters a hook previously returned by [`register`](Self::register).
    fn unregister(&mut self, kind: HookKind, id: HookId);

    /// Blocks until the next message arrives and dispatches it.
    fn pump(&mut self) -> Result<PumpOutcome, LoopRetrievalError>;

    /// Returns a handle that makes [`pump`](Self::pump) report `Quit`.
    fn quit_handle(&self) -> QuitHandle;
}

/// Runs one raw event through the dispatcher without letting anything escape.
///
/// Returns `None` when the event could not be processed at all. The caller
/// forwards the event down the hook chain either way.
pub fn deliver(dispatcher: &SharedDispatcher, event: RawInputEvent) -> Option<DispatchOutcome> {
    let Ok(mut dispatcher) = dispatcher.try_borrow_mut() else {
        debug!(?event, "dispatcher busy; forwarding event unprocessed");
        return None;
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| match event {
        RawInputEvent::Keyboard { vk_code, message } => dispatcher.on_keyboard(vk_code, message),
        RawInputEvent::Mouse {
            message,
            mouse_data,
        } => dispatcher.on_mouse(message, mouse_data),
    }));

    match result {
        Ok(outcome) => Some(outcome),
        Err(_) => {
            error!(?event, "dispatcher panicked; forwarding event unprocessed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use keyhook_core::{Dispatcher, Event, KeyId};

    use super::*;

    #[test]
    fn test_deliver_routes_keyboard_and_mouse() {
        let dispatcher = Dispatcher::new().into_shared();

        let key = deliver(
            &dispatcher,
            RawInputEvent::Keyboard {
                vk_code: 65,
                message: 0x100,
            },
        );
        let mouse = deliver(
            &dispatcher,
            RawInputEvent::Mouse {
                message: 0x200,
                mouse_data: 0,
            },
        );

        assert!(matches!(
            key,
            Some(DispatchOutcome::Unhandled(Event::Keyboard(ref e))) if e.current_key == KeyId::A
        ));
        assert_eq!(mouse, Some(DispatchOutcome::Ignored));
    }

    #[test]
    fn test_deliver_skips_busy_dispatcher() {
        let dispatcher = Dispatcher::new().into_shared();
        let _held = dispatcher.borrow_mut();

        let outcome = deliver(
            &dispatcher,
            RawInputEvent::Keyboard {
                vk_code: 65,
                message: 0x100,
            },
        );

        assert!(outcome.is_none());
    }

    #[test]
    fn test_quit_handle_invokes_request_each_time() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let handle = QuitHandle::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        handle.request();
        handle.clone().request();

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_install_error_reports_kind() {
        let err = InstallError::Rejected {
            kind: HookKind::Mouse,
            reason: "access denied".to_string(),
        };
        assert_eq!(err.kind(), HookKind::Mouse);
        assert_eq!(err.to_string(), "the OS rejected the mouse hook: access denied");
    }
}
