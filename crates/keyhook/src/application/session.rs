//! Hook session: install hooks, run the message loop, release everything.
//!
//! A [`HookSession`] owns one dispatcher and the hooks bound to it. Each
//! installed hook is represented by a [`HookHandle`]; handles are released
//! explicitly through [`HookSession::uninstall`], all at once when
//! [`HookSession::run`] returns (on every path), and again when the session
//! is dropped. Release is idempotent.
//!
//! The session is `!Send`. Low-level hook callbacks are delivered on the
//! installing thread, so the session must stay on the thread that runs the
//! loop. Use [`HookSession::quit_handle`] to stop it from elsewhere.

use std::rc::Rc;

use keyhook_core::{
    DispatchStats, Dispatcher, EventHandler, HandlerSlot, KeyId, SharedDispatcher,
};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::infrastructure::hook::{
    HookBackend, HookId, HookKind, InstallError, LoopRetrievalError, PumpOutcome, QuitHandle,
};

/// Identifies one installed hook within its session. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookHandle {
    kind: HookKind,
    serial: u64,
}

impl HookHandle {
    pub fn kind(&self) -> HookKind {
        self.kind
    }
}

/// How the message loop ended when it ended cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The quit signal was received.
    Quit,
}

/// Error type for session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Retrieval(#[from] LoopRetrievalError),

    /// `run` was called with no hook installed.
    #[error("no hook is installed; the message loop would never see input")]
    NothingInstalled,
}

#[derive(Debug)]
struct LiveHook {
    handle: HookHandle,
    id: HookId,
}

/// Owns a backend, a dispatcher and the hooks registered with them.
pub struct HookSession<B: HookBackend> {
    backend: B,
    dispatcher: SharedDispatcher,
    handler: HandlerSlot,
    live: Vec<LiveHook>,
    next_serial: u64,
}

impl<B: HookBackend> HookSession<B> {
    pub fn new(backend: B) -> Self {
        let dispatcher = Dispatcher::new();
        let handler = dispatcher.handler_slot();
        Self {
            backend,
            dispatcher: dispatcher.into_shared(),
            handler,
            live: Vec::new(),
            next_serial: 1,
        }
    }

    /// Installs `handler`, replacing the previous one. Takes effect with the
    /// next event.
    pub fn set_handler<H>(&self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handler.set(handler);
    }

    pub fn clear_handler(&self) {
        self.handler.clear();
    }

    /// Returns the dispatcher's handler slot, e.g. for a handler that wants to
    /// replace or clear itself.
    pub fn handler_slot(&self) -> HandlerSlot {
        self.handler.clone()
    }

    /// Installs a low-level hook of `kind`.
    ///
    /// # Errors
    ///
    /// [`InstallError::AlreadyInstalled`] if this session already holds a hook
    /// of `kind`, or [`InstallError::Rejected`] if the OS refused it.
    pub fn install(&mut self, kind: HookKind) -> Result<HookHandle, InstallError> {
        if self.live.iter().any(|hook| hook.handle.kind == kind) {
            return Err(InstallError::AlreadyInstalled { kind });
        }

        let id = self
            .backend
            .register(kind, Rc::clone(&self.dispatcher))
            .map_err(|e| {
                error!("failed to install {kind} hook: {e}");
                e
            })?;

        let handle = HookHandle {
            kind,
            serial: self.next_serial,
        };
        self.next_serial += 1;
        self.live.push(LiveHook { handle, id });
        info!(%kind, "hook installed");
        Ok(handle)
    }

    /// Installs the requested kinds, keyboard first. If any install fails the
    /// ones already installed by this call are released again.
    pub fn install_kinds(
        &mut self,
        keyboard: bool,
        mouse: bool,
    ) -> Result<Vec<HookHandle>, InstallError> {
        let mut installed = Vec::new();
        for (kind, wanted) in [(HookKind::Keyboard, keyboard), (HookKind::Mouse, mouse)] {
            if !wanted {
                continue;
            }
            match self.install(kind) {
                Ok(handle) => installed.push(handle),
                Err(e) => {
                    for handle in installed {
                        self.uninstall(handle);
                    }
                    return Err(e);
                }
            }
        }
        Ok(installed)
    }

    /// Releases `handle`. Returns `false` if it was already released.
    pub fn uninstall(&mut self, handle: HookHandle) -> bool {
        let Some(pos) = self.live.iter().position(|hook| hook.handle == handle) else {
            debug!(kind = %handle.kind, "hook already released");
            return false;
        };
        let hook = self.live.remove(pos);
        self.backend.unregister(hook.handle.kind, hook.id);

        // Without the keyboard hook no KeyUp can arrive to clear held keys.
        if hook.handle.kind == HookKind::Keyboard {
            if let Ok(mut dispatcher) = self.dispatcher.try_borrow_mut() {
                dispatcher.reset_pressed();
            }
        }

        info!(kind = %hook.handle.kind, "hook uninstalled");
        true
    }

    /// Releases every live hook. Returns how many were released.
    pub fn uninstall_all(&mut self) -> usize {
        let handles: Vec<HookHandle> = self.live.iter().map(|hook| hook.handle).collect();
        handles
            .into_iter()
            .filter(|&handle| self.uninstall(handle))
            .count()
    }

    pub fn is_installed(&self, handle: HookHandle) -> bool {
        self.live.iter().any(|hook| hook.handle == handle)
    }

    pub fn installed_kinds(&self) -> Vec<HookKind> {
        self.live.iter().map(|hook| hook.handle.kind).collect()
    }

    /// Runs the message loop until quit or a retrieval failure, then releases
    /// every hook.
    ///
    /// # Errors
    ///
    /// [`SessionError::NothingInstalled`] if no hook is installed, and
    /// [`SessionError::Retrieval`] if the message pump fails.
    pub fn run(&mut self) -> Result<LoopExit, SessionError> {
        if self.live.is_empty() {
            return Err(SessionError::NothingInstalled);
        }

        info!(hooks = ?self.installed_kinds(), "entering message loop");
        let result = loop {
            match self.backend.pump() {
                Ok(PumpOutcome::Dispatched) => {}
                Ok(PumpOutcome::Quit) => break Ok(LoopExit::Quit),
                Err(e) => {
                    error!("message loop stopped: {e}");
                    break Err(SessionError::Retrieval(e));
                }
            }
        };

        let released = self.uninstall_all();
        info!(released, stats = ?self.stats(), "message loop exited");
        result
    }

    /// Returns a handle that stops [`run`](Self::run) from any thread.
    pub fn quit_handle(&self) -> QuitHandle {
        self.backend.quit_handle()
    }

    /// Snapshot of the keys currently held.
    pub fn pressed_keys(&self) -> Vec<KeyId> {
        self.dispatcher
            .try_borrow()
            .map(|dispatcher| dispatcher.pressed_keys())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> DispatchStats {
        self.dispatcher
            .try_borrow()
            .map(|dispatcher| dispatcher.stats())
            .unwrap_or_default()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: HookBackend> Drop for HookSession<B> {
    fn drop(&mut self) {
        let released = self.uninstall_all();
        if released > 0 {
            debug!(released, "hooks released on session drop");
        }
    }
}
