//! Windows low-level keyboard and mouse hooks.
//!
//! Installs `WH_KEYBOARD_LL` and `WH_MOUSE_LL` on the calling thread and pumps
//! that thread's message queue with `GetMessageW`. The OS calls the hook
//! procedures from inside `GetMessageW`, on this same thread, so the
//! dispatcher each hook delivers to is kept in a thread-local slot rather
//! than behind a lock.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::cell::RefCell;
use std::ffi::c_void;
use std::marker::PhantomData;
use std::thread::LocalKey;

use keyhook_core::SharedDispatcher;
use tracing::{debug, warn};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
    TranslateMessage, UnhookWindowsHookEx, HC_ACTION, HHOOK, HOOKPROC, KBDLLHOOKSTRUCT, MSG,
    MSLLHOOKSTRUCT, WH_KEYBOARD_LL, WH_MOUSE_LL, WINDOWS_HOOK_ID, WM_QUIT,
};

use super::{
    deliver, HookBackend, HookId, HookKind, InstallError, LoopRetrievalError, PumpOutcome,
    QuitHandle, RawInputEvent,
};

type TargetSlot = RefCell<Option<SharedDispatcher>>;

thread_local! {
    static KEYBOARD_TARGET: TargetSlot = const { RefCell::new(None) };
    static MOUSE_TARGET: TargetSlot = const { RefCell::new(None) };
}

/// Hook backend bound to the thread that created it.
pub struct WindowsHookBackend {
    thread_id: u32,
    // Hook callbacks only ever run on the creating thread.
    _not_send: PhantomData<*const ()>,
}

impl WindowsHookBackend {
    pub fn new() -> Self {
        // SAFETY: GetCurrentThreadId has no preconditions.
        let thread_id = unsafe { GetCurrentThreadId() };
        Self {
            thread_id,
            _not_send: PhantomData,
        }
    }

    pub fn thread_id(&self) -> u32 {
        self.thread_id
    }
}

impl Default for WindowsHookBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn target_of(kind: HookKind) -> &'static LocalKey<TargetSlot> {
    match kind {
        HookKind::Keyboard => &KEYBOARD_TARGET,
        HookKind::Mouse => &MOUSE_TARGET,
    }
}

fn hook_params(kind: HookKind) -> (WINDOWS_HOOK_ID, HOOKPROC) {
    match kind {
        HookKind::Keyboard => (WH_KEYBOARD_LL, Some(keyboard_hook_proc)),
        HookKind::Mouse => (WH_MOUSE_LL, Some(mouse_hook_proc)),
    }
}

impl HookBackend for WindowsHookBackend {
    fn register(
        &mut self,
        kind: HookKind,
        dispatcher: SharedDispatcher,
    ) -> Result<HookId, InstallError> {
        let target = target_of(kind);
        if target.with(|slot| slot.borrow().is_some()) {
            return Err(InstallError::AlreadyInstalled { kind });
        }

        // SAFETY: a null module name returns the handle of the running executable.
        let module = unsafe { GetModuleHandleW(PCWSTR::null()) }.map_err(|e| {
            InstallError::Rejected {
                kind,
                reason: e.to_string(),
            }
        })?;

        // The target must be visible before the first callback can fire.
        target.with(|slot| *slot.borrow_mut() = Some(dispatcher));

        let (id_hook, proc) = hook_params(kind);
        // SAFETY: the hook procedure is a valid `extern "system"` fn for the
        // lifetime of the process, and this thread pumps messages in `pump`.
        match unsafe { SetWindowsHookExW(id_hook, proc, Some(HINSTANCE(module.0)), 0) } {
            Ok(hook) => {
                debug!(%kind, "low-level hook installed");
                Ok(HookId(hook.0 as usize))
            }
            Err(e) => {
                target.with(|slot| *slot.borrow_mut() = None);
                Err(InstallError::Rejected {
                    kind,
                    reason: e.to_string(),
                })
            }
        }
    }

    fn unregister(&mut self, kind: HookKind, id: HookId) {
        // SAFETY: `id` was produced by SetWindowsHookExW in `register`.
        if let Err(e) = unsafe { UnhookWindowsHookEx(HHOOK(id.0 as *mut c_void)) } {
            warn!(%kind, "UnhookWindowsHookEx failed: {e}");
        }
        target_of(kind).with(|slot| *slot.borrow_mut() = None);
        debug!(%kind, "low-level hook removed");
    }

    fn pump(&mut self) -> Result<PumpOutcome, LoopRetrievalError> {
        let mut msg = MSG::default();
        // SAFETY: standard Win32 GetMessage/DispatchMessage loop step; `msg`
        // outlives both calls.
        unsafe {
            match GetMessageW(&mut msg, None, 0, 0).0 {
                -1 => Err(LoopRetrievalError {
                    reason: std::io::Error::last_os_error().to_string(),
                }),
                0 => Ok(PumpOutcome::Quit),
                _ => {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                    Ok(PumpOutcome::Dispatched)
                }
            }
        }
    }

    fn quit_handle(&self) -> QuitHandle {
        let thread_id = self.thread_id;
        QuitHandle::new(move || {
            // SAFETY: posting to a thread id is valid from any thread; a
            // thread that has already exited makes the call fail harmlessly.
            if let Err(e) = unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }
            {
                debug!("PostThreadMessageW(WM_QUIT) failed: {e}");
            }
        })
    }
}

fn dispatch_to(target: &'static LocalKey<TargetSlot>, event: RawInputEvent) {
    let dispatcher = target
        .try_with(|slot| slot.try_borrow().ok().and_then(|d| d.clone()))
        .ok()
        .flatten();
    if let Some(dispatcher) = dispatcher {
        let _ = deliver(&dispatcher, event);
    }
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// Called by Windows from inside `GetMessageW` on the installing thread.
/// It must return quickly to avoid removal by the OS.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
        let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
        dispatch_to(
            &KEYBOARD_TARGET,
            RawInputEvent::Keyboard {
                vk_code: kbs.vkCode,
                message: w_param.0 as u32,
            },
        );
    }

    // SAFETY: Forward the event to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}

/// Low-level mouse hook callback.
///
/// # Safety
///
/// Called by Windows from inside `GetMessageW` on the installing thread.
unsafe extern "system" fn mouse_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        // SAFETY: l_param points to a MSLLHOOKSTRUCT when n_code == HC_ACTION.
        let mhs = &*(l_param.0 as *const MSLLHOOKSTRUCT);
        dispatch_to(
            &MOUSE_TARGET,
            RawInputEvent::Mouse {
                message: w_param.0 as u32,
                mouse_data: mhs.mouseData,
            },
        );
    }

    // SAFETY: Forward to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}
