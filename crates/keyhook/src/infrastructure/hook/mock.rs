//! Scripted hook backend for tests.
//!
//! [`MockHookBackend`] stands in for the OS. Each [`pump`] call takes the next
//! [`MockMessage`] from its script. For a raw input event whose hook kind is
//! registered, it runs the dispatcher through [`deliver`] and then forwards
//! the chain, exactly like the Windows callback. Everything observable is
//! recorded in a [`MockLedger`] that tests read after the session has run.
//!
//! [`pump`]: HookBackend::pump

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use keyhook_core::{DispatchOutcome, SharedDispatcher};

use super::{
    deliver, HookBackend, HookId, HookKind, InstallError, LoopRetrievalError, PumpOutcome,
    QuitHandle, RawInputEvent,
};

/// One scripted step of the message loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockMessage {
    /// A raw event from the hardware, routed to the hook of its kind.
    Input(RawInputEvent),
    /// An unrelated thread message (timer, window message, …).
    Other,
    /// `WM_QUIT`.
    Quit,
    /// `GetMessageW` returned -1.
    Fail(String),
}

/// What the mock OS observed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MockLedger {
    /// Hook callbacks invoked (raw events whose kind was registered).
    pub callbacks: u32,
    /// Times the event was passed on to the next hook after a callback.
    pub chain_forwards: u32,
    /// Raw events that arrived while no hook of their kind was registered.
    pub unhooked_events: u32,
    pub other_messages: u32,
    pub registered: Vec<HookKind>,
    pub unregistered: Vec<HookKind>,
    /// Dispatcher outcome of each callback, `None` when it was skipped.
    pub outcomes: Vec<Option<DispatchOutcome>>,
}

/// A fake OS hook backend driven by a script.
pub struct MockHookBackend {
    script: VecDeque<MockMessage>,
    hooks: HashMap<HookKind, (HookId, SharedDispatcher)>,
    rejected: Vec<HookKind>,
    next_id: usize,
    quit_requested: Arc<AtomicBool>,
    ledger: Rc<RefCell<MockLedger>>,
}

impl MockHookBackend {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            hooks: HashMap::new(),
            rejected: Vec::new(),
            next_id: 1,
            quit_requested: Arc::new(AtomicBool::new(false)),
            ledger: Rc::new(RefCell::new(MockLedger::default())),
        }
    }

    /// Creates a backend that replays `script` and then reports `Quit`.
    pub fn with_script<I>(script: I) -> Self
    where
        I: IntoIterator<Item = MockMessage>,
    {
        let mut backend = Self::new();
        backend.script.extend(script);
        backend
    }

    pub fn push(&mut self, message: MockMessage) {
        self.script.push_back(message);
    }

    pub fn push_key(&mut self, vk_code: u32, message: u32) {
        self.push(MockMessage::Input(RawInputEvent::Keyboard { vk_code, message }));
    }

    pub fn push_mouse(&mut self, message: u32, mouse_data: u32) {
        self.push(MockMessage::Input(RawInputEvent::Mouse {
            message,
            mouse_data,
        }));
    }

    /// Makes every later registration of `kind` fail as if the OS refused it.
    pub fn reject(&mut self, kind: HookKind) {
        self.rejected.push(kind);
    }

    /// Shared view of what the backend observed.
    pub fn ledger(&self) -> Rc<RefCell<MockLedger>> {
        Rc::clone(&self.ledger)
    }

    pub fn is_registered(&self, kind: HookKind) -> bool {
        self.hooks.contains_key(&kind)
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    fn route(&mut self, event: RawInputEvent) {
        let Some((_, dispatcher)) = self.hooks.get(&event.kind()) else {
            self.ledger.borrow_mut().unhooked_events += 1;
            return;
        };
        let dispatcher = Rc::clone(dispatcher);

        let outcome = deliver(&dispatcher, event);

        let mut ledger = self.ledger.borrow_mut();
        ledger.callbacks += 1;
        ledger.outcomes.push(outcome);
        ledger.chain_forwards += 1;
    }
}

impl Default for MockHookBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HookBackend for MockHookBackend {
    fn register(
        &mut self,
        kind: HookKind,
        dispatcher: SharedDispatcher,
    ) -> Result<HookId, InstallError> {
        if self.rejected.contains(&kind) {
            return Err(InstallError::Rejected {
                kind,
                reason: "rejected by mock".to_string(),
            });
        }
        if self.hooks.contains_key(&kind) {
            return Err(InstallError::AlreadyInstalled { kind });
        }

        let id = HookId(self.next_id);
        self.next_id += 1;
        self.hooks.insert(kind, (id, dispatcher));
        self.ledger.borrow_mut().registered.push(kind);
        Ok(id)
    }

    fn unregister(&mut self, kind: HookKind, id: HookId) {
        if matches!(self.hooks.get(&kind), Some((current, _)) if *current == id) {
            self.hooks.remove(&kind);
            self.ledger.borrow_mut().unregistered.push(kind);
        }
    }

    fn pump(&mut self) -> Result<PumpOutcome, LoopRetrievalError> {
        if self.quit_requested.swap(false, Ordering::SeqCst) {
            return Ok(PumpOutcome::Quit);
        }

        match self.script.pop_front() {
            None | Some(MockMessage::Quit) => Ok(PumpOutcome::Quit),
            Some(MockMessage::Input(event)) => {
                self.route(event);
                Ok(PumpOutcome::Dispatched)
            }
            Some(MockMessage::Other) => {
                self.ledger.borrow_mut().other_messages += 1;
                Ok(PumpOutcome::Dispatched)
            }
            Some(MockMessage::Fail(reason)) => Err(LoopRetrievalError { reason }),
        }
    }

    fn quit_handle(&self) -> QuitHandle {
        let flag = Arc::clone(&self.quit_requested);
        QuitHandle::new(move || flag.store(true, Ordering::SeqCst))
    }
}
