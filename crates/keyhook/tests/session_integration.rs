//! Integration tests for the hook session.
//!
//! These tests drive `HookSession` end-to-end on `MockHookBackend`: scripted
//! raw hook messages go through the same delivery path as the Windows hook
//! callbacks, and the mock's ledger records every callback and every
//! forwarded chain token.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use keyhook::application::bindings::BindingHandler;
use keyhook::infrastructure::hook::mock::{MockHookBackend, MockMessage};
use keyhook::infrastructure::storage::config::HookConfig;
use keyhook::{HookBackend, HookKind, HookSession, LoopExit, SessionError};
use keyhook_core::{
    handler_fn, DispatchOutcome, Event, EventType, HandlerError, KeyId, MouseButtonId,
};

const WM_KEYDOWN: u32 = 0x0100;
const WM_KEYUP: u32 = 0x0101;
const WM_MOUSEMOVE: u32 = 0x0200;
const WM_RBUTTONDOWN: u32 = 0x0204;

const VK_A: u32 = 0x41;
const VK_K: u32 = 0x4B;
const VK_LCONTROL: u32 = 0xA2;

// ── Helpers ───────────────────────────────────────────────────────────────────

type Seen = Rc<RefCell<Vec<Event>>>;

/// Session whose handler records every delivered event.
fn recording_session(backend: MockHookBackend) -> (HookSession<MockHookBackend>, Seen) {
    let session = HookSession::new(backend);
    let seen: Seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    session.set_handler(handler_fn(move |event: &Event| {
        sink.borrow_mut().push(event.clone());
        Ok(())
    }));
    (session, seen)
}

#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ── Keyboard scenarios ────────────────────────────────────────────────────────

#[test]
fn test_ctrl_then_a_carries_both_held_keys() {
    // Arrange
    let mut backend = MockHookBackend::new();
    backend.push_key(VK_LCONTROL, WM_KEYDOWN);
    backend.push_key(VK_A, WM_KEYDOWN);
    let (mut session, seen) = recording_session(backend);
    session.install(HookKind::Keyboard).expect("install keyboard");

    // Act
    let exit = session.run().expect("run");

    // Assert
    assert_eq!(exit, LoopExit::Quit);
    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    let a = seen[1].as_keyboard().expect("keyboard event");
    assert_eq!(a.current_key, KeyId::A);
    assert_eq!(a.event_type, EventType::KeyDown);
    assert_eq!(a.pressed_keys, vec![KeyId::Lcontrol, KeyId::A]);
}

#[test]
fn test_repeated_key_up_is_a_no_op() {
    // Arrange
    let mut backend = MockHookBackend::new();
    backend.push_key(VK_A, WM_KEYDOWN);
    backend.push_key(VK_A, WM_KEYUP);
    backend.push_key(VK_A, WM_KEYUP);
    let (mut session, seen) = recording_session(backend);
    session.install(HookKind::Keyboard).expect("install keyboard");

    // Act
    session.run().expect("run");

    // Assert
    let seen = seen.borrow();
    assert_eq!(seen.len(), 3);
    for event in &seen[1..] {
        let e = event.as_keyboard().expect("keyboard event");
        assert_eq!(e.event_type, EventType::KeyUp);
        assert!(e.pressed_keys.is_empty());
    }
    assert_eq!(session.stats().handler_failures, 0);
}

#[test]
fn test_unknown_code_is_dropped_but_chain_is_forwarded() {
    // Arrange
    let mut backend = MockHookBackend::new();
    backend.push_key(0xFF, WM_KEYDOWN);
    let ledger = backend.ledger();
    let (mut session, seen) = recording_session(backend);
    session.install(HookKind::Keyboard).expect("install keyboard");

    // Act
    session.run().expect("run");

    // Assert
    assert!(seen.borrow().is_empty());
    let ledger = ledger.borrow();
    assert_eq!(ledger.callbacks, 1);
    assert_eq!(ledger.chain_forwards, 1);
    assert!(matches!(
        ledger.outcomes[0],
        Some(DispatchOutcome::Dropped(ref e)) if e.code == 0xFF
    ));
}

// ── Mouse scenarios ───────────────────────────────────────────────────────────

#[test]
fn test_right_button_down_is_delivered() {
    // Arrange
    let mut backend = MockHookBackend::new();
    backend.push_mouse(WM_RBUTTONDOWN, 0);
    let (mut session, seen) = recording_session(backend);
    session.install(HookKind::Mouse).expect("install mouse");

    // Act
    session.run().expect("run");

    // Assert
    let seen = seen.borrow();
    let e = seen[0].as_mouse().expect("mouse event");
    assert_eq!(e.current_key, MouseButtonId::RButton);
    assert_eq!(e.event_type, EventType::KeyDown);
}

#[test]
fn test_mouse_move_emits_nothing_but_is_forwarded() {
    // Arrange
    let mut backend = MockHookBackend::new();
    backend.push_mouse(WM_MOUSEMOVE, 0);
    let ledger = backend.ledger();
    let (mut session, seen) = recording_session(backend);
    session.install(HookKind::Mouse).expect("install mouse");

    // Act
    session.run().expect("run");

    // Assert
    assert!(seen.borrow().is_empty());
    let ledger = ledger.borrow();
    assert_eq!(ledger.chain_forwards, 1);
    assert_eq!(ledger.outcomes, vec![Some(DispatchOutcome::Ignored)]);
}

// ── Install / uninstall ───────────────────────────────────────────────────────

#[test]
fn test_uninstalled_kind_gets_no_further_callbacks() {
    // Arrange
    let mut backend = MockHookBackend::new();
    backend.push_key(VK_A, WM_KEYDOWN);
    backend.push_mouse(WM_RBUTTONDOWN, 0);
    let ledger = backend.ledger();
    let (mut session, seen) = recording_session(backend);
    let keyboard = session.install(HookKind::Keyboard).expect("keyboard");
    session.install(HookKind::Mouse).expect("mouse");

    // Act
    assert!(session.uninstall(keyboard));
    session.run().expect("run");

    // Assert
    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].as_mouse().is_some());
    let ledger = ledger.borrow();
    assert_eq!(ledger.callbacks, 1);
    assert_eq!(ledger.unhooked_events, 1);
}

#[test]
fn test_install_failure_is_reported_before_the_loop() {
    let mut backend = MockHookBackend::with_script([MockMessage::Other]);
    backend.reject(HookKind::Keyboard);
    let mut session = HookSession::new(backend);

    let err = session.install(HookKind::Keyboard).unwrap_err();

    assert_eq!(err.kind(), HookKind::Keyboard);
    assert!(matches!(session.run(), Err(SessionError::NothingInstalled)));
    assert_eq!(session.backend().remaining(), 1);
}

// ── Handler failures ──────────────────────────────────────────────────────────

#[test]
fn test_failing_handler_does_not_stop_later_events() {
    // Arrange
    let mut backend = MockHookBackend::new();
    backend.push_key(VK_A, WM_KEYDOWN);
    backend.push_key(VK_A, WM_KEYUP);
    backend.push_key(VK_K, WM_KEYDOWN);
    let ledger = backend.ledger();
    let mut session = HookSession::new(backend);
    let calls = Rc::new(RefCell::new(0u32));
    let counter = Rc::clone(&calls);
    session.set_handler(handler_fn(move |_event: &Event| {
        *counter.borrow_mut() += 1;
        if *counter.borrow() == 1 {
            return Err("first event rejected".into());
        }
        Ok(())
    }));
    session.install(HookKind::Keyboard).expect("install");

    // Act
    session.run().expect("run");

    // Assert
    assert_eq!(*calls.borrow(), 3);
    let ledger = ledger.borrow();
    assert_eq!(ledger.chain_forwards, 3);
    assert!(matches!(
        ledger.outcomes[0],
        Some(DispatchOutcome::HandlerFailed(_, HandlerError::Failed(ref msg)))
            if msg == "first event rejected"
    ));
    assert!(matches!(ledger.outcomes[2], Some(DispatchOutcome::Delivered(_))));
    let stats = session.stats();
    assert_eq!(stats.handler_failures, 1);
    assert_eq!(stats.delivered, 2);
}

#[test]
fn test_panicking_handler_is_contained() {
    // Arrange
    let mut backend = MockHookBackend::new();
    backend.push_key(VK_LCONTROL, WM_KEYDOWN);
    backend.push_key(VK_A, WM_KEYDOWN);
    let ledger = backend.ledger();
    let mut session = HookSession::new(backend);
    session.set_handler(handler_fn(|event: &Event| {
        if matches!(event, Event::Keyboard(e) if e.current_key == KeyId::Lcontrol) {
            panic!("handler blew up");
        }
        Ok(())
    }));
    session.install(HookKind::Keyboard).expect("install");

    // Act
    let exit = session.run();

    // Assert
    assert_eq!(exit.expect("loop survives the panic"), LoopExit::Quit);
    let ledger = ledger.borrow();
    assert_eq!(ledger.chain_forwards, 2);
    assert!(matches!(
        ledger.outcomes[0],
        Some(DispatchOutcome::HandlerFailed(_, HandlerError::Panicked(ref msg)))
            if msg.contains("handler blew up")
    ));
    // State was still updated for the event whose handler panicked.
    assert!(matches!(
        ledger.outcomes[1],
        Some(DispatchOutcome::Delivered(Event::Keyboard(ref e)))
            if e.pressed_keys == vec![KeyId::Lcontrol, KeyId::A]
    ));
}

#[test]
fn test_handler_can_clear_itself() {
    // Arrange
    let mut backend = MockHookBackend::new();
    backend.push_key(VK_A, WM_KEYDOWN);
    backend.push_key(VK_A, WM_KEYUP);
    let mut session = HookSession::new(backend);
    let slot = session.handler_slot();
    let calls = Rc::new(RefCell::new(0u32));
    let counter = Rc::clone(&calls);
    session.set_handler(handler_fn(move |_event: &Event| {
        *counter.borrow_mut() += 1;
        slot.clear();
        Ok(())
    }));
    session.install(HookKind::Keyboard).expect("install");

    // Act
    session.run().expect("run");

    // Assert
    assert_eq!(*calls.borrow(), 1);
    let stats = session.stats();
    assert_eq!(stats.delivered, 1);
    assert_eq!(stats.unhandled, 1);
}

// ── Loop exit and cleanup ─────────────────────────────────────────────────────

#[test]
fn test_retrieval_failure_releases_all_hooks() {
    // Arrange
    let mut backend = MockHookBackend::new();
    backend.push_key(VK_A, WM_KEYDOWN);
    backend.push(MockMessage::Fail("invalid message queue".to_string()));
    backend.push_key(VK_K, WM_KEYDOWN);
    let ledger = backend.ledger();
    let mut session = HookSession::new(backend);
    session.install_kinds(true, true).expect("install");

    // Act
    let result = session.run();

    // Assert
    match result {
        Err(SessionError::Retrieval(e)) => assert_eq!(e.reason, "invalid message queue"),
        other => panic!("expected retrieval error, got {other:?}"),
    }
    assert!(session.installed_kinds().is_empty());
    assert_eq!(ledger.borrow().unregistered.len(), 2);
    assert_eq!(session.backend().remaining(), 1);
}

#[test]
fn test_quit_requested_from_handler_stops_loop() {
    // Arrange
    let mut backend = MockHookBackend::new();
    backend.push_key(VK_A, WM_KEYDOWN);
    backend.push_key(VK_K, WM_KEYDOWN);
    backend.push_key(VK_A, WM_KEYUP);
    let mut session = HookSession::new(backend);
    let quit = session.quit_handle();
    session.set_handler(handler_fn(move |_event: &Event| {
        quit.request();
        Ok(())
    }));
    session.install(HookKind::Keyboard).expect("install");

    // Act
    let exit = session.run().expect("run");

    // Assert
    assert_eq!(exit, LoopExit::Quit);
    assert_eq!(session.stats().delivered, 1);
    assert_eq!(session.backend().remaining(), 2);
}

#[test]
fn test_quit_handle_works_from_another_thread() {
    let backend = MockHookBackend::with_script([MockMessage::Other, MockMessage::Other]);
    let quit = backend.quit_handle();
    let mut session = HookSession::new(backend);
    session.install(HookKind::Mouse).expect("install");

    std::thread::spawn(move || quit.request())
        .join()
        .expect("quit thread");
    let exit = session.run().expect("run");

    assert_eq!(exit, LoopExit::Quit);
    assert_eq!(session.backend().remaining(), 2);
}

#[test]
fn test_dropping_session_releases_hooks() {
    let backend = MockHookBackend::new();
    let ledger = backend.ledger();
    {
        let mut session = HookSession::new(backend);
        session.install_kinds(true, true).expect("install");
    }

    let ledger = ledger.borrow();
    assert_eq!(ledger.registered, vec![HookKind::Keyboard, HookKind::Mouse]);
    assert_eq!(ledger.unregistered.len(), 2);
}

// ── Bindings end to end ───────────────────────────────────────────────────────

#[test]
fn test_default_bindings_print_demonstration_messages() {
    // Arrange
    let mut backend = MockHookBackend::new();
    backend.push_key(VK_A, WM_KEYDOWN); // no Ctrl held: silent
    backend.push_key(VK_A, WM_KEYUP);
    backend.push_key(VK_LCONTROL, WM_KEYDOWN);
    backend.push_key(VK_A, WM_KEYDOWN);
    backend.push_key(VK_A, WM_KEYUP);
    backend.push_key(VK_LCONTROL, WM_KEYUP);
    backend.push_key(VK_K, WM_KEYDOWN);
    backend.push_mouse(WM_MOUSEMOVE, 0);
    backend.push_mouse(WM_RBUTTONDOWN, 0);
    let out = SharedBuf::default();
    let mut session = HookSession::new(backend);
    session.set_handler(BindingHandler::new(HookConfig::default().bindings, out.clone()));
    session.install_kinds(true, true).expect("install");

    // Act
    session.run().expect("run");

    // Assert
    assert_eq!(
        out.text(),
        "Ctrl + A was pressed\nLwin was pressed\nRight button pressed\n"
    );
}
