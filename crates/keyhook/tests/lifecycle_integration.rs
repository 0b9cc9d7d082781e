//! Integration test for the process exit hook.
//!
//! Kept in its own test binary: firing the exit hooks asks every registered
//! loop in the process to quit.

use keyhook::infrastructure::hook::mock::{MockHookBackend, MockMessage};
use keyhook::infrastructure::lifecycle;
use keyhook::{HookSession, LoopExit};

#[test]
fn test_exit_hook_stops_loop_and_releases_hooks() {
    // Arrange
    let backend = MockHookBackend::with_script([
        MockMessage::Other,
        MockMessage::Other,
        MockMessage::Other,
    ]);
    let ledger = backend.ledger();
    let mut session = HookSession::new(backend);
    session.install_kinds(true, true).expect("install");
    let registration = lifecycle::register_exit_hook(session.quit_handle());

    // Act
    let asked = lifecycle::fire_exit_hooks();
    let exit = session.run().expect("run");

    // Assert
    assert_eq!(asked, 1);
    assert_eq!(exit, LoopExit::Quit);
    assert_eq!(session.backend().remaining(), 3);
    assert_eq!(ledger.borrow().unregistered.len(), 2);
    assert!(session.installed_kinds().is_empty());

    drop(registration);
    assert_eq!(lifecycle::fire_exit_hooks(), 0);
}
