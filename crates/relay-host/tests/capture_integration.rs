//! Integration tests for the capture pipeline.
//!
//! These tests exercise the host end-to-end without the OS:
//! `InputHook` + `MockHookSource` + `ForwardingObserver` + the relay drain.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use relay_core::{EventFlags, NetworkAddress, Point, RawInputEvent, SocketAddress};
use relay_host::application::forward_input::{drain_to_log, ForwardingObserver};
use relay_host::infrastructure::input_capture::mock::MockHookSource;
use relay_host::infrastructure::input_capture::{HookError, InputHook};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn move_to(x: i32, y: i32) -> RawInputEvent {
    RawInputEvent::new(Point::new(x, y), 0, EventFlags(EventFlags::MOVE), 0, 0)
}

fn left_click() -> RawInputEvent {
    RawInputEvent::new(Point::new(0, 0), 0, EventFlags(EventFlags::LEFT_DOWN), 0, 0)
}

fn local_target() -> NetworkAddress {
    NetworkAddress::Socket(SocketAddress::new("127.0.0.1", 4020))
}

/// Observer that counts every event it sees and never handles any.
fn counting_observer(hook: &mut InputHook<MockHookSource>) -> Arc<AtomicUsize> {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    hook.subscribe_fn(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    seen
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_forwarding_observer_suppresses_and_shadows_later_observers() {
    // Arrange
    let mut hook = InputHook::new(MockHookSource::new());
    let (observer, control, mut rx) = ForwardingObserver::new(16, true);
    hook.subscribe(observer);
    let later = counting_observer(&mut hook);
    let _handle = hook.install().expect("mock install must succeed");
    control.set_active(true);

    // Act
    let result = hook.source().inject(move_to(10, 20)).expect("hook is registered");

    // Assert
    assert!(result.handled, "forwarded event must be suppressed locally");
    assert_eq!(later.load(Ordering::SeqCst), 0, "first handler wins");
    assert_eq!(rx.try_recv().unwrap(), move_to(10, 20));
}

#[test]
fn test_inactive_forwarding_lets_every_observer_run() {
    let mut hook = InputHook::new(MockHookSource::new());
    let (observer, _control, mut rx) = ForwardingObserver::new(16, true);
    hook.subscribe(observer);
    let later = counting_observer(&mut hook);
    let _handle = hook.install().unwrap();

    let result = hook.source().inject(left_click()).unwrap();

    assert!(!result.handled);
    assert_eq!(later.load(Ordering::SeqCst), 1);
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_full_queue_falls_through_to_next_observer() {
    // Arrange
    let mut hook = InputHook::new(MockHookSource::new());
    let (observer, control, _rx) = ForwardingObserver::new(1, true);
    hook.subscribe(observer);
    let later = counting_observer(&mut hook);
    let _handle = hook.install().unwrap();
    control.set_active(true);

    // Act
    let first = hook.source().inject(move_to(1, 1)).unwrap();
    let second = hook.source().inject(move_to(2, 2)).unwrap();

    // Assert
    assert!(first.handled);
    assert!(!second.handled, "a dropped event stays with the local desktop");
    assert_eq!(later.load(Ordering::SeqCst), 1);
    assert_eq!(control.dropped(), 1);
}

#[test]
fn test_events_stop_after_uninstall_and_resume_after_reinstall() {
    let mut hook = InputHook::new(MockHookSource::new());
    let seen = counting_observer(&mut hook);

    let handle = hook.install().unwrap();
    hook.source().inject(move_to(0, 0));
    hook.uninstall(&handle);
    assert!(hook.source().inject(move_to(0, 0)).is_none());

    let _again = hook.install().expect("install after uninstall must succeed");
    hook.source().inject(move_to(0, 0));

    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[test]
fn test_refused_install_reports_permission_denied() {
    let mut hook = InputHook::new(MockHookSource::refusing("not in interactive session"));

    let result = hook.install();

    assert_eq!(
        result,
        Err(HookError::PermissionDenied(
            "not in interactive session".to_string()
        ))
    );
    assert!(!hook.is_installed());
}

#[test]
fn test_relay_drains_everything_forwarded_before_hook_drop() {
    // Arrange
    let mut hook = InputHook::new(MockHookSource::new());
    let (observer, control, rx) = ForwardingObserver::new(64, false);
    hook.subscribe(observer);
    let _handle = hook.install().unwrap();
    control.set_active(true);

    for x in 0..10 {
        hook.source().inject(move_to(x, x));
    }

    // Act: dropping the hook drops the observer and closes the queue.
    drop(hook);
    let relayed = tokio_test::block_on(drain_to_log(rx, local_target()));

    // Assert
    assert_eq!(relayed, 10);
}
