//! Integration tests for the process-exit adaptor
//!
//! `EmbeddedHost` reports `exit` by unwinding with a `ProcessExit` payload,
//! which these tests catch.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tether_bridge::{AcquireLock, Bridge, BridgeConfig, Handle};
use tether_host::{EmbeddedHost, ProcessExit};
use tether_sdk::{BuiltinError, HostRuntime};

fn exit_with(bridge: &Bridge, exc: &Handle<'_>) -> ProcessExit {
    let payload = catch_unwind(AssertUnwindSafe(|| bridge.handle_system_exit(exc))).unwrap_err();
    *payload
        .downcast_ref::<ProcessExit>()
        .expect("exit must unwind with ProcessExit")
}

#[test]
fn test_system_exit_with_integer_code() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    let bridge = Bridge::default();

    let class = Handle::from_borrowed(py, host.builtin_error_type(BuiltinError::SystemExit));
    let code = Handle::new_int(py, 4).unwrap();
    let exc = class.call(&[&code]).unwrap();

    assert_eq!(exit_with(&bridge, &exc), ProcessExit { status: 4 });
    assert!(host.stderr().is_empty());
    assert!(host.lock_held());
}

#[test]
fn test_system_exit_with_message_uses_fallback() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();

    let mut config = BridgeConfig::default();
    config.exit.fallback_status = 3;
    let bridge = Bridge::new(config).unwrap();

    let class = Handle::from_borrowed(py, host.builtin_error_type(BuiltinError::SystemExit));
    let message = Handle::new_str(py, "shutting down").unwrap();
    let exc = class.call(&[&message]).unwrap();

    assert_eq!(exit_with(&bridge, &exc), ProcessExit { status: 3 });
    assert_eq!(host.take_stderr(), "shutting down\n");
}

#[test]
fn test_system_exit_without_code() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    let bridge = Bridge::default();

    let class = Handle::from_borrowed(py, host.builtin_error_type(BuiltinError::SystemExit));
    let exc = class.call0().unwrap();

    assert_eq!(bridge.exit_status(&exc), 1);
    assert_eq!(host.take_stderr(), "None\n");
}
