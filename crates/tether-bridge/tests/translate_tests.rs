//! Integration tests for the exception taxonomy translator
//!
//! Tests cover:
//! - Native to host to native round-trips for every local kind
//! - User exceptions with and without a host counterpart, or a broken name
//! - Host exceptions outside both hierarchies
//! - Field values of the wrong host type, identity lookalikes included
//! - Active-error handling and the always-failing throw helper
//! - Reference balance on success and on allocation failure

use std::fmt;
use std::sync::Arc;

use tether_bridge::{bootstrap, AcquireLock, Bridge, BridgeConfig, Handle, HostErr};
use tether_host::EmbeddedHost;
use tether_rpc::{
    FieldType, FieldValue, Identity, LocalException, LocalKind, OwnedFieldValue,
    RequestFailedKind, RpcException, RuntimeException, UnknownKind, UserException,
};
use tether_sdk::{BuiltinError, HostRef, HostResult as RawResult, HostRuntime, Raised};

#[derive(Debug, Clone)]
struct Overdrawn {
    balance: i64,
}

impl fmt::Display for Overdrawn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "balance: {}", self.balance)
    }
}

impl UserException for Overdrawn {
    fn scoped_name(&self) -> &str {
        "::Bank::Overdrawn"
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![("balance", FieldValue::Int(self.balance))]
    }

    fn clone_box(&self) -> Box<dyn UserException> {
        Box::new(self.clone())
    }
}

fn overdrawn(balance: i64) -> RpcException {
    RpcException::User(Box::new(Overdrawn { balance }))
}

/// Every declared field set to a distinct non-default value
fn populated(kind: LocalKind) -> LocalException {
    let mut ex = LocalException::new(kind);
    for (index, field) in kind.fields().iter().enumerate() {
        let value = match field.ty {
            FieldType::Str => OwnedFieldValue::Str(format!("{}.{}", kind.name(), field.name)),
            FieldType::Int => OwnedFieldValue::Int(40 + index as i64),
            FieldType::Identity => OwnedFieldValue::Identity(Identity::new("foo", "bar")),
        };
        assert!(ex.set_field(field.name, value));
    }
    ex
}

/// `rpc_name` override that raises
fn failing_name(rt: &dyn HostRuntime, _args: &[HostRef]) -> RawResult<HostRef> {
    Err(Raised(rt.new_error(BuiltinError::RuntimeError, "no name")))
}

/// `rpc_name` override that returns a non-string
fn numeric_name(rt: &dyn HostRuntime, _args: &[HostRef]) -> RawResult<HostRef> {
    rt.new_int(42)
}

/// Register `Bank.Overdrawn` deriving from the installed `Rpc.UserException`
fn register_bank(host: &EmbeddedHost) {
    host.register_module("Bank", |rt| {
        let rpc = rt.sys_modules_get("Rpc").expect("Rpc installed first");
        let base = rt.module_dict_get(rpc, "UserException").expect("UserException");
        let module = rt.new_module("Bank")?;
        let class = match rt.new_class("Bank", "Overdrawn", &[base]) {
            Ok(class) => class,
            Err(raised) => {
                rt.decref(module);
                return Err(raised);
            }
        };
        let stored = rt.set_attr(module, "Overdrawn", class);
        rt.decref(class);
        match stored {
            Ok(()) => Ok(module),
            Err(raised) => {
                rt.decref(module);
                Err(raised)
            }
        }
    });
}

#[test]
fn test_every_local_kind_round_trips() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();
    let bridge = Bridge::default();

    for &kind in LocalKind::ALL {
        let original = populated(kind);
        let instance = bridge
            .convert_exception(py, &RpcException::Local(original.clone()))
            .unwrap();
        assert_eq!(
            instance.get_type().str().unwrap(),
            format!("Rpc.{}", kind.name())
        );

        let back = bridge.to_native_exception(py, Some(&instance));
        assert_eq!(back.as_local(), Some(&original), "round-trip of {:?}", kind);
    }
}

#[test]
fn test_request_failed_round_trips_exactly() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();
    let bridge = Bridge::default();

    let original = LocalException::request_failed(
        RequestFailedKind::ObjectNotExist,
        Identity::new("foo", "bar"),
        "f",
        "op",
    );
    let instance = bridge
        .convert_exception(py, &original.clone().into())
        .unwrap();

    let id = instance.getattr("id").unwrap();
    assert!(bridge.is_identity(&id));
    assert_eq!(id.getattr("name").unwrap().extract_str().unwrap(), "foo");
    assert_eq!(id.getattr("category").unwrap().extract_str().unwrap(), "bar");
    assert_eq!(instance.getattr("facet").unwrap().extract_str().unwrap(), "f");
    assert_eq!(instance.getattr("operation").unwrap().extract_str().unwrap(), "op");

    let back = bridge.to_native_exception(py, Some(&instance));
    assert_eq!(back.as_local(), Some(&original));
}

#[test]
fn test_derived_kind_is_instance_of_parent_class() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();
    let bridge = Bridge::default();

    let refused = bridge
        .convert_exception(py, &LocalException::new(LocalKind::ConnectionRefused).into())
        .unwrap();
    for ancestor in ["Rpc.ConnectFailedException", "Rpc.SyscallException", "Rpc.LocalException"] {
        let class = bridge.lookup_type(py, ancestor).unwrap();
        assert!(refused.is_instance(&class).unwrap(), "{}", ancestor);
    }
}

#[test]
fn test_user_exception_without_counterpart() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();
    let bridge = Bridge::default();

    let ex = overdrawn(-5);
    let rendered = ex.to_string();
    let instance = bridge.convert_exception(py, &ex).unwrap();
    assert_eq!(
        instance.get_type().str().unwrap(),
        "Rpc.UnknownUserException"
    );
    assert_eq!(
        instance.getattr("unknown").unwrap().extract_str().unwrap(),
        rendered
    );
    assert!(!host.err_occurred());

    let back = bridge.to_native_exception(py, Some(&instance));
    assert_eq!(
        back.as_local(),
        Some(&LocalException::unknown(UnknownKind::User, rendered))
    );
}

#[test]
fn test_user_exception_with_counterpart() {
    let host = EmbeddedHost::new();
    register_bank(&host);
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();
    let bridge = Bridge::default();

    let instance = bridge.convert_exception(py, &overdrawn(-5)).unwrap();
    assert_eq!(instance.get_type().str().unwrap(), "Bank.Overdrawn");
    assert_eq!(instance.getattr("balance").unwrap().extract_int().unwrap(), -5);

    let back = bridge.to_native_exception(py, Some(&instance));
    assert_eq!(
        back.as_local(),
        Some(&LocalException::unknown(UnknownKind::User, "Bank::Overdrawn"))
    );
}

#[test]
fn test_runtime_exception_falls_back_to_unknown() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();
    let bridge = Bridge::default();

    let ex: RpcException = RuntimeException::new("::std::bad_alloc", "out of memory").into();
    let instance = bridge.convert_exception(py, &ex).unwrap();
    assert_eq!(instance.get_type().str().unwrap(), "Rpc.UnknownException");
    assert_eq!(
        instance.getattr("unknown").unwrap().extract_str().unwrap(),
        "std::bad_alloc:\nout of memory"
    );
}

#[test]
fn test_unrelated_host_exception() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();
    let bridge = Bridge::default();

    let err = HostErr::new(py, BuiltinError::ValueError, "bad input");
    let back = bridge.to_native_exception(py, Some(err.instance()));
    assert_eq!(
        back.as_local(),
        Some(&LocalException::unknown(UnknownKind::Unknown, "ValueError: bad input"))
    );

    let class = Handle::from_borrowed(py, host.builtin_error_type(BuiltinError::RuntimeError));
    let silent = class.call0().unwrap();
    let back = bridge.to_native_exception(py, Some(&silent));
    assert_eq!(
        back.as_local(),
        Some(&LocalException::unknown(UnknownKind::Unknown, "RuntimeError"))
    );
}

#[test]
fn test_unmatched_local_subclass_becomes_unknown_local() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();
    let bridge = Bridge::default();

    let local = bridge.lookup_type(py, "Rpc.LocalException").unwrap();
    let custom = Handle::wrap(
        py,
        host.new_class("app", "CustomLocal", &[local.as_raw()]),
    )
    .unwrap();
    let instance = custom.call0().unwrap();

    let back = bridge.to_native_exception(py, Some(&instance));
    assert_eq!(
        back.as_local(),
        Some(&LocalException::unknown(UnknownKind::Local, "app.CustomLocal"))
    );
}

#[test]
fn test_mistyped_fields_keep_defaults() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();
    let bridge = Bridge::default();

    let class = bridge.lookup_type(py, "Rpc.ObjectNotExistException").unwrap();
    let instance = class.call0().unwrap();
    instance.setattr("id", &Handle::new_int(py, 7).unwrap()).unwrap();
    instance.setattr("facet", &Handle::new_int(py, 1).unwrap()).unwrap();
    instance
        .setattr("operation", &Handle::new_str(py, "ping").unwrap())
        .unwrap();

    let back = bridge.to_native_exception(py, Some(&instance));
    assert_eq!(
        back.as_local(),
        Some(&LocalException::request_failed(
            RequestFailedKind::ObjectNotExist,
            Identity::default(),
            "",
            "ping",
        ))
    );
    assert!(!host.err_occurred());
}

#[test]
fn test_identity_lookalike_keeps_default_identity() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();
    let bridge = Bridge::default();

    let record = Handle::wrap(py, host.new_class("app", "FakeIdentity", &[])).unwrap();
    let lookalike = record.call0().unwrap();
    lookalike
        .setattr("name", &Handle::new_str(py, "foo").unwrap())
        .unwrap();
    lookalike
        .setattr("category", &Handle::new_str(py, "bar").unwrap())
        .unwrap();
    assert!(!bridge.is_identity(&lookalike));

    let class = bridge.lookup_type(py, "Rpc.ObjectNotExistException").unwrap();
    let instance = class.call0().unwrap();
    instance.setattr("id", &lookalike).unwrap();
    instance
        .setattr("facet", &Handle::new_str(py, "f").unwrap())
        .unwrap();

    let back = bridge.to_native_exception(py, Some(&instance));
    assert_eq!(
        back.as_local(),
        Some(&LocalException::request_failed(
            RequestFailedKind::ObjectNotExist,
            Identity::default(),
            "f",
            "",
        ))
    );
    assert!(!host.err_occurred());
}

#[test]
fn test_broken_user_name_falls_back_to_class_name() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();
    let bridge = Bridge::default();
    let user = bridge.lookup_type(py, "Rpc.UserException").unwrap();

    let overrides: [(&str, fn(&dyn HostRuntime, &[HostRef]) -> RawResult<HostRef>); 2] =
        [("Rejected", failing_name), ("Numbered", numeric_name)];
    for (name, method) in overrides {
        let class = Handle::wrap(py, host.new_class("app", name, &[user.as_raw()])).unwrap();
        let rpc_name = host.new_function("rpc_name", Arc::new(method));
        class
            .setattr("rpc_name", &Handle::wrap(py, rpc_name).unwrap())
            .unwrap();
        let instance = class.call0().unwrap();

        let back = bridge.to_native_exception(py, Some(&instance));
        assert_eq!(
            back.as_local(),
            Some(&LocalException::unknown(
                UnknownKind::User,
                format!("app.{}", name)
            ))
        );
        assert!(!host.err_occurred());
    }
}

#[test]
fn test_active_error_is_fetched_and_cleared() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();
    let bridge = Bridge::default();

    let original = LocalException::new(LocalKind::Timeout);
    bridge.set_host_exception(py, &original.clone().into());
    assert!(host.err_occurred());

    let result: Result<(), RpcException> = bridge.throw_host_exception(py, None);
    assert_eq!(result.unwrap_err().as_local(), Some(&original));
    assert!(!host.err_occurred());

    let nothing = bridge.to_native_exception(py, None);
    assert_eq!(
        nothing.as_local(),
        Some(&LocalException::unknown(UnknownKind::Unknown, "unknown host exception"))
    );
}

#[test]
fn test_translation_releases_everything() {
    let host = EmbeddedHost::new();
    register_bank(&host);
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();
    let bridge = Bridge::default();

    // Import Bank once so the baseline includes it
    drop(bridge.lookup_type(py, "Bank.Overdrawn").unwrap());
    let before = host.live_objects();

    for &kind in LocalKind::ALL {
        let instance = bridge
            .convert_exception(py, &populated(kind).into())
            .unwrap();
        let _ = bridge.to_native_exception(py, Some(&instance));
    }
    for ex in [overdrawn(1), RuntimeException::new("::X", "y").into()] {
        let _ = bridge.to_native_exception(py, Some(&bridge.convert_exception(py, &ex).unwrap()));
    }
    bridge.set_host_exception(py, &LocalException::new(LocalKind::Socket).into());
    let _ = bridge.to_native_exception(py, None);

    assert_eq!(host.live_objects(), before);
}

#[test]
fn test_allocation_failure_propagates_without_leak() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();
    let bridge = Bridge::default();
    let before = host.live_objects();

    let ex: RpcException = LocalException::request_failed(
        RequestFailedKind::FacetNotExist,
        Identity::new("foo", "bar"),
        "f",
        "op",
    )
    .into();
    host.limit_new_objects(Some(2));
    let err = bridge.host_err(py, &ex);
    host.limit_new_objects(None);

    assert!(err.is_instance_of(BuiltinError::MemoryError));
    drop(err);
    assert_eq!(host.live_objects(), before);
}

#[test]
fn test_custom_fallback_type_names() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();

    let mut config = BridgeConfig::default();
    config.types.unknown = "Rpc.UnknownLocalException".to_string();
    let bridge = Bridge::new(config).unwrap();

    let instance = bridge
        .convert_exception(py, &RuntimeException::new("::X", "").into())
        .unwrap();
    assert_eq!(
        instance.get_type().str().unwrap(),
        "Rpc.UnknownLocalException"
    );
}

#[test]
#[should_panic(expected = "required host type `Rpc.UnknownUserException` is not registered")]
fn test_missing_fallback_type_is_fatal() {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let bridge = Bridge::default();
    let _ = bridge.convert_exception(guard.token(), &overdrawn(0));
}
