//! Tether bridge - marshaling between the native RPC runtime and a host
//!
//! This crate converts values and exceptions across the boundary between the
//! statically typed native RPC runtime (`tether-rpc`) and a dynamically typed
//! host interpreter reached through [`tether_sdk::HostRuntime`].
//!
//! # Ownership
//!
//! Host objects are held through [`Handle`], which owns exactly one host
//! reference and releases it on drop. Host exceptions are [`HostErr`] values
//! owning the exception instance. No code path releases a reference twice or
//! leaks one, including early returns through `?`.
//!
//! # Locking
//!
//! Every host-touching function takes a [`HostToken`], obtainable only while
//! the host execution lock is held. [`AcquireLock`] affiliates and locks a
//! native thread; [`HostToken::allow_threads`] gives the lock up around
//! blocking native work.
//!
//! # Example
//!
//! ```ignore
//! let _guard = AcquireLock::new(host);
//! let py = _guard.token();
//! bootstrap::install(py)?;
//!
//! let bridge = Bridge::default();
//! bridge.set_host_exception(py, &RpcException::Local(err));
//! ```

#![warn(missing_docs)]

pub mod bootstrap;
pub mod bridge;
pub mod config;
pub mod convert;
pub mod error;
pub mod exit;
pub mod handle;
pub mod ident;
pub mod lock;
pub mod registry;

mod identity;
mod translate;

pub use bridge::Bridge;
pub use config::{BridgeConfig, ConfigError, ExitConfig, LookupConfig, TypeNames};
pub use convert::{context_to_dict, dict_to_context, host_to_strings, strings_to_host};
pub use error::{HostErr, HostResult, RaisedExt};
pub use exit::{exit_status, handle_system_exit};
pub use handle::Handle;
pub use ident::{fix_identifier, host_name_to_scope, is_reserved, scope_to_host_name};
pub use lock::{AcquireLock, HostToken};
pub use registry::lookup_type;
