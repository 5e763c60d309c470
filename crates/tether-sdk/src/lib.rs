//! Tether SDK - raw host-runtime ABI
//!
//! This crate provides the minimal types and the trait a host interpreter
//! implements so the tether bridge can marshal values and exceptions into it
//! without depending on any particular interpreter.
//!
//! Everything here is deliberately low level: `HostRef` is an unowned token
//! and ownership is expressed by documentation, like the host's own C API.
//! The owning, lock-aware layer lives in `tether-bridge`.

#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod value;

pub use context::{HostFunction, HostRuntime, LockState, SavedThread};
pub use error::{BuiltinError, HostResult, Raised};
pub use value::HostRef;
