//! Tether embedded host runtime
//!
//! An in-process implementation of [`tether_sdk::HostRuntime`]:
//! - Refcounted object heap with generation-checked references
//! - Classes with multiple bases, instances, bound methods
//! - Modules, `sys.modules` and on-demand import through registered initializers
//! - Per-thread active error
//! - Global execution lock with thread-affiliation bookkeeping
//!
//! It stands in for a foreign interpreter in tests and benches, and embeds
//! the bridge into programs that have no interpreter of their own.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod builtins;
pub mod gil;
pub mod heap;
pub mod object;
mod runtime;

use std::sync::Arc;

use tether_sdk::{HostResult, HostRuntime, HostRef};

pub use builtins::{BuiltinType, BUILTINS_MODULE};
pub use heap::HeapError;
pub use runtime::EmbeddedHost;

/// Module initializer run on first import; returns a new reference to the
/// module object
pub type ModuleInit = Arc<dyn Fn(&dyn HostRuntime) -> HostResult<HostRef> + Send + Sync>;

/// Host construction options
#[derive(Debug, Clone, Default)]
pub struct HostOptions {
    /// Maximum number of live objects beyond the builtins (None = unlimited).
    /// Allocations past the limit raise `MemoryError`.
    pub object_limit: Option<usize>,

    /// Terminate the process on `exit` instead of unwinding with
    /// [`ProcessExit`]
    pub exit_process: bool,

    /// Also write diagnostics to the real stderr
    pub echo_stderr: bool,
}

/// Panic payload used by [`EmbeddedHost`] for `exit` when
/// [`HostOptions::exit_process`] is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Requested exit status
    pub status: i32,
}
