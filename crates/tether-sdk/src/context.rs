//! HostRuntime trait - abstract host interpreter operations
//!
//! Defines the interface a host runtime implements for the bridge. The bridge
//! programs against this trait only; it never depends on interpreter
//! internals.
//!
//! # Reference conventions
//!
//! - *new reference*: the caller owns the returned `HostRef` and must release
//!   it exactly once.
//! - *borrowed*: the returned `HostRef` stays valid only while the object it
//!   came from is alive and unmodified; the caller must not release it.
//! - Arguments are always borrowed unless the method says it *steals* them.
//!
//! # Locking
//!
//! Every method except the lock primitives, `write_stderr` and `exit`
//! requires the calling thread to hold the host's global execution lock.

use std::sync::Arc;

use crate::error::{BuiltinError, HostResult};
use crate::value::HostRef;

/// Callable implemented natively and exposed to host code.
///
/// Receives borrowed arguments and returns a new reference.
pub type HostFunction =
    Arc<dyn Fn(&dyn HostRuntime, &[HostRef]) -> HostResult<HostRef> + Send + Sync>;

/// Thread state saved by [`HostRuntime::save_thread`].
///
/// Must be handed back to [`HostRuntime::restore_thread`] on the same thread.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a saved thread state must be restored"]
pub struct SavedThread(u64);

impl SavedThread {
    /// Wrap a host-defined thread state id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Host-defined thread state id
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// What [`HostRuntime::ensure_thread`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// The lock was taken by this call and must be released
    Acquired,
    /// The calling thread already held the lock
    AlreadyHeld,
}

/// Abstract host runtime.
pub trait HostRuntime: Send + Sync {
    // ========================================================================
    // Reference Counting
    // ========================================================================

    /// Add one reference
    fn incref(&self, obj: HostRef);

    /// Drop one reference, freeing the object when none remain
    fn decref(&self, obj: HostRef);

    /// Current reference count (diagnostics only)
    fn ref_count(&self, obj: HostRef) -> usize;

    // ========================================================================
    // Singletons
    // ========================================================================

    /// The host's null object (borrowed)
    fn none(&self) -> HostRef;

    /// A builtin exception class (borrowed)
    fn builtin_error_type(&self, kind: BuiltinError) -> HostRef;

    // ========================================================================
    // Value Creation (new references)
    // ========================================================================

    /// Allocate a string
    fn new_str(&self, s: &str) -> HostResult<HostRef>;

    /// Allocate an integer
    fn new_int(&self, value: i64) -> HostResult<HostRef>;

    /// Allocate an empty list
    fn new_list(&self) -> HostResult<HostRef>;

    /// Allocate an empty mapping
    fn new_dict(&self) -> HostResult<HostRef>;

    /// Instantiate a builtin exception with a message.
    ///
    /// Infallible: hosts fall back to a preallocated `MemoryError`.
    fn new_error(&self, kind: BuiltinError, message: &str) -> HostRef;

    /// Wrap a native callable
    fn new_function(&self, name: &str, func: HostFunction) -> HostResult<HostRef>;

    /// Create a class owned by `module` deriving from `bases`
    fn new_class(&self, module: &str, name: &str, bases: &[HostRef]) -> HostResult<HostRef>;

    /// Create an empty module object (not registered)
    fn new_module(&self, name: &str) -> HostResult<HostRef>;

    // ========================================================================
    // Type Predicates
    // ========================================================================

    /// Type of an object (borrowed)
    fn type_of(&self, obj: HostRef) -> HostRef;

    /// Is `obj` the null object
    fn is_none(&self, obj: HostRef) -> bool;

    /// Is `obj` a string
    fn is_str(&self, obj: HostRef) -> bool;

    /// Is `obj` an integer
    fn is_int(&self, obj: HostRef) -> bool;

    /// Is `obj` a list
    fn is_list(&self, obj: HostRef) -> bool;

    /// Is `obj` a mapping
    fn is_dict(&self, obj: HostRef) -> bool;

    /// Is `obj` a class
    fn is_class(&self, obj: HostRef) -> bool;

    // ========================================================================
    // Scalar Reads
    // ========================================================================

    /// Read string data (`TypeError` if not a string)
    fn str_value(&self, obj: HostRef) -> HostResult<String>;

    /// Read integer data (`TypeError` if not an integer)
    fn int_value(&self, obj: HostRef) -> HostResult<i64>;

    // ========================================================================
    // Containers
    // ========================================================================

    /// List length
    fn list_len(&self, list: HostRef) -> HostResult<usize>;

    /// List element (borrowed)
    fn list_get(&self, list: HostRef, index: usize) -> HostResult<HostRef>;

    /// Append to a list; the list takes its own reference to `item`
    fn list_append(&self, list: HostRef, item: HostRef) -> HostResult<()>;

    /// Snapshot of mapping entries (borrowed)
    fn dict_items(&self, dict: HostRef) -> HostResult<Vec<(HostRef, HostRef)>>;

    /// Insert or replace a mapping entry; the mapping takes its own references
    fn dict_set_item(&self, dict: HostRef, key: HostRef, value: HostRef) -> HostResult<()>;

    // ========================================================================
    // Attributes and Calls
    // ========================================================================

    /// Read an attribute (new reference, `AttributeError` if absent)
    fn get_attr(&self, obj: HostRef, name: &str) -> HostResult<HostRef>;

    /// Write an attribute
    fn set_attr(&self, obj: HostRef, name: &str, value: HostRef) -> HostResult<()>;

    /// Call an object; calling a class instantiates it (new reference)
    fn call(&self, callable: HostRef, args: &[HostRef]) -> HostResult<HostRef>;

    /// Call a method by name (new reference)
    fn call_method(&self, obj: HostRef, name: &str, args: &[HostRef]) -> HostResult<HostRef> {
        let method = self.get_attr(obj, name)?;
        let result = self.call(method, args);
        self.decref(method);
        result
    }

    /// Is-a test against a class
    fn is_instance(&self, obj: HostRef, class: HostRef) -> HostResult<bool>;

    /// Stringify (new reference to a string)
    fn to_str(&self, obj: HostRef) -> HostResult<HostRef>;

    // ========================================================================
    // Modules
    // ========================================================================

    /// Look up an already-imported module (borrowed)
    fn sys_modules_get(&self, name: &str) -> Option<HostRef>;

    /// Register a module as imported
    fn sys_modules_set(&self, name: &str, module: HostRef) -> HostResult<()>;

    /// Import a module by name, running its initialization if needed (new reference)
    fn import_module(&self, name: &str) -> HostResult<HostRef>;

    /// Read from a module's namespace without raising (borrowed)
    fn module_dict_get(&self, module: HostRef, name: &str) -> Option<HostRef>;

    // ========================================================================
    // Active Error
    // ========================================================================

    /// Take the active error of the calling thread, clearing it (new reference)
    fn err_fetch(&self) -> Option<HostRef>;

    /// Make `exc` the active error; steals the reference
    fn err_restore(&self, exc: HostRef);

    /// Is an error active on the calling thread
    fn err_occurred(&self) -> bool;

    // ========================================================================
    // Execution Lock (callable without holding the lock)
    // ========================================================================

    /// Does the calling thread hold the execution lock
    fn lock_held(&self) -> bool;

    /// Release the lock held by the calling thread
    fn save_thread(&self) -> SavedThread;

    /// Re-acquire the lock released by `save_thread`
    fn restore_thread(&self, saved: SavedThread);

    /// Make sure the calling thread holds the lock, registering it with the
    /// host if it has never run host code
    fn ensure_thread(&self) -> LockState;

    /// Undo one `ensure_thread`
    fn release_thread(&self, state: LockState);

    // ========================================================================
    // Process
    // ========================================================================

    /// Write to the host's diagnostic stream
    fn write_stderr(&self, text: &str);

    /// Terminate the process
    fn exit(&self, status: i32) -> !;
}
