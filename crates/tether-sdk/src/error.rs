//! Error signalling across the host ABI

use crate::value::HostRef;

/// Result type for host ABI calls
pub type HostResult<T> = Result<T, Raised>;

/// A host exception instance raised by a failing ABI call.
///
/// Carries a *new* reference to the exception instance. The receiver owns it
/// and must either release it, adopt it into an owning wrapper, or hand it
/// back to the host with `HostRuntime::err_restore`.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a raised host exception owns a reference that must be released or restored"]
pub struct Raised(pub HostRef);

impl Raised {
    /// The exception instance
    pub fn instance(&self) -> HostRef {
        self.0
    }
}

/// Builtin host exception classes the bridge needs by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinError {
    /// Root of the host exception hierarchy
    BaseException,
    /// Root of ordinary (non-exit) exceptions
    Exception,
    /// Wrong value kind
    TypeError,
    /// Right kind, invalid content
    ValueError,
    /// Missing attribute
    AttributeError,
    /// Module could not be imported
    ImportError,
    /// Allocation failure
    MemoryError,
    /// Generic runtime failure
    RuntimeError,
    /// Request to terminate the process
    SystemExit,
}

impl BuiltinError {
    /// Every builtin error kind, parents before children
    pub const ALL: [BuiltinError; 9] = [
        BuiltinError::BaseException,
        BuiltinError::Exception,
        BuiltinError::TypeError,
        BuiltinError::ValueError,
        BuiltinError::AttributeError,
        BuiltinError::ImportError,
        BuiltinError::MemoryError,
        BuiltinError::RuntimeError,
        BuiltinError::SystemExit,
    ];

    /// Class name in the host's builtin namespace
    pub const fn name(self) -> &'static str {
        match self {
            BuiltinError::BaseException => "BaseException",
            BuiltinError::Exception => "Exception",
            BuiltinError::TypeError => "TypeError",
            BuiltinError::ValueError => "ValueError",
            BuiltinError::AttributeError => "AttributeError",
            BuiltinError::ImportError => "ImportError",
            BuiltinError::MemoryError => "MemoryError",
            BuiltinError::RuntimeError => "RuntimeError",
            BuiltinError::SystemExit => "SystemExit",
        }
    }

    /// Direct parent in the builtin hierarchy
    pub const fn parent(self) -> Option<BuiltinError> {
        match self {
            BuiltinError::BaseException => None,
            BuiltinError::Exception | BuiltinError::SystemExit => {
                Some(BuiltinError::BaseException)
            }
            _ => Some(BuiltinError::Exception),
        }
    }
}

impl std::fmt::Display for BuiltinError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parents_precede_children() {
        for (i, kind) in BuiltinError::ALL.iter().enumerate() {
            if let Some(parent) = kind.parent() {
                let pos = BuiltinError::ALL.iter().position(|k| *k == parent).unwrap();
                assert!(pos < i, "{} listed before its parent", kind);
            }
        }
    }

    #[test]
    fn test_system_exit_bypasses_exception() {
        assert_eq!(
            BuiltinError::SystemExit.parent(),
            Some(BuiltinError::BaseException)
        );
        assert_eq!(BuiltinError::ValueError.parent(), Some(BuiltinError::Exception));
    }
}
