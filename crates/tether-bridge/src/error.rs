//! Host exceptions as Rust errors

use std::fmt;

use tether_sdk::{BuiltinError, Raised};

use crate::handle::Handle;
use crate::lock::HostToken;

/// Result type for bridge operations that can raise in the host
pub type HostResult<'h, T> = Result<T, HostErr<'h>>;

/// An owned host exception instance.
///
/// Dropping it releases the instance, which is how an error is cleared.
/// [`HostErr::restore`] makes it the host's active error instead.
pub struct HostErr<'h> {
    instance: Handle<'h>,
}

impl<'h> HostErr<'h> {
    /// Adopt an exception raised by a raw host call
    pub fn adopt(py: HostToken<'h>, raised: Raised) -> Self {
        Self {
            instance: Handle::adopt(py, raised.0),
        }
    }

    /// Wrap an exception instance
    pub fn from_instance(instance: Handle<'h>) -> Self {
        Self { instance }
    }

    /// Instantiate a builtin exception
    pub fn new(py: HostToken<'h>, kind: BuiltinError, message: &str) -> Self {
        Self {
            instance: Handle::adopt(py, py.host().new_error(kind, message)),
        }
    }

    /// Take the active error, clearing it
    pub fn fetch(py: HostToken<'h>) -> Option<Self> {
        py.host()
            .err_fetch()
            .map(|obj| Self::from_instance(Handle::adopt(py, obj)))
    }

    /// The active error, left active
    pub fn peek(py: HostToken<'h>) -> Option<Self> {
        let err = Self::fetch(py)?;
        err.clone().restore();
        Some(err)
    }

    /// Make this the host's active error
    pub fn restore(self) {
        let py = self.instance.token();
        py.host().err_restore(self.instance.into_raw());
    }

    /// The exception instance
    pub fn instance(&self) -> &Handle<'h> {
        &self.instance
    }

    /// Take the exception instance
    pub fn into_instance(self) -> Handle<'h> {
        self.instance
    }

    /// Is this an instance of a builtin exception class
    pub fn is_instance_of(&self, kind: BuiltinError) -> bool {
        let py = self.instance.token();
        let class = Handle::from_borrowed(py, py.host().builtin_error_type(kind));
        self.instance.is_instance(&class).unwrap_or(false)
    }

    /// Display name of the exception's class
    pub fn type_name(&self) -> String {
        self.instance
            .get_type()
            .str()
            .unwrap_or_else(|_| "<unknown>".to_string())
    }

    /// Stringified exception
    pub fn message(&self) -> String {
        self.instance
            .str()
            .unwrap_or_else(|_| "<unprintable>".to_string())
    }
}

impl Clone for HostErr<'_> {
    fn clone(&self) -> Self {
        Self {
            instance: self.instance.clone(),
        }
    }
}

impl fmt::Debug for HostErr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HostErr").field(&self.instance).finish()
    }
}

impl fmt::Display for HostErr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message();
        if message.is_empty() {
            f.write_str(&self.type_name())
        } else {
            write!(f, "{}: {}", self.type_name(), message)
        }
    }
}

/// Lift raw host results into bridge results
pub trait RaisedExt<T> {
    /// Adopt the raised exception, if any
    fn adopt_err<'h>(self, py: HostToken<'h>) -> HostResult<'h, T>;
}

impl<T> RaisedExt<T> for Result<T, Raised> {
    fn adopt_err<'h>(self, py: HostToken<'h>) -> HostResult<'h, T> {
        self.map_err(|raised| HostErr::adopt(py, raised))
    }
}

/// Shorthand for a `ValueError`
pub(crate) fn value_error<'h>(py: HostToken<'h>, message: &str) -> HostErr<'h> {
    HostErr::new(py, BuiltinError::ValueError, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::AcquireLock;
    use tether_host::EmbeddedHost;
    use tether_sdk::HostRuntime;

    #[test]
    fn test_fetch_clears_and_peek_keeps() {
        let host = EmbeddedHost::new();
        let guard = AcquireLock::new(&host);
        let py = guard.token();

        assert!(HostErr::fetch(py).is_none());
        value_error(py, "bad").restore();
        assert!(host.err_occurred());

        let peeked = HostErr::peek(py).unwrap();
        assert!(host.err_occurred());
        assert_eq!(peeked.message(), "bad");

        let fetched = HostErr::fetch(py).unwrap();
        assert!(!host.err_occurred());
        assert_eq!(fetched.instance(), peeked.instance());
    }

    #[test]
    fn test_display_and_kind() {
        let host = EmbeddedHost::new();
        let guard = AcquireLock::new(&host);
        let py = guard.token();

        let err = HostErr::new(py, BuiltinError::TypeError, "wrong kind");
        assert!(err.is_instance_of(BuiltinError::TypeError));
        assert!(err.is_instance_of(BuiltinError::Exception));
        assert!(!err.is_instance_of(BuiltinError::ValueError));
        assert_eq!(err.to_string(), "TypeError: wrong kind");
    }

    #[test]
    fn test_dropping_error_releases_instance() {
        let host = EmbeddedHost::new();
        let guard = AcquireLock::new(&host);
        let py = guard.token();
        let before = host.live_objects();

        let err = value_error(py, "released");
        assert_eq!(err.instance().ref_count(), 1);
        drop(err);
        assert_eq!(host.live_objects(), before);
    }
}
