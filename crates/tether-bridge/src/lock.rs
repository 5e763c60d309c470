//! Execution-lock capability and scoped lock adaptors
//!
//! Every host-touching operation takes a [`HostToken`], which can only be
//! obtained while the calling thread holds the host's execution lock. The
//! token is `Copy` but neither `Send` nor `Sync`, so it cannot leave the
//! thread that proved the lock is held.
//!
//! The two adaptors restore the previous lock state on every exit path,
//! unwinding included:
//! - [`HostToken::allow_threads`] gives the lock up for the duration of a
//!   blocking native operation and takes it back before returning.
//! - [`AcquireLock`] takes the lock on a thread that may never have run host
//!   code, and hands it back on drop.
//!
//! No token is reachable while the lock is given up: the released scope is a
//! `Send` closure, and tokens and handles are not `Send`.

use std::marker::PhantomData;

use tether_sdk::{HostRuntime, LockState, SavedThread};

/// Proof that the calling thread holds the host execution lock.
#[derive(Clone, Copy)]
pub struct HostToken<'h> {
    host: &'h dyn HostRuntime,
    _not_send: PhantomData<*const ()>,
}

impl<'h> HostToken<'h> {
    fn assume(host: &'h dyn HostRuntime) -> Self {
        Self {
            host,
            _not_send: PhantomData,
        }
    }

    /// The host runtime
    #[inline]
    pub fn host(self) -> &'h dyn HostRuntime {
        self.host
    }

    /// Run `f` with the lock released.
    ///
    /// `f` must be `Send`, which keeps tokens and handles out of it: host
    /// objects cannot be touched while another thread may own the lock.
    ///
    /// ```compile_fail
    /// use tether_bridge::{AcquireLock, Handle};
    /// use tether_host::EmbeddedHost;
    ///
    /// let host = EmbeddedHost::new();
    /// let guard = AcquireLock::new(&host);
    /// let py = guard.token();
    /// py.allow_threads(|| Handle::new_str(py, "no lock held").is_ok());
    /// ```
    pub fn allow_threads<T, F>(self, f: F) -> T
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        let _released = ReleaseLock::new(self);
        f()
    }
}

impl std::fmt::Debug for HostToken<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HostToken")
    }
}

/// Releases the execution lock until dropped. Only built by
/// [`HostToken::allow_threads`].
#[must_use = "the lock is re-acquired as soon as the guard is dropped"]
pub(crate) struct ReleaseLock<'h> {
    host: &'h dyn HostRuntime,
    saved: Option<SavedThread>,
    _not_send: PhantomData<*const ()>,
}

impl<'h> ReleaseLock<'h> {
    fn new(py: HostToken<'h>) -> Self {
        let host = py.host();
        log::trace!("releasing host execution lock");
        Self {
            host,
            saved: Some(host.save_thread()),
            _not_send: PhantomData,
        }
    }
}

impl Drop for ReleaseLock<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.host.restore_thread(saved);
            log::trace!("restored host execution lock");
        }
    }
}

/// Holds the execution lock until dropped.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct AcquireLock<'h> {
    host: &'h dyn HostRuntime,
    state: LockState,
    _not_send: PhantomData<*const ()>,
}

impl<'h> AcquireLock<'h> {
    /// Take the lock on the calling thread, affiliating the thread with the
    /// host if it has never run host code
    pub fn new(host: &'h dyn HostRuntime) -> Self {
        let state = host.ensure_thread();
        log::trace!("acquired host execution lock ({:?})", state);
        Self {
            host,
            state,
            _not_send: PhantomData,
        }
    }

    /// Token valid while the guard is alive
    pub fn token(&self) -> HostToken<'_> {
        HostToken::assume(self.host)
    }

    /// Whether this guard took the lock or found it already held
    pub fn state(&self) -> LockState {
        self.state
    }
}

impl Drop for AcquireLock<'_> {
    fn drop(&mut self) {
        self.host.release_thread(self.state);
        log::trace!("released host execution lock ({:?})", self.state);
    }
}
