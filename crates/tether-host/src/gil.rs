//! Global execution lock with thread-affiliation bookkeeping
//!
//! One thread at a time may run host code. Threads that first reach the host
//! through [`Gil::ensure`] are *ephemeral*: their affiliation record is
//! dropped when the outermost ensure is released. The thread that created
//! the host is *persistent*.

use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;
use tether_sdk::{LockState, SavedThread};

#[derive(Debug)]
struct ThreadRecord {
    ephemeral: bool,
    ensure_depth: usize,
}

#[derive(Debug, Default)]
struct GilState {
    owner: Option<ThreadId>,
    threads: FxHashMap<ThreadId, ThreadRecord>,
    saved: FxHashMap<u64, ThreadId>,
    next_saved: u64,
}

/// The execution lock
pub struct Gil {
    state: Mutex<GilState>,
    released: Condvar,
}

impl Gil {
    /// Create the lock, affiliating the calling thread permanently
    pub fn new() -> Self {
        let mut state = GilState::default();
        state.threads.insert(
            thread::current().id(),
            ThreadRecord {
                ephemeral: false,
                ensure_depth: 0,
            },
        );
        Self {
            state: Mutex::new(state),
            released: Condvar::new(),
        }
    }

    /// Does the calling thread hold the lock
    pub fn held_by_current(&self) -> bool {
        self.state.lock().owner == Some(thread::current().id())
    }

    /// Number of threads currently affiliated with the host
    pub fn known_threads(&self) -> usize {
        self.state.lock().threads.len()
    }

    /// Release the lock held by the calling thread.
    ///
    /// # Panics
    /// Panics if the calling thread does not hold the lock.
    pub fn save(&self) -> SavedThread {
        let me = thread::current().id();
        let mut state = self.state.lock();
        if state.owner != Some(me) {
            panic!("save_thread called without holding the execution lock");
        }
        state.owner = None;
        state.next_saved += 1;
        let id = state.next_saved;
        state.saved.insert(id, me);
        drop(state);
        self.released.notify_one();
        log::trace!("thread {:?} released the execution lock", me);
        SavedThread::new(id)
    }

    /// Re-acquire after [`Gil::save`].
    ///
    /// # Panics
    /// Panics if `saved` was produced on another thread.
    pub fn restore(&self, saved: SavedThread) {
        let me = thread::current().id();
        let mut state = self.state.lock();
        match state.saved.remove(&saved.id()) {
            Some(owner) if owner == me => {}
            _ => panic!("restore_thread with a thread state saved by another thread"),
        }
        while state.owner.is_some() {
            self.released.wait(&mut state);
        }
        state.owner = Some(me);
        log::trace!("thread {:?} restored the execution lock", me);
    }

    /// Make sure the calling thread holds the lock
    pub fn ensure(&self) -> LockState {
        let me = thread::current().id();
        let mut state = self.state.lock();
        let record = state.threads.entry(me).or_insert_with(|| ThreadRecord {
            ephemeral: true,
            ensure_depth: 0,
        });
        record.ensure_depth += 1;

        if state.owner == Some(me) {
            return LockState::AlreadyHeld;
        }
        while state.owner.is_some() {
            self.released.wait(&mut state);
        }
        state.owner = Some(me);
        log::trace!("thread {:?} acquired the execution lock", me);
        LockState::Acquired
    }

    /// Undo one [`Gil::ensure`]
    pub fn release(&self, lock_state: LockState) {
        let me = thread::current().id();
        let mut state = self.state.lock();

        let forget = match state.threads.get_mut(&me) {
            Some(record) => {
                record.ensure_depth = record.ensure_depth.saturating_sub(1);
                record.ephemeral && record.ensure_depth == 0
            }
            None => false,
        };
        if forget {
            state.threads.remove(&me);
        }

        if lock_state == LockState::Acquired {
            if state.owner != Some(me) {
                panic!("release_thread called without holding the execution lock");
            }
            state.owner = None;
            drop(state);
            self.released.notify_one();
            log::trace!("thread {:?} released the execution lock", me);
        }
    }
}

impl Default for Gil {
    fn default() -> Self {
        Self::new()
    }
}
