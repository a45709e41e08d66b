//! Process-wide bookkeeping of live threads.
//!
//! A [`ThreadRegistry`] keeps every thread that recorded itself at launch,
//! until it dies, and the number of application threads still alive. Thread states
//! and that counter are only ever changed together, under one private lock,
//! so an observer can never see a `DIED` thread that is still counted (or the
//! reverse). The lock is never handed out; callers go through accessors that
//! bundle the reads and writes they need.
//!
//! One registry is installed for the whole process between [`initialize`] and
//! [`shutdown`]. Threads hold an `Arc` to the registry they were built with,
//! which lets tests run against private instances.

use std::sync::Arc;
use std::time::{Duration, Instant};

use core_types::{VmError, VmResult};
use parking_lot::{Condvar, Mutex, RwLock};

use crate::fatal;
use crate::thread::ThreadHandle;
use crate::thread_state::ThreadState;

static GLOBAL: RwLock<Option<Arc<ThreadRegistry>>> = parking_lot::const_rwlock(None);

/// Install a fresh process-wide registry (VM startup).
pub fn initialize() -> VmResult<Arc<ThreadRegistry>> {
    let mut slot = GLOBAL.write();
    if slot.is_some() {
        return Err(VmError::RegistryAlreadyInitialized);
    }
    let registry = Arc::new(ThreadRegistry::new());
    *slot = Some(Arc::clone(&registry));
    tracing::debug!("thread registry initialized");
    Ok(registry)
}

/// The process-wide registry.
pub fn global() -> VmResult<Arc<ThreadRegistry>> {
    GLOBAL.read().clone().ok_or(VmError::RegistryNotInitialized)
}

/// Remove the process-wide registry (VM shutdown) and return it.
///
/// Threads still running keep their own `Arc` and can finish normally.
pub fn shutdown() -> VmResult<Arc<ThreadRegistry>> {
    let registry = GLOBAL
        .write()
        .take()
        .ok_or(VmError::RegistryNotInitialized)?;
    tracing::debug!(
        app_threads = registry.app_thread_count(),
        "thread registry shut down"
    );
    Ok(registry)
}

/// Consistent view of the registry taken under its lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySnapshot {
    /// Live application threads
    pub app_thread_count: usize,
    /// `(thread id, state)` for every recorded thread that has not died, in
    /// registration order
    pub states: Vec<(u64, ThreadState)>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    threads: Vec<ThreadHandle>,
    app_thread_count: usize,
    recorded_total: usize,
}

/// Registry of live recorded threads and the application-thread counter.
///
/// A thread leaves the table when it dies, so the table never holds more
/// than the threads currently running.
#[derive(Debug, Default)]
pub struct ThreadRegistry {
    inner: Mutex<RegistryInner>,
    app_threads_done: Condvar,
}

impl ThreadRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a launched thread and count it as a live application thread.
    pub fn add(&self, thread: ThreadHandle) {
        let mut inner = self.inner.lock();
        inner.app_thread_count += 1;
        inner.recorded_total += 1;
        tracing::debug!(
            thread = thread.id(),
            app_threads = inner.app_thread_count,
            "thread recorded"
        );
        inner.threads.push(thread);
    }

    /// Mark `thread` as died and, if it was recorded, drop it from the table
    /// and stop counting it.
    ///
    /// All of this happens in one critical section. Retiring a thread twice,
    /// or decrementing a counter that is already zero, is a fatal invariant
    /// violation.
    pub(crate) fn retire(&self, thread: &ThreadHandle) {
        let mut inner = self.inner.lock();
        if thread.state().is_terminal() {
            fatal::invariant_violation("thread retired twice");
        }
        thread.store_state(ThreadState::Died);

        let position = inner.threads.iter().position(|t| t.id() == thread.id());
        let recorded = position.is_some();
        if let Some(index) = position {
            inner.threads.remove(index);
            if inner.app_thread_count == 0 {
                fatal::invariant_violation("app thread count decremented below zero");
            }
            inner.app_thread_count -= 1;
            if inner.app_thread_count == 0 {
                self.app_threads_done.notify_all();
            }
        }
        tracing::debug!(
            thread = thread.id(),
            recorded,
            app_threads = inner.app_thread_count,
            "thread died"
        );
    }

    /// Move a live thread to another non-terminal state.
    ///
    /// Threads reach `DIED` only through their own body.
    pub fn transition(&self, thread: &ThreadHandle, next: ThreadState) -> VmResult<()> {
        let _inner = self.inner.lock();
        let current = thread.state();
        if next.is_terminal() || !current.can_transition_to(next) {
            return Err(VmError::IllegalStateTransition {
                from: current.name(),
                to: next.name(),
            });
        }
        thread.store_state(next);
        tracing::trace!(thread = thread.id(), from = %current, to = %next, "state change");
        Ok(())
    }

    /// State of `thread`, read under the registry lock
    pub fn state_of(&self, thread: &ThreadHandle) -> ThreadState {
        let _inner = self.inner.lock();
        thread.state()
    }

    /// Number of application threads that have not died
    pub fn app_thread_count(&self) -> usize {
        self.inner.lock().app_thread_count
    }

    /// Number of threads ever recorded
    pub fn thread_count(&self) -> usize {
        self.inner.lock().recorded_total
    }

    /// Recorded threads that have not died
    pub fn live_threads(&self) -> Vec<ThreadHandle> {
        self.inner.lock().threads.clone()
    }

    /// Counter and every recorded thread's state, read together
    pub fn snapshot(&self) -> RegistrySnapshot {
        let inner = self.inner.lock();
        RegistrySnapshot {
            app_thread_count: inner.app_thread_count,
            states: inner.threads.iter().map(|t| (t.id(), t.state())).collect(),
        }
    }

    /// Block until no application thread is alive.
    pub fn wait_for_app_threads(&self) {
        let mut inner = self.inner.lock();
        while inner.app_thread_count != 0 {
            self.app_threads_done.wait(&mut inner);
        }
    }

    /// Like [`wait_for_app_threads`](Self::wait_for_app_threads), giving up
    /// after `timeout`. Returns whether the count reached zero.
    pub fn wait_for_app_threads_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        while inner.app_thread_count != 0 {
            if self
                .app_threads_done
                .wait_until(&mut inner, deadline)
                .timed_out()
            {
                return inner.app_thread_count == 0;
            }
        }
        true
    }
}
