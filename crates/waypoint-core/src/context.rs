#![forbid(unsafe_code)]

//! Execution-context affinity for router state.
//!
//! All router state must be read and written from one designated thread
//! (typically the UI event loop). Instead of locking, the router carries an
//! [`ExecutionContext`] token and checks it on every access.
//!
//! # Failure Modes
//!
//! - Access from any other thread yields [`RouterError::WrongContext`].

use std::thread::{self, Thread, ThreadId};

use crate::error::RouterError;

/// Token naming the thread that owns a router's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExecutionContext {
    owner: ThreadId,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::current()
    }
}

impl ExecutionContext {
    /// Bind to the calling thread.
    #[must_use]
    pub fn current() -> Self {
        Self {
            owner: thread::current().id(),
        }
    }

    /// Bind to another thread, e.g. a UI thread spawned before the router
    /// is built.
    #[must_use]
    pub fn for_thread(thread: &Thread) -> Self {
        Self { owner: thread.id() }
    }

    /// The owning thread.
    #[inline]
    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    /// Whether the calling thread is the owner.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Fail unless called from the owning thread.
    pub fn ensure(&self) -> Result<(), RouterError> {
        let caller = thread::current().id();
        if caller == self.owner {
            Ok(())
        } else {
            Err(RouterError::WrongContext {
                owner: self.owner,
                caller,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_thread_passes() {
        let ctx = ExecutionContext::current();
        assert!(ctx.is_current());
        assert_eq!(ctx.ensure(), Ok(()));
    }

    #[test]
    fn foreign_thread_fails_every_time() {
        let ctx = ExecutionContext::current();
        let owner = ctx.owner();
        let results = thread::spawn(move || (ctx.ensure(), ctx.ensure(), ctx.is_current()))
            .join()
            .expect("worker thread panicked");

        for result in [results.0, results.1] {
            match result {
                Err(RouterError::WrongContext { owner: o, caller }) => {
                    assert_eq!(o, owner);
                    assert_ne!(caller, owner);
                }
                other => panic!("expected WrongContext, got {other:?}"),
            }
        }
        assert!(!results.2);
    }

    #[test]
    fn for_thread_designates_other_owner() {
        let worker = thread::spawn(|| thread::current());
        let worker_thread = worker.join().expect("worker thread panicked");
        let ctx = ExecutionContext::for_thread(&worker_thread);
        assert_eq!(ctx.owner(), worker_thread.id());
        assert!(!ctx.is_current());
        assert!(ctx.ensure().is_err());
    }
}
