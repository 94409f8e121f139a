#![forbid(unsafe_code)]

//! Error types for the router and route storage.
//!
//! Structural stack operations never fail; see [`crate::stack`]. The errors
//! here report programming mistakes (illegal transitions, wrong execution
//! context) and missing route associations on displayable units.

use std::thread::ThreadId;

/// Programming errors reported by [`Router`](crate::Router).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// `attach` was called while a container is already attached.
    #[error("router is already attached to a container")]
    AlreadyAttached,
    /// Router state was touched from a thread other than its owner.
    #[error("router state accessed from thread {caller:?}, but it is owned by thread {owner:?}")]
    WrongContext {
        /// Thread designated at construction.
        owner: ThreadId,
        /// Thread that attempted the access.
        caller: ThreadId,
    },
}

/// Lookup failures from a [`RouteStorage`](crate::storage::RouteStorage).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteStorageError {
    /// The unit carries no route under the storage key.
    #[error("expected route with key {key:?}")]
    MissingRoute {
        /// Storage key that was queried.
        key: String,
    },
    /// A value exists under the key but is not of the requested route type.
    #[error("value stored under key {key:?} is not a {expected}")]
    RouteTypeMismatch {
        /// Storage key that was queried.
        key: String,
        /// Name of the requested route type.
        expected: &'static str,
    },
}
