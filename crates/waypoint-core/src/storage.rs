#![forbid(unsafe_code)]

//! Associating routes with displayable units.
//!
//! Element factories usually need to answer "which route does this unit
//! show?" later on, e.g. when a unit is recreated by the platform. A
//! [`RouteStorage`] records that association on the unit itself. The router
//! never uses it; factories and patchers do.
//!
//! [`ArgumentRouteStorage`] keeps the route inside a unit's [`Arguments`] bag
//! under a configurable key.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing route | Unit has no arguments, or nothing under the key | `get` returns `MissingRoute`, `get_or_none` returns `None` |
//! | Wrong type | A value of another type sits under the key | `get` returns `RouteTypeMismatch`, `get_or_none` returns `None` |

use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;

use ahash::AHashMap;

use crate::element::Route;
use crate::error::RouteStorageError;

/// Key used by [`ArgumentRouteStorage::new`].
pub const DEFAULT_ARGUMENT_KEY: &str = "Waypoint Route";

/// Records which route a displayable unit represents.
pub trait RouteStorage<U, R> {
    /// Associate `route` with `unit`, replacing any previous association.
    fn store(&self, unit: &mut U, route: R);

    /// The route associated with `unit`.
    ///
    /// # Errors
    ///
    /// A [`RouteStorageError`] describing why no route could be produced.
    fn get(&self, unit: &U) -> Result<R, RouteStorageError>;

    /// The route associated with `unit`, or `None`.
    fn get_or_none(&self, unit: &U) -> Option<R> {
        self.get(unit).ok()
    }
}

/// Heterogeneous key/value bag attached to a displayable unit.
#[derive(Default)]
pub struct Arguments {
    values: AHashMap<String, Box<dyn Any + Send + Sync>>,
}

impl Arguments {
    /// An empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key`, replacing any previous value.
    pub fn put<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// The value under `key` if it has type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.get_raw(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// The value under `key`, untyped.
    pub fn get_raw(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.values.get(key).map(|v| &**v)
    }

    /// Remove the value under `key`, returning whether one was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Whether anything is stored under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("Arguments").field("keys", &keys).finish()
    }
}

/// A displayable unit that can carry an [`Arguments`] bag.
pub trait HasArguments {
    /// The bag, or `None` if the unit was never given one.
    fn arguments(&self) -> Option<&Arguments>;

    /// The bag, creating an empty one if needed.
    fn arguments_mut(&mut self) -> &mut Arguments;
}

/// [`RouteStorage`] that keeps the route in the unit's [`Arguments`].
pub struct ArgumentRouteStorage<R> {
    key: String,
    _route: PhantomData<fn() -> R>,
}

impl<R> Default for ArgumentRouteStorage<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ArgumentRouteStorage<R> {
    /// Storage using [`DEFAULT_ARGUMENT_KEY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_key(DEFAULT_ARGUMENT_KEY)
    }

    /// Storage using a custom key.
    #[must_use]
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            _route: PhantomData,
        }
    }

    /// The arguments key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<R> Clone for ArgumentRouteStorage<R> {
    fn clone(&self) -> Self {
        Self::with_key(self.key.clone())
    }
}

impl<R> fmt::Debug for ArgumentRouteStorage<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentRouteStorage")
            .field("key", &self.key)
            .finish()
    }
}

impl<U, R> RouteStorage<U, R> for ArgumentRouteStorage<R>
where
    U: HasArguments,
    R: Route + Send + Sync + 'static,
{
    fn store(&self, unit: &mut U, route: R) {
        unit.arguments_mut().put(self.key.clone(), route);
    }

    fn get(&self, unit: &U) -> Result<R, RouteStorageError> {
        let raw = unit
            .arguments()
            .and_then(|args| args.get_raw(&self.key))
            .ok_or_else(|| RouteStorageError::MissingRoute {
                key: self.key.clone(),
            })?;
        raw.downcast_ref::<R>()
            .cloned()
            .ok_or_else(|| RouteStorageError::RouteTypeMismatch {
                key: self.key.clone(),
                expected: type_name::<R>(),
            })
    }
}
