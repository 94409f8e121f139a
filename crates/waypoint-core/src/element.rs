#![forbid(unsafe_code)]

//! Routes and the elements that carry them through a [`RoutingStack`].
//!
//! A route is any application value naming a destination. An [`Element`]
//! wraps one route together with an [`ElementId`], giving it an identity that
//! is independent of route equality: pushing the same route twice yields two
//! distinct elements.
//!
//! # Invariants
//!
//! - `ElementId`s are allocated from a process-wide monotonic counter and are
//!   never reused, so two live elements never share an id.
//! - Element equality and hashing are by id only. The wrapped route does not
//!   participate.
//!
//! [`RoutingStack`]: crate::RoutingStack

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for unique element IDs.
static ELEMENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// An application-defined destination.
///
/// Routes only need structural equality (for [`pop_until_route`]) plus
/// `Clone` and `Debug`. Every such type is a route.
///
/// [`pop_until_route`]: crate::RoutingStack::pop_until_route
pub trait Route: Clone + PartialEq + fmt::Debug {}

impl<T: Clone + PartialEq + fmt::Debug> Route for T {}

/// Stable identity of an [`Element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u64);

impl ElementId {
    fn next() -> Self {
        Self(ELEMENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A route paired with a stable identity.
#[derive(Clone)]
pub struct Element<R> {
    id: ElementId,
    route: R,
}

impl<R: Route> Element<R> {
    /// Wrap `route` in a fresh element with a new identity.
    #[must_use]
    pub fn new(route: R) -> Self {
        Self {
            id: ElementId::next(),
            route,
        }
    }

    /// The element's identity.
    #[inline]
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// The wrapped route.
    #[inline]
    pub fn route(&self) -> &R {
        &self.route
    }

    /// Unwrap the route, discarding the identity.
    pub fn into_route(self) -> R {
        self.route
    }
}

impl<R> PartialEq for Element<R> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<R> Eq for Element<R> {}

impl<R> Hash for Element<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<R: fmt::Debug> fmt::Debug for Element<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("route", &self.route)
            .finish()
    }
}
