#![forbid(unsafe_code)]

//! Immutable routing stack and its mutation algebra.
//!
//! A [`RoutingStack`] is an ordered sequence of [`Element`]s, bottom to top.
//! Every mutation returns a new stack and leaves the receiver untouched. The
//! elements live in a persistent vector, so derived stacks share structure
//! with their source and cloning a stack is cheap.
//!
//! # Invariants
//!
//! - The top of the stack is the last element (most recently pushed).
//! - `push` of a route always appends a fresh element.
//! - `push_element` of an element already present (by identity) moves it to
//!   the top. Size is unchanged and the relative order of the rest is kept.
//! - The receiver of any operation is never modified.
//!
//! # Failure Modes
//!
//! None. All operations are total:
//!
//! - `pop()` on an empty stack returns an empty stack.
//! - `pop_until()` with no matching route returns an empty stack.
//!
//! # Example
//!
//! ```
//! use waypoint_core::RoutingStack;
//!
//! let stack = RoutingStack::from(["home", "list", "detail", "list", "detail"]);
//! let back = stack.pop_until_route(&"list");
//! assert_eq!(back.to_routes(), vec!["home", "list", "detail", "list"]);
//! assert_eq!(stack.len(), 5);
//! ```

use std::fmt;

use im::Vector;

use crate::element::{Element, ElementId, Route};

/// Immutable ordered stack of route-bearing elements.
#[derive(Clone, PartialEq, Eq)]
pub struct RoutingStack<R: Route> {
    /// Elements bottom to top.
    elements: Vector<Element<R>>,
}

impl<R: Route> Default for RoutingStack<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R: Route> RoutingStack<R> {
    /// A stack with no elements.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            elements: Vector::new(),
        }
    }

    /// Build a stack by pushing each route in order; the first route ends up
    /// at the bottom.
    #[must_use]
    pub fn from_routes<I: IntoIterator<Item = R>>(routes: I) -> Self {
        Self {
            elements: routes.into_iter().map(Element::new).collect(),
        }
    }

    /// Build a stack from existing elements, bottom to top.
    ///
    /// Later duplicates of an identity win, matching repeated
    /// [`push_element`](Self::push_element) calls.
    #[must_use]
    pub fn from_elements<I: IntoIterator<Item = Element<R>>>(elements: I) -> Self {
        elements
            .into_iter()
            .fold(Self::empty(), |stack, element| stack.push_element(element))
    }

    // --- Mutation Algebra ---

    /// Append a fresh element wrapping `route`. Always grows by one.
    #[must_use]
    pub fn push(&self, route: R) -> Self {
        let mut elements = self.elements.clone();
        elements.push_back(Element::new(route));
        Self { elements }
    }

    /// Push an existing element.
    ///
    /// If an element with the same identity is already in the stack it is
    /// moved to the top instead of being duplicated.
    #[must_use]
    pub fn push_element(&self, element: Element<R>) -> Self {
        let mut elements = self.elements.clone();
        if let Some(index) = elements.iter().position(|e| e.id() == element.id()) {
            elements.remove(index);
        }
        elements.push_back(element);
        Self { elements }
    }

    /// Push several routes in order.
    #[must_use]
    pub fn push_all<I: IntoIterator<Item = R>>(&self, routes: I) -> Self {
        let mut elements = self.elements.clone();
        elements.extend(routes.into_iter().map(Element::new));
        Self { elements }
    }

    /// Remove the top element. No-op on an empty stack.
    #[must_use]
    pub fn pop(&self) -> Self {
        let mut elements = self.elements.clone();
        elements.pop_back();
        Self { elements }
    }

    /// Pop until the top route satisfies `predicate`.
    ///
    /// The predicate is checked against the current top first, then against
    /// each new top after a pop. Yields the empty stack when nothing matches.
    #[must_use]
    pub fn pop_until<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&R) -> bool,
    {
        let mut elements = self.elements.clone();
        loop {
            match elements.back() {
                Some(top) if !predicate(top.route()) => {}
                _ => break,
            }
            elements.pop_back();
        }
        Self { elements }
    }

    /// Pop until the top route equals `route`.
    #[must_use]
    pub fn pop_until_route(&self, route: &R) -> Self {
        self.pop_until(|top| top == route)
    }

    /// Replace the top route with `route`. On an empty stack this is a push.
    #[must_use]
    pub fn replace_top(&self, route: R) -> Self {
        self.pop().push(route)
    }

    /// The empty stack.
    #[must_use]
    pub fn clear(&self) -> Self {
        Self::empty()
    }

    /// Apply an arbitrary instruction, for fluent composition.
    #[must_use]
    pub fn with<F>(&self, instruction: F) -> Self
    where
        F: FnOnce(&Self) -> Self,
    {
        instruction(self)
    }

    // --- Queries ---

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the stack has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The top element, if any.
    pub fn top(&self) -> Option<&Element<R>> {
        self.elements.back()
    }

    /// The top route, if any.
    pub fn top_route(&self) -> Option<&R> {
        self.top().map(Element::route)
    }

    /// Element at `index`, counting from the bottom.
    pub fn get(&self, index: usize) -> Option<&Element<R>> {
        self.elements.get(index)
    }

    /// Elements bottom to top.
    pub fn elements(&self) -> impl DoubleEndedIterator<Item = &Element<R>> + '_ {
        self.elements.iter()
    }

    /// Routes bottom to top.
    pub fn routes(&self) -> impl DoubleEndedIterator<Item = &R> + '_ {
        self.elements.iter().map(Element::route)
    }

    /// Element identities bottom to top.
    pub fn ids(&self) -> impl DoubleEndedIterator<Item = ElementId> + '_ {
        self.elements.iter().map(Element::id)
    }

    /// Routes bottom to top, cloned into a `Vec`.
    pub fn to_routes(&self) -> Vec<R> {
        self.routes().cloned().collect()
    }

    /// Whether an element with identity `id` is in the stack.
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.iter().any(|e| e.id() == id)
    }

    /// Index (from the bottom) of the element with identity `id`.
    pub fn position(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == id)
    }

    /// The element with identity `id`.
    pub fn element(&self, id: ElementId) -> Option<&Element<R>> {
        self.elements.iter().find(|e| e.id() == id)
    }

    /// Whether both stacks hold equal routes in the same order, ignoring
    /// element identity.
    pub fn same_routes(&self, other: &Self) -> bool {
        self.len() == other.len() && self.routes().eq(other.routes())
    }
}

impl<R: Route> FromIterator<R> for RoutingStack<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self::from_routes(iter)
    }
}

impl<R: Route, const N: usize> From<[R; N]> for RoutingStack<R> {
    fn from(routes: [R; N]) -> Self {
        Self::from_routes(routes)
    }
}

impl<R: Route> From<Vec<R>> for RoutingStack<R> {
    fn from(routes: Vec<R>) -> Self {
        Self::from_routes(routes)
    }
}

impl<R: Route> fmt::Debug for RoutingStack<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.elements.iter()).finish()
    }
}
