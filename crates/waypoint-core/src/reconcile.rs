#![forbid(unsafe_code)]

//! Reconciliation contracts: turning an abstract [`RoutingStack`] into a
//! concrete one and handing both sides to a presentation patcher.
//!
//! Two collaborators sit behind traits:
//!
//! - [`ElementFactory`] builds one displayable unit per element.
//! - [`StackPatcher`] receives the old and new [`ConcreteStack`] and updates
//!   the presentation surface (attach, detach, reorder, animate).
//!
//! Both traits are implemented for closures of the matching shape.
//!
//! # Invariants
//!
//! - Units are keyed by [`ElementId`]. An element already materialized in the
//!   previous concrete stack reuses its unit; the factory is called exactly
//!   once per new identity.
//! - A concrete stack lists units in the same order as its abstract stack.

use ahash::AHashMap;

use crate::config::TransitionConfig;
use crate::element::{Element, ElementId, Route};
use crate::stack::RoutingStack;

/// Builds the displayable unit for an element.
pub trait ElementFactory<R: Route, C> {
    /// Displayable unit produced for each element. Cloned when reused across
    /// reconciliations, so this is usually a cheap handle.
    type Unit: Clone;

    /// Create the unit for `element` inside `container`.
    fn create(&mut self, element: &Element<R>, container: &C) -> Self::Unit;
}

impl<R, C, U, F> ElementFactory<R, C> for F
where
    R: Route,
    U: Clone,
    F: FnMut(&Element<R>, &C) -> U,
{
    type Unit = U;

    fn create(&mut self, element: &Element<R>, container: &C) -> U {
        self(element, container)
    }
}

/// Applies the difference between two concrete stacks to a container.
///
/// Contract: after `patch` returns, the container shows the top of `new`.
/// Any animation may still be running; the router does not wait for it.
pub trait StackPatcher<R: Route, C, U> {
    /// Update `container` from `old` to `new` using `transition`.
    fn patch(
        &mut self,
        transition: &TransitionConfig,
        container: &C,
        old: &ConcreteStack<R, U>,
        new: &ConcreteStack<R, U>,
    );
}

impl<R, C, U, F> StackPatcher<R, C, U> for F
where
    R: Route,
    F: FnMut(&TransitionConfig, &C, &ConcreteStack<R, U>, &ConcreteStack<R, U>),
{
    fn patch(
        &mut self,
        transition: &TransitionConfig,
        container: &C,
        old: &ConcreteStack<R, U>,
        new: &ConcreteStack<R, U>,
    ) {
        self(transition, container, old, new)
    }
}

/// An element together with its materialized unit.
#[derive(Debug, Clone)]
pub struct ConcreteElement<R: Route, U> {
    element: Element<R>,
    unit: U,
}

impl<R: Route, U> ConcreteElement<R, U> {
    /// The abstract element.
    pub fn element(&self) -> &Element<R> {
        &self.element
    }

    /// The element identity.
    pub fn id(&self) -> ElementId {
        self.element.id()
    }

    /// The element's route.
    pub fn route(&self) -> &R {
        self.element.route()
    }

    /// The displayable unit.
    pub fn unit(&self) -> &U {
        &self.unit
    }
}

/// Materialized counterpart of a [`RoutingStack`], bottom to top.
#[derive(Debug, Clone)]
pub struct ConcreteStack<R: Route, U> {
    entries: Vec<ConcreteElement<R, U>>,
}

impl<R: Route, U> Default for ConcreteStack<R, U> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R: Route, U> ConcreteStack<R, U> {
    /// A concrete stack with nothing materialized.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries bottom to top.
    pub fn iter(&self) -> std::slice::Iter<'_, ConcreteElement<R, U>> {
        self.entries.iter()
    }

    /// The top entry, i.e. what the container should display.
    pub fn top(&self) -> Option<&ConcreteElement<R, U>> {
        self.entries.last()
    }

    /// Element identities bottom to top.
    pub fn ids(&self) -> impl DoubleEndedIterator<Item = ElementId> + '_ {
        self.entries.iter().map(ConcreteElement::id)
    }

    /// Routes bottom to top.
    pub fn routes(&self) -> impl DoubleEndedIterator<Item = &R> + '_ {
        self.entries.iter().map(ConcreteElement::route)
    }

    /// Units bottom to top.
    pub fn units(&self) -> impl DoubleEndedIterator<Item = &U> + '_ {
        self.entries.iter().map(ConcreteElement::unit)
    }

    /// The unit materialized for `id`, if present.
    pub fn unit_for(&self, id: ElementId) -> Option<&U> {
        self.entries.iter().find(|e| e.id() == id).map(ConcreteElement::unit)
    }

    /// Whether `id` is materialized here.
    pub fn contains(&self, id: ElementId) -> bool {
        self.entries.iter().any(|e| e.id() == id)
    }
}

impl<R: Route, U: Clone> ConcreteStack<R, U> {
    /// Materialize `stack`, reusing units from `previous` by identity and
    /// calling `factory` only for identities not seen before.
    pub fn materialize<C, F>(
        stack: &RoutingStack<R>,
        previous: &Self,
        container: &C,
        factory: &mut F,
    ) -> Self
    where
        F: ElementFactory<R, C, Unit = U>,
    {
        let reusable: AHashMap<ElementId, &U> =
            previous.entries.iter().map(|e| (e.id(), &e.unit)).collect();

        let entries = stack
            .elements()
            .map(|element| {
                let unit = match reusable.get(&element.id()) {
                    Some(unit) => {
                        tracing::trace!(element = %element.id(), "reusing unit");
                        (*unit).clone()
                    }
                    None => {
                        tracing::trace!(element = %element.id(), route = ?element.route(), "creating unit");
                        factory.create(element, container)
                    }
                };
                ConcreteElement {
                    element: element.clone(),
                    unit,
                }
            })
            .collect();

        Self { entries }
    }
}

impl<'a, R: Route, U> IntoIterator for &'a ConcreteStack<R, U> {
    type Item = &'a ConcreteElement<R, U>;
    type IntoIter = std::slice::Iter<'a, ConcreteElement<R, U>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Screen(&'static str);

    #[derive(Debug, Clone, PartialEq)]
    struct View {
        title: &'static str,
        serial: u32,
    }

    struct Counting {
        calls: u32,
    }

    impl ElementFactory<Screen, ()> for Counting {
        type Unit = View;

        fn create(&mut self, element: &Element<Screen>, _container: &()) -> View {
            self.calls += 1;
            View {
                title: element.route().0,
                serial: self.calls,
            }
        }
    }

    #[test]
    fn materialize_from_empty_creates_every_unit() {
        let stack = RoutingStack::from([Screen("a"), Screen("b")]);
        let mut factory = Counting { calls: 0 };
        let concrete = ConcreteStack::materialize(&stack, &ConcreteStack::empty(), &(), &mut factory);

        assert_eq!(factory.calls, 2);
        assert_eq!(concrete.len(), 2);
        let titles: Vec<_> = concrete.units().map(|v| v.title).collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert!(concrete.ids().eq(stack.ids()));
    }

    #[test]
    fn materialize_reuses_units_by_identity() {
        let stack = RoutingStack::from([Screen("a"), Screen("b")]);
        let mut factory = Counting { calls: 0 };
        let first = ConcreteStack::materialize(&stack, &ConcreteStack::empty(), &(), &mut factory);

        let next = stack.push(Screen("c"));
        let second = ConcreteStack::materialize(&next, &first, &(), &mut factory);

        assert_eq!(factory.calls, 3);
        let serials: Vec<_> = second.units().map(|v| v.serial).collect();
        assert_eq!(serials, vec![1, 2, 3]);
    }

    #[test]
    fn equal_route_new_identity_is_recreated() {
        let stack = RoutingStack::from([Screen("a")]);
        let mut factory = Counting { calls: 0 };
        let first = ConcreteStack::materialize(&stack, &ConcreteStack::empty(), &(), &mut factory);

        let replaced = stack.replace_top(Screen("a"));
        let second = ConcreteStack::materialize(&replaced, &first, &(), &mut factory);

        assert_eq!(factory.calls, 2);
        assert_eq!(second.top().map(|e| e.unit().serial), Some(2));
    }

    #[test]
    fn closure_factory_and_patcher() {
        let stack = RoutingStack::from([Screen("x")]);
        let mut factory = |element: &Element<Screen>, _: &()| element.route().0.len();
        let concrete = ConcreteStack::materialize(&stack, &ConcreteStack::empty(), &(), &mut factory);
        assert_eq!(concrete.unit_for(concrete.ids().next().expect("one id")), Some(&1));

        let mut patched = Vec::new();
        let mut patcher = |_: &TransitionConfig,
                           _: &(),
                           old: &ConcreteStack<Screen, usize>,
                           new: &ConcreteStack<Screen, usize>| {
            patched.push((old.len(), new.len()));
        };
        patcher.patch(
            &TransitionConfig::default(),
            &(),
            &ConcreteStack::empty(),
            &concrete,
        );
        assert_eq!(patched, vec![(0, 1)]);
    }

    #[test]
    fn lookup_helpers() {
        let stack = RoutingStack::from([Screen("a"), Screen("b")]);
        let mut factory = Counting { calls: 0 };
        let concrete = ConcreteStack::materialize(&stack, &ConcreteStack::empty(), &(), &mut factory);
        let top = concrete.top().expect("non-empty");
        assert_eq!(top.route(), &Screen("b"));
        assert!(concrete.contains(top.id()));
        assert_eq!(concrete.unit_for(top.id()).map(|v| v.serial), Some(2));
        assert!(concrete.routes().eq([Screen("a"), Screen("b")].iter()));
        assert_eq!((&concrete).into_iter().count(), 2);
    }
}
