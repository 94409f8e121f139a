#![forbid(unsafe_code)]

//! Identity diff between two stacks.
//!
//! [`StackDiff`] classifies element identities into removed, added and
//! retained, flags whether retained elements changed relative order, and
//! derives a [`NavigationDirection`] from how the top changed. Stack patchers
//! use it to pick enter/exit transitions; the router logs it.
//!
//! # Direction Rules
//!
//! | Old top | New top | Direction |
//! |---------|---------|-----------|
//! | same identity | same identity | `None` |
//! | any | absent (new stack empty) | `Backward` |
//! | absent or still present | newly added | `Forward` |
//! | removed | newly added | `Replace` |
//! | removed | already present below | `Backward` |
//! | still present | already present below | `Replace` |

use ahash::AHashSet;

use crate::element::{ElementId, Route};
use crate::reconcile::ConcreteStack;
use crate::stack::RoutingStack;

/// How the visible top changed between two stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationDirection {
    /// The top element is unchanged.
    None,
    /// A new screen was put on top of what was shown.
    Forward,
    /// The user went back to a screen that was already in the stack, or
    /// everything was popped.
    Backward,
    /// The shown screen was swapped for another one.
    Replace,
}

/// Identity-level difference between an old and a new stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackDiff {
    /// In old but not in new, old order (bottom to top).
    pub removed: Vec<ElementId>,
    /// In new but not in old, new order.
    pub added: Vec<ElementId>,
    /// In both, new order.
    pub retained: Vec<ElementId>,
    /// Whether retained elements appear in a different relative order.
    pub reordered: bool,
    /// Top-level navigation direction.
    pub direction: NavigationDirection,
}

impl StackDiff {
    /// Diff two identity sequences, each bottom to top.
    #[must_use]
    pub fn between(old: &[ElementId], new: &[ElementId]) -> Self {
        let old_set: AHashSet<ElementId> = old.iter().copied().collect();
        let new_set: AHashSet<ElementId> = new.iter().copied().collect();

        let removed: Vec<ElementId> = old
            .iter()
            .copied()
            .filter(|id| !new_set.contains(id))
            .collect();
        let added: Vec<ElementId> = new
            .iter()
            .copied()
            .filter(|id| !old_set.contains(id))
            .collect();
        let retained: Vec<ElementId> = new
            .iter()
            .copied()
            .filter(|id| old_set.contains(id))
            .collect();

        let reordered = !old
            .iter()
            .copied()
            .filter(|id| new_set.contains(id))
            .eq(retained.iter().copied());

        let direction = direction_of(old.last().copied(), new.last().copied(), &old_set, &new_set);

        Self {
            removed,
            added,
            retained,
            reordered,
            direction,
        }
    }

    /// Diff two abstract stacks.
    #[must_use]
    pub fn of_stacks<R: Route>(old: &RoutingStack<R>, new: &RoutingStack<R>) -> Self {
        let old: Vec<ElementId> = old.ids().collect();
        let new: Vec<ElementId> = new.ids().collect();
        Self::between(&old, &new)
    }

    /// Diff two concrete stacks.
    #[must_use]
    pub fn of_concrete<R: Route, U>(old: &ConcreteStack<R, U>, new: &ConcreteStack<R, U>) -> Self {
        let old: Vec<ElementId> = old.ids().collect();
        let new: Vec<ElementId> = new.ids().collect();
        Self::between(&old, &new)
    }

    /// Whether nothing changed at all.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty() && !self.reordered
    }
}

fn direction_of(
    old_top: Option<ElementId>,
    new_top: Option<ElementId>,
    old_set: &AHashSet<ElementId>,
    new_set: &AHashSet<ElementId>,
) -> NavigationDirection {
    let Some(new_top) = new_top else {
        return match old_top {
            Some(_) => NavigationDirection::Backward,
            None => NavigationDirection::None,
        };
    };
    if old_top == Some(new_top) {
        return NavigationDirection::None;
    }
    let old_top_kept = old_top.is_none_or(|id| new_set.contains(&id));
    match (old_set.contains(&new_top), old_top_kept) {
        (false, true) => NavigationDirection::Forward,
        (false, false) => NavigationDirection::Replace,
        (true, false) => NavigationDirection::Backward,
        (true, true) => NavigationDirection::Replace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(old: &RoutingStack<u8>, new: &RoutingStack<u8>) -> StackDiff {
        StackDiff::of_stacks(old, new)
    }

    #[test]
    fn identical_stacks() {
        let stack = RoutingStack::from([1u8, 2]);
        let d = diff(&stack, &stack);
        assert!(d.is_empty());
        assert_eq!(d.direction, NavigationDirection::None);
        assert_eq!(d.retained.len(), 2);
    }

    #[test]
    fn push_is_forward() {
        let stack = RoutingStack::from([1u8, 2]);
        let pushed = stack.push(3);
        let d = diff(&stack, &pushed);
        assert_eq!(d.direction, NavigationDirection::Forward);
        assert_eq!(d.added, vec![pushed.top().map(|e| e.id()).expect("top")]);
        assert!(d.removed.is_empty());
        assert!(!d.reordered);
    }

    #[test]
    fn initial_show_is_forward() {
        let stack = RoutingStack::from([1u8]);
        let d = diff(&RoutingStack::empty(), &stack);
        assert_eq!(d.direction, NavigationDirection::Forward);
    }

    #[test]
    fn pop_is_backward() {
        let stack = RoutingStack::from([1u8, 2, 3]);
        let d = diff(&stack, &stack.pop());
        assert_eq!(d.direction, NavigationDirection::Backward);
        assert_eq!(d.removed.len(), 1);
        assert!(d.added.is_empty());
    }

    #[test]
    fn clear_is_backward() {
        let stack = RoutingStack::from([1u8, 2]);
        let d = diff(&stack, &stack.clear());
        assert_eq!(d.direction, NavigationDirection::Backward);
        assert_eq!(d.removed.len(), 2);
    }

    #[test]
    fn replace_top_is_replace() {
        let stack = RoutingStack::from([1u8, 2]);
        let d = diff(&stack, &stack.replace_top(9));
        assert_eq!(d.direction, NavigationDirection::Replace);
        assert_eq!(d.added.len(), 1);
        assert_eq!(d.removed.len(), 1);
    }

    #[test]
    fn bring_to_front_is_reorder_replace() {
        let stack = RoutingStack::from([1u8, 2, 3]);
        let bottom = stack.get(0).cloned().expect("bottom");
        let d = diff(&stack, &stack.push_element(bottom));
        assert_eq!(d.direction, NavigationDirection::Replace);
        assert!(d.reordered);
        assert!(d.added.is_empty());
        assert!(d.removed.is_empty());
        assert!(!d.is_empty());
    }

    #[test]
    fn empty_to_empty() {
        let d = diff(&RoutingStack::empty(), &RoutingStack::empty());
        assert!(d.is_empty());
        assert_eq!(d.direction, NavigationDirection::None);
    }
}
