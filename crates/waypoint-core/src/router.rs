#![forbid(unsafe_code)]

//! Router state machine: attach/detach lifecycle with pending-mutation
//! buffering and reconciliation on every attached transition.
//!
//! # State Machine
//!
//! ```text
//!                     attach(container)
//!   Detached(stack, pending) ───────────────▶ Attached(pending, container)
//!            ▲                                         │
//!            └─────────────────────────────────────────┘
//!                  detach() → Detached(stack, stack)
//! ```
//!
//! `execute` applies an instruction to the live editable stack and keeps the
//! variant: `pending_stack` while detached, `stack` while attached.
//!
//! # Invariants
//!
//! - Starts as `Detached { stack: empty, pending_stack: initial }`.
//! - Every transition that ends in `Attached` reconciles exactly once: the
//!   factory materializes the new stack and the patcher is called with the
//!   previously presented concrete stack (empty when coming from `Detached`).
//! - Nothing is reconciled while detached.
//! - Every state access is checked against the router's
//!   [`ExecutionContext`].
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `AlreadyAttached` | `attach` while attached | Error returned, state unchanged, new container dropped |
//! | `WrongContext` | access from a foreign thread | Error returned, nothing read or written |
//!
//! Both are logged at `error` level before being returned.
//!
//! # Example
//!
//! ```
//! use waypoint_core::{ConcreteStack, Element, Router, RouterConfig, TransitionConfig};
//!
//! let config = RouterConfig::new().with_initial_routes(["home"]);
//! let factory = |element: &Element<&'static str>, _: &()| element.route().to_string();
//! let mut shown = Vec::new();
//! let patcher = |_: &TransitionConfig,
//!                _: &(),
//!                _: &ConcreteStack<&'static str, String>,
//!                new: &ConcreteStack<&'static str, String>| {
//!     shown.push(new.top().map(|e| e.unit().clone()));
//! };
//! let mut router = Router::new(config, factory, patcher);
//!
//! router.execute(|stack| stack.push("settings")).unwrap(); // buffered
//! router.attach(()).unwrap(); // flushed and reconciled
//! router.execute(|stack| stack.pop()).unwrap();
//! drop(router);
//!
//! assert_eq!(shown, vec![Some("settings".to_string()), Some("home".to_string())]);
//! ```

use std::mem;

use tracing::{debug, debug_span, error};

use crate::config::{RouterConfig, TransitionConfig};
use crate::context::ExecutionContext;
use crate::diff::StackDiff;
use crate::element::Route;
use crate::error::RouterError;
use crate::reconcile::{ConcreteStack, ElementFactory, StackPatcher};
use crate::stack::RoutingStack;

/// The whole state of a router.
#[derive(Debug, Clone, PartialEq)]
pub enum RouterState<R: Route, C> {
    /// A presentation surface is bound; `stack` is live.
    Attached {
        /// Live stack reflecting every applied instruction.
        stack: RoutingStack<R>,
        /// Handle to the presentation surface.
        container: C,
    },
    /// No presentation surface; instructions accumulate in `pending_stack`.
    Detached {
        /// Last stack handed to a presentation surface.
        stack: RoutingStack<R>,
        /// Stack that becomes live on the next attach.
        pending_stack: RoutingStack<R>,
    },
}

impl<R: Route, C> RouterState<R, C> {
    /// Initial state for a router whose first attach shows `initial`.
    #[must_use]
    pub fn initial(initial: RoutingStack<R>) -> Self {
        Self::Detached {
            stack: RoutingStack::empty(),
            pending_stack: initial,
        }
    }

    /// The `stack` component: live stack when attached, last committed
    /// stack when detached.
    pub fn stack(&self) -> &RoutingStack<R> {
        match self {
            Self::Attached { stack, .. } => stack,
            Self::Detached { stack, .. } => stack,
        }
    }

    /// The stack instructions are applied to.
    pub fn live_stack(&self) -> &RoutingStack<R> {
        match self {
            Self::Attached { stack, .. } => stack,
            Self::Detached { pending_stack, .. } => pending_stack,
        }
    }

    /// Whether a container is bound.
    pub fn is_attached(&self) -> bool {
        match self {
            Self::Attached { .. } => true,
            Self::Detached { .. } => false,
        }
    }

    /// The bound container, if attached.
    pub fn container(&self) -> Option<&C> {
        match self {
            Self::Attached { container, .. } => Some(container),
            Self::Detached { .. } => None,
        }
    }

    /// Apply `instruction` to the live stack, keeping the variant.
    #[must_use]
    pub fn next_state<F>(self, instruction: F) -> Self
    where
        F: FnOnce(&RoutingStack<R>) -> RoutingStack<R>,
    {
        match self {
            Self::Attached { stack, container } => Self::Attached {
                stack: instruction(&stack),
                container,
            },
            Self::Detached {
                stack,
                pending_stack,
            } => Self::Detached {
                stack,
                pending_stack: instruction(&pending_stack),
            },
        }
    }
}

/// Navigation router binding a [`RoutingStack`] to a presentation surface.
///
/// `R` is the route type, `C` the container handle, `F` the element factory
/// and `P` the stack patcher.
pub struct Router<R, C, F, P>
where
    R: Route,
    F: ElementFactory<R, C>,
{
    state: RouterState<R, C>,
    /// Concrete stack last handed to the patcher; empty while detached.
    presented: ConcreteStack<R, F::Unit>,
    factory: F,
    patcher: P,
    transition: TransitionConfig,
    context: ExecutionContext,
}

impl<R, C, F, P> Router<R, C, F, P>
where
    R: Route,
    F: ElementFactory<R, C>,
    P: StackPatcher<R, C, F::Unit>,
{
    /// Build a detached router from `config` and its collaborators.
    pub fn new(config: RouterConfig<R>, factory: F, patcher: P) -> Self {
        let (initial_stack, transition, context) = config.into_parts();
        debug!(initial_depth = initial_stack.len(), "router created");
        Self {
            state: RouterState::initial(initial_stack),
            presented: ConcreteStack::empty(),
            factory,
            patcher,
            transition,
            context,
        }
    }

    // --- Transitions ---

    /// Apply `instruction` to the live stack.
    ///
    /// While detached the result is buffered; while attached it is
    /// reconciled immediately.
    ///
    /// # Errors
    ///
    /// [`RouterError::WrongContext`] when called off the owning thread.
    pub fn execute<I>(&mut self, instruction: I) -> Result<(), RouterError>
    where
        I: FnOnce(&RoutingStack<R>) -> RoutingStack<R>,
    {
        self.ensure_context("execute")?;
        let old_depth = self.state.live_stack().len();
        // A panicking instruction must leave the state untouched.
        let next = instruction(self.state.live_stack());
        let new_depth = next.len();
        let attached = match &mut self.state {
            RouterState::Attached { stack, .. } => {
                *stack = next;
                true
            }
            RouterState::Detached { pending_stack, .. } => {
                *pending_stack = next;
                false
            }
        };
        debug!(attached, old_depth, new_depth, "executed instruction");
        if attached {
            self.reconcile();
        }
        Ok(())
    }

    /// Bind `container` and flush the pending stack into it.
    ///
    /// # Errors
    ///
    /// - [`RouterError::AlreadyAttached`] when a container is already bound.
    ///   The state is left as it was.
    /// - [`RouterError::WrongContext`] when called off the owning thread.
    pub fn attach(&mut self, container: C) -> Result<(), RouterError> {
        self.ensure_context("attach")?;
        match self.take_state() {
            RouterState::Detached { pending_stack, .. } => {
                debug!(depth = pending_stack.len(), "attaching container");
                self.set_state(RouterState::Attached {
                    stack: pending_stack,
                    container,
                });
                Ok(())
            }
            attached @ RouterState::Attached { .. } => {
                self.state = attached;
                let err = RouterError::AlreadyAttached;
                error!(%err, "attach called on an attached router");
                Err(err)
            }
        }
    }

    /// Unbind the container, freezing the live stack as both the committed
    /// and pending stack. Returns the container that was bound, or `None`
    /// if the router was already detached.
    ///
    /// # Errors
    ///
    /// [`RouterError::WrongContext`] when called off the owning thread.
    pub fn detach(&mut self) -> Result<Option<C>, RouterError> {
        self.ensure_context("detach")?;
        match self.take_state() {
            RouterState::Attached { stack, container } => {
                debug!(depth = stack.len(), "detaching container");
                self.presented = ConcreteStack::empty();
                self.set_state(RouterState::Detached {
                    stack: stack.clone(),
                    pending_stack: stack,
                });
                Ok(Some(container))
            }
            detached @ RouterState::Detached { .. } => {
                self.state = detached;
                Ok(None)
            }
        }
    }

    // --- State Queries ---

    /// Current state.
    ///
    /// # Errors
    ///
    /// [`RouterError::WrongContext`] when called off the owning thread.
    pub fn state(&self) -> Result<&RouterState<R, C>, RouterError> {
        self.ensure_context("state")?;
        Ok(&self.state)
    }

    /// Whether a container is bound.
    ///
    /// # Errors
    ///
    /// [`RouterError::WrongContext`] when called off the owning thread.
    pub fn is_attached(&self) -> Result<bool, RouterError> {
        Ok(self.state()?.is_attached())
    }

    /// Stack that instructions currently apply to.
    ///
    /// # Errors
    ///
    /// [`RouterError::WrongContext`] when called off the owning thread.
    pub fn stack(&self) -> Result<&RoutingStack<R>, RouterError> {
        Ok(self.state()?.live_stack())
    }

    /// Stack last committed to a presentation surface.
    ///
    /// # Errors
    ///
    /// [`RouterError::WrongContext`] when called off the owning thread.
    pub fn committed_stack(&self) -> Result<&RoutingStack<R>, RouterError> {
        Ok(self.state()?.stack())
    }

    /// The bound container, if any.
    ///
    /// # Errors
    ///
    /// [`RouterError::WrongContext`] when called off the owning thread.
    pub fn container(&self) -> Result<Option<&C>, RouterError> {
        Ok(self.state()?.container())
    }

    /// Concrete stack last handed to the patcher (empty while detached).
    ///
    /// # Errors
    ///
    /// [`RouterError::WrongContext`] when called off the owning thread.
    pub fn presented(&self) -> Result<&ConcreteStack<R, F::Unit>, RouterError> {
        self.ensure_context("presented")?;
        Ok(&self.presented)
    }

    // --- Configuration & Collaborators ---

    /// Transition handed to the patcher.
    pub fn transition(&self) -> TransitionConfig {
        self.transition
    }

    /// Execution context owning this router.
    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    /// The element factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// The stack patcher.
    pub fn patcher(&self) -> &P {
        &self.patcher
    }

    /// Mutable access to the stack patcher.
    pub fn patcher_mut(&mut self) -> &mut P {
        &mut self.patcher
    }

    // --- Internals ---

    fn ensure_context(&self, operation: &'static str) -> Result<(), RouterError> {
        self.context.ensure().inspect_err(|err| {
            error!(operation, %err, "router accessed off its execution context");
        })
    }

    fn take_state(&mut self) -> RouterState<R, C> {
        mem::replace(
            &mut self.state,
            RouterState::Detached {
                stack: RoutingStack::empty(),
                pending_stack: RoutingStack::empty(),
            },
        )
    }

    fn set_state(&mut self, state: RouterState<R, C>) {
        self.state = state;
        match &self.state {
            RouterState::Attached { .. } => self.reconcile(),
            RouterState::Detached { .. } => {}
        }
    }

    fn reconcile(&mut self) {
        let (stack, container) = match &self.state {
            RouterState::Attached { stack, container } => (stack, container),
            RouterState::Detached { .. } => return,
        };

        let next = ConcreteStack::materialize(stack, &self.presented, container, &mut self.factory);
        let diff = StackDiff::of_concrete(&self.presented, &next);
        let _span = debug_span!(
            "router_reconcile",
            old_depth = self.presented.len(),
            new_depth = next.len(),
            added = diff.added.len(),
            removed = diff.removed.len(),
            direction = ?diff.direction
        )
        .entered();

        self.patcher
            .patch(&self.transition, container, &self.presented, &next);
        self.presented = next;
    }
}

impl<R, C, F, P> std::fmt::Debug for Router<R, C, F, P>
where
    R: Route,
    C: std::fmt::Debug,
    F: ElementFactory<R, C>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("state", &self.state)
            .field("presented_depth", &self.presented.len())
            .field("transition", &self.transition)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, ElementId};
    use std::thread;
    use tracing_test::traced_test;

    #[derive(Debug, Clone, PartialEq)]
    enum Screen {
        Home,
        List,
        Detail(u32),
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Surface(&'static str);

    #[derive(Default)]
    struct Factory {
        created: Vec<ElementId>,
    }

    impl ElementFactory<Screen, Surface> for Factory {
        type Unit = ElementId;

        fn create(&mut self, element: &Element<Screen>, _container: &Surface) -> ElementId {
            self.created.push(element.id());
            element.id()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Patch {
        container: &'static str,
        old: Vec<ElementId>,
        new: Vec<ElementId>,
    }

    #[derive(Default)]
    struct Patcher {
        patches: Vec<Patch>,
    }

    impl StackPatcher<Screen, Surface, ElementId> for Patcher {
        fn patch(
            &mut self,
            _transition: &TransitionConfig,
            container: &Surface,
            old: &ConcreteStack<Screen, ElementId>,
            new: &ConcreteStack<Screen, ElementId>,
        ) {
            self.patches.push(Patch {
                container: container.0,
                old: old.ids().collect(),
                new: new.ids().collect(),
            });
        }
    }

    type TestRouter = Router<Screen, Surface, Factory, Patcher>;

    fn router(initial: Vec<Screen>) -> TestRouter {
        Router::new(
            RouterConfig::new().with_initial_routes(initial),
            Factory::default(),
            Patcher::default(),
        )
    }

    #[test]
    fn starts_detached_with_initial_pending() {
        let router = router(vec![Screen::Home]);
        match router.state().expect("owner thread") {
            RouterState::Detached {
                stack,
                pending_stack,
            } => {
                assert!(stack.is_empty());
                assert_eq!(pending_stack.to_routes(), vec![Screen::Home]);
            }
            RouterState::Attached { .. } => panic!("router must start detached"),
        }
        assert!(router.patcher().patches.is_empty());
    }

    #[test]
    fn execute_while_detached_buffers_without_reconcile() {
        let mut router = router(vec![Screen::Home]);
        router
            .execute(|s| s.push(Screen::List))
            .expect("owner thread");
        assert_eq!(
            router.stack().expect("owner thread").to_routes(),
            vec![Screen::Home, Screen::List]
        );
        assert!(router.committed_stack().expect("owner thread").is_empty());
        assert!(router.patcher().patches.is_empty());
        assert!(router.factory().created.is_empty());
    }

    #[test]
    fn attach_flushes_pending_and_reconciles_once() {
        let mut router = router(vec![Screen::Home, Screen::List]);
        let pending: Vec<ElementId> = router.stack().expect("owner thread").ids().collect();

        router.attach(Surface("main")).expect("first attach");

        let patches = &router.patcher().patches;
        assert_eq!(patches.len(), 1);
        assert!(patches[0].old.is_empty());
        assert_eq!(patches[0].new, pending);
        assert_eq!(patches[0].container, "main");
        assert_eq!(router.container().expect("owner thread"), Some(&Surface("main")));
        assert!(router.is_attached().expect("owner thread"));
    }

    #[test]
    fn second_attach_fails_deterministically() {
        let mut router = router(vec![Screen::Home]);
        router.attach(Surface("main")).expect("first attach");
        for _ in 0..3 {
            assert_eq!(
                router.attach(Surface("other")),
                Err(RouterError::AlreadyAttached)
            );
        }
        assert_eq!(router.container().expect("owner thread"), Some(&Surface("main")));
        assert_eq!(router.patcher().patches.len(), 1);
    }

    #[test]
    fn detach_freezes_stack() {
        let mut router = router(vec![Screen::Home]);
        let initial = router.stack().expect("owner thread").clone();
        router.attach(Surface("main")).expect("attach");

        let container = router.detach().expect("owner thread");
        assert_eq!(container, Some(Surface("main")));

        match router.state().expect("owner thread") {
            RouterState::Detached {
                stack,
                pending_stack,
            } => {
                assert_eq!(stack, &initial);
                assert_eq!(pending_stack, &initial);
            }
            RouterState::Attached { .. } => panic!("router must be detached"),
        }
        assert!(router.presented().expect("owner thread").is_empty());
    }

    #[test]
    fn detach_when_detached_is_noop() {
        let mut router = router(vec![Screen::Home]);
        let before = router.state().expect("owner thread").clone();
        assert_eq!(router.detach().expect("owner thread"), None);
        assert_eq!(router.state().expect("owner thread"), &before);
    }

    #[test]
    fn execute_while_attached_reconciles_against_previous() {
        let mut router = router(vec![Screen::Home]);
        router.attach(Surface("main")).expect("attach");
        router
            .execute(|s| s.push(Screen::Detail(1)))
            .expect("owner thread");

        let patches = &router.patcher().patches;
        assert_eq!(patches.len(), 2);
        assert_eq!(patches[1].old, patches[0].new);
        assert_eq!(patches[1].new.len(), 2);
        assert_eq!(&patches[1].new[..1], &patches[0].new[..]);
        assert_eq!(router.factory().created.len(), 2);
    }

    #[test]
    fn reattach_reconciles_from_empty_with_buffered_changes() {
        let mut router = router(vec![Screen::Home]);
        router.attach(Surface("first")).expect("attach");
        router.detach().expect("detach");
        router
            .execute(|s| s.push(Screen::List))
            .expect("owner thread");
        assert_eq!(router.patcher().patches.len(), 1);

        router.attach(Surface("second")).expect("reattach");
        let patches = &router.patcher().patches;
        assert_eq!(patches.len(), 2);
        assert!(patches[1].old.is_empty());
        assert_eq!(patches[1].new.len(), 2);
        assert_eq!(patches[1].container, "second");
    }

    #[test]
    fn factory_called_once_per_identity() {
        let mut router = router(vec![Screen::Home]);
        router.attach(Surface("main")).expect("attach");
        router.execute(|s| s.push(Screen::List)).expect("push");
        router.execute(|s| s.push(Screen::Detail(2))).expect("push");
        router.execute(|s| s.pop()).expect("pop");
        router
            .execute(|s| s.pop_until_route(&Screen::Home))
            .expect("pop until");
        assert_eq!(router.factory().created.len(), 3);
        assert_eq!(router.patcher().patches.len(), 5);
    }

    #[traced_test]
    #[test]
    fn wrong_context_is_reported() {
        let worker = thread::spawn(|| thread::current())
            .join()
            .expect("worker thread panicked");
        let mut router: TestRouter = Router::new(
            RouterConfig::new()
                .with_initial_routes(vec![Screen::Home])
                .with_context(ExecutionContext::for_thread(&worker)),
            Factory::default(),
            Patcher::default(),
        );

        assert!(matches!(
            router.execute(|s| s.pop()),
            Err(RouterError::WrongContext { .. })
        ));
        assert!(matches!(
            router.attach(Surface("main")),
            Err(RouterError::WrongContext { .. })
        ));
        assert!(matches!(router.detach(), Err(RouterError::WrongContext { .. })));
        assert!(matches!(router.stack(), Err(RouterError::WrongContext { .. })));
        assert!(router.patcher().patches.is_empty());
        assert!(logs_contain("router accessed off its execution context"));
    }

    #[traced_test]
    #[test]
    fn already_attached_is_logged() {
        let mut router = router(vec![Screen::Home]);
        router.attach(Surface("main")).expect("attach");
        let _ = router.attach(Surface("again"));
        assert!(logs_contain("attach called on an attached router"));
    }

    #[test]
    fn state_next_state_keeps_variant() {
        let detached: RouterState<Screen, Surface> =
            RouterState::initial(RoutingStack::from([Screen::Home]));
        let next = detached.next_state(|s| s.push(Screen::List));
        assert!(!next.is_attached());
        assert_eq!(next.live_stack().len(), 2);
        assert!(next.stack().is_empty());

        let attached = RouterState::Attached {
            stack: RoutingStack::from([Screen::Home]),
            container: Surface("main"),
        };
        let next = attached.next_state(|s| s.clear());
        assert!(next.is_attached());
        assert!(next.live_stack().is_empty());
        assert_eq!(next.container(), Some(&Surface("main")));
    }
}
