#![forbid(unsafe_code)]

//! Core navigation model for Waypoint.
//!
//! - [`RoutingStack`]: immutable stack of route-bearing [`Element`]s and the
//!   push / pop / clear / pop-until algebra over it.
//! - [`Router`]: attach/detach state machine that buffers instructions while
//!   no container is bound and reconciles through an [`ElementFactory`] and a
//!   [`StackPatcher`] while one is.
//! - [`StackDiff`]: identity diff and [`NavigationDirection`] for patchers.
//! - [`storage`]: associating routes with displayable units.
//!
//! # Example
//!
//! ```
//! use waypoint_core::RoutingStack;
//!
//! let stack = RoutingStack::from(["inbox", "thread"]);
//! let next = stack.push("compose").pop().pop();
//! assert_eq!(next.to_routes(), vec!["inbox"]);
//! assert_eq!(stack.len(), 2);
//! ```

pub mod config;
pub mod context;
pub mod diff;
pub mod element;
pub mod error;
pub mod reconcile;
pub mod router;
pub mod stack;
pub mod storage;

pub use config::{RouterConfig, TransitionConfig, TransitionKind};
pub use context::ExecutionContext;
pub use diff::{NavigationDirection, StackDiff};
pub use element::{Element, ElementId, Route};
pub use error::{RouteStorageError, RouterError};
pub use reconcile::{ConcreteElement, ConcreteStack, ElementFactory, StackPatcher};
pub use router::{Router, RouterState};
pub use stack::RoutingStack;
pub use storage::{ArgumentRouteStorage, Arguments, HasArguments, RouteStorage};
