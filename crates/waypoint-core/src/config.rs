#![forbid(unsafe_code)]

//! Router configuration.
//!
//! [`RouterConfig`] replaces builder syntax with a plain value: the initial
//! stack, the [`TransitionConfig`] handed to the stack patcher, and the
//! [`ExecutionContext`] that owns router state. Collaborators (element
//! factory and stack patcher) are passed to [`Router::new`] directly.
//!
//! [`Router::new`]: crate::Router::new

use std::env;
use std::time::Duration;

use crate::context::ExecutionContext;
use crate::element::Route;
use crate::stack::RoutingStack;

/// Environment variable that forces reduced motion when set to a truthy value.
pub const REDUCED_MOTION_ENV: &str = "WAYPOINT_REDUCED_MOTION";

/// Default transition duration.
pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_millis(250);

/// Visual style a stack patcher should use when switching screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionKind {
    /// Swap instantly.
    None,
    /// Cross-fade.
    Fade,
    /// Slide horizontally, direction following the navigation direction.
    #[default]
    Slide,
    /// Scale in/out.
    Scale,
}

/// Transition settings passed through to the stack patcher on every
/// reconciliation. The router never animates anything itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionConfig {
    /// Transition style.
    pub kind: TransitionKind,
    /// Nominal duration.
    pub duration: Duration,
    /// Accessibility preference; collapses the effective duration to zero.
    pub reduced_motion: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self::new(TransitionKind::default())
    }
}

impl TransitionConfig {
    /// Transition of `kind` with the default duration.
    #[must_use]
    pub fn new(kind: TransitionKind) -> Self {
        Self {
            kind,
            duration: DEFAULT_TRANSITION_DURATION,
            reduced_motion: false,
        }
    }

    /// No transition at all.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            kind: TransitionKind::None,
            duration: Duration::ZERO,
            reduced_motion: false,
        }
    }

    /// Default transition, honoring [`REDUCED_MOTION_ENV`].
    #[must_use]
    pub fn from_env() -> Self {
        let value = env::var(REDUCED_MOTION_ENV).ok();
        Self::default().with_reduced_motion(reduced_motion_from(value.as_deref()))
    }

    /// Set the duration.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the reduced-motion preference.
    #[must_use]
    pub fn with_reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.reduced_motion = reduced_motion;
        self
    }

    /// Duration a patcher should actually animate for.
    pub fn effective_duration(&self) -> Duration {
        if self.reduced_motion || self.kind == TransitionKind::None {
            Duration::ZERO
        } else {
            self.duration
        }
    }
}

/// Interpret an environment value as a reduced-motion flag.
///
/// `1`, `true`, `yes` and `on` (any case) enable it; anything else, including
/// an unset variable, does not.
#[must_use]
pub fn reduced_motion_from(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

/// Construction-time settings for a [`Router`](crate::Router).
#[derive(Debug, Clone)]
pub struct RouterConfig<R: Route> {
    initial_stack: RoutingStack<R>,
    transition: TransitionConfig,
    context: ExecutionContext,
}

impl<R: Route> Default for RouterConfig<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Route> RouterConfig<R> {
    /// Empty initial stack, default transition, owned by the calling thread.
    #[must_use]
    pub fn new() -> Self {
        Self {
            initial_stack: RoutingStack::empty(),
            transition: TransitionConfig::default(),
            context: ExecutionContext::current(),
        }
    }

    /// Set the stack that becomes live on first attach.
    #[must_use]
    pub fn with_initial_stack(mut self, stack: RoutingStack<R>) -> Self {
        self.initial_stack = stack;
        self
    }

    /// Set the initial stack from routes, bottom to top.
    #[must_use]
    pub fn with_initial_routes<I: IntoIterator<Item = R>>(self, routes: I) -> Self {
        self.with_initial_stack(RoutingStack::from_routes(routes))
    }

    /// Set the transition handed to the stack patcher.
    #[must_use]
    pub fn with_transition(mut self, transition: TransitionConfig) -> Self {
        self.transition = transition;
        self
    }

    /// Set the execution context that owns router state.
    #[must_use]
    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    /// The initial stack.
    pub fn initial_stack(&self) -> &RoutingStack<R> {
        &self.initial_stack
    }

    /// The transition config.
    pub fn transition(&self) -> TransitionConfig {
        self.transition
    }

    /// The owning execution context.
    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    pub(crate) fn into_parts(self) -> (RoutingStack<R>, TransitionConfig, ExecutionContext) {
        (self.initial_stack, self.transition, self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_transition_slides() {
        let t = TransitionConfig::default();
        assert_eq!(t.kind, TransitionKind::Slide);
        assert_eq!(t.duration, DEFAULT_TRANSITION_DURATION);
        assert_eq!(t.effective_duration(), DEFAULT_TRANSITION_DURATION);
    }

    #[test]
    fn reduced_motion_zeroes_duration() {
        let t = TransitionConfig::new(TransitionKind::Fade)
            .with_duration(Duration::from_millis(400))
            .with_reduced_motion(true);
        assert_eq!(t.duration, Duration::from_millis(400));
        assert_eq!(t.effective_duration(), Duration::ZERO);
    }

    #[test]
    fn instant_has_no_duration() {
        let t = TransitionConfig::instant();
        assert_eq!(t.kind, TransitionKind::None);
        assert_eq!(t.effective_duration(), Duration::ZERO);
        assert_eq!(
            TransitionConfig::new(TransitionKind::None).effective_duration(),
            Duration::ZERO
        );
    }

    #[test]
    fn reduced_motion_env_values() {
        assert!(reduced_motion_from(Some("1")));
        assert!(reduced_motion_from(Some("TRUE")));
        assert!(reduced_motion_from(Some(" yes ")));
        assert!(reduced_motion_from(Some("on")));
        assert!(!reduced_motion_from(Some("0")));
        assert!(!reduced_motion_from(Some("")));
        assert!(!reduced_motion_from(None));
    }

    #[test]
    fn router_config_builder() {
        let config = RouterConfig::new()
            .with_initial_routes(["home", "detail"])
            .with_transition(TransitionConfig::instant());
        assert_eq!(config.initial_stack().to_routes(), vec!["home", "detail"]);
        assert_eq!(config.transition(), TransitionConfig::instant());
        assert!(config.context().is_current());
    }

    #[test]
    fn router_config_default_is_empty() {
        let config = RouterConfig::<u8>::default();
        assert!(config.initial_stack().is_empty());
        assert_eq!(config.transition(), TransitionConfig::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn transition_config_serde_roundtrip() {
        let t = TransitionConfig::new(TransitionKind::Scale).with_reduced_motion(true);
        let json = serde_json::to_string(&t).expect("serialize");
        let back: TransitionConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, t);
    }
}
