#![forbid(unsafe_code)]

//! Test harness for Waypoint routers.
//!
//! Provides reference collaborators that record everything the router asks of
//! them, so tests can assert on reconciliation order and contents:
//!
//! - [`CountingFactory`]: builds [`TestUnit`]s, stores each unit's route via
//!   [`ArgumentRouteStorage`](waypoint_core::ArgumentRouteStorage), and logs
//!   every element it was asked to create.
//! - [`RecordingPatcher`]: records one [`PatchRecord`] per patch call.
//! - [`TestRouter`] / [`test_router`]: a router wired to both.
//!
//! # Example
//!
//! ```
//! use waypoint_harness::{TestContainer, assert_routes, test_router};
//!
//! let mut router = test_router(["home"]);
//! router.attach(TestContainer::new(1, "main")).unwrap();
//! router.execute(|s| s.push("detail")).unwrap();
//!
//! assert_routes!(router.stack().unwrap(), ["home", "detail"]);
//! assert_eq!(router.patcher().len(), 2);
//! ```

mod collaborators;

pub use collaborators::{
    CountingFactory, PatchRecord, RecordingPatcher, TestContainer, TestRouter, TestUnit,
    test_router, test_router_with,
};

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Install a test-friendly `tracing` subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `waypoint_core=debug`. Output goes through
/// the test writer so it is captured per test.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("waypoint_core=debug"));
        // Another subscriber may already be installed by the test binary.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Assert a stack's routes, bottom to top.
#[macro_export]
macro_rules! assert_routes {
    ($stack:expr, [$($route:expr),* $(,)?]) => {{
        let actual = $stack.to_routes();
        let expected = ::std::vec![$($route),*];
        assert_eq!(actual, expected, "routes differ (bottom to top)");
    }};
}
