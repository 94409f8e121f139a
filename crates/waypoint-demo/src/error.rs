#![forbid(unsafe_code)]

use waypoint_core::RouterError;

/// Everything that can stop a demo session.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("line {line}: {reason}")]
    Script { line: usize, reason: String },

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
}
