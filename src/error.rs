use thiserror::Error;

use crate::session::{GenerateError, SessionError};

/// Top-level error for callers driving a whole session end to end.
#[derive(Debug, Error)]
pub enum RunloopError {
    #[error("session startup error: {0}")]
    Session(#[from] SessionError),
    #[error("route generation error: {0}")]
    Generate(#[from] GenerateError),
}
