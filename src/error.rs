use thiserror::Error;
use tokio::{sync::mpsc::error::SendError, task::JoinError};

/// Errors surfaced at the boundary of the match runtime.
#[derive(Debug, Error)]
pub enum ScoreboardError {
    /// The runtime loop has stopped and no longer accepts commands.
    #[error("match runtime is no longer running")]
    RuntimeClosed,
    /// The runtime task panicked or was aborted.
    #[error("match runtime task failed")]
    RuntimeFailed(#[source] JoinError),
}

impl<T> From<SendError<T>> for ScoreboardError {
    fn from(_: SendError<T>) -> Self {
        ScoreboardError::RuntimeClosed
    }
}

impl From<JoinError> for ScoreboardError {
    fn from(err: JoinError) -> Self {
        ScoreboardError::RuntimeFailed(err)
    }
}
