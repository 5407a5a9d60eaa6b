//! Error types for deltasync.

use thiserror::Error;

/// Errors raised by sync collaborators.
///
/// Everything except [`SyncError::Cancelled`] is treated as transient by the
/// synchronizer: the entity type reports failure and its cursor stays put.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Remote source unreachable or returned an error
    #[error("network error: {0}")]
    Network(String),

    /// Local store read or write failed
    #[error("storage error: {0}")]
    Storage(String),

    /// Malformed data from the remote or on disk
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Requested entity does not exist remotely
    #[error("not found: {0}")]
    NotFound(String),

    /// Work was cancelled by the enclosing scope
    #[error("operation cancelled")]
    Cancelled,

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// True for the cooperative-cancellation signal.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
