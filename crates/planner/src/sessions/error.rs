//! Error types for the session registry.

use thiserror::Error;

use crate::planner::PlannerError;

/// Errors that can occur while starting or advancing a planning session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session exists for the given key
    #[error("No planning session with this id")]
    NotFound,

    /// The session sat idle past its TTL and was dropped
    #[error("Planning session expired")]
    Expired,

    /// Another request is already advancing this session
    #[error("A request for this session is already in progress")]
    OperationInProgress,

    /// The registry is at capacity
    #[error("Too many active planning sessions (limit {limit})")]
    TooManySessions { limit: usize },

    /// Building the search failed
    #[error(transparent)]
    Planner(#[from] PlannerError),
}

impl SessionError {
    /// Returns true if the client should start a new session.
    pub fn needs_restart(&self) -> bool {
        matches!(self, SessionError::NotFound | SessionError::Expired)
    }

    /// Returns true if retrying the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::OperationInProgress | SessionError::TooManySessions { .. }
        )
    }
}
