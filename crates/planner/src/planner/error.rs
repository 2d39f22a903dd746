//! Error types for the schedule planner.

use thiserror::Error;

/// Errors that can occur while loading a catalog or building a search.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// The requested course is not offered in the loaded catalog
    #[error("Unknown course: {course}")]
    UnknownCourse { course: String },

    /// The course exists but has no lecture with this label
    #[error("Unknown lecture {lecture} for course {course}")]
    UnknownLecture { course: String, lecture: String },

    /// A raw time-range token could not be normalized
    #[error("Malformed time token {token:?}: {reason}")]
    MalformedTimeToken { token: String, reason: String },

    /// A search was started without any courses
    #[error("No courses were requested")]
    EmptyRequest,

    /// A quiz/lab/studio row appeared before any lecture of its course
    #[error("Section {section} of {course} has no lecture to attach to")]
    OrphanSection { course: String, section: String },

    /// Catalog data violated the index-alignment invariant
    #[error("Invalid catalog record: {message}")]
    InvalidRecord { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl PlannerError {
    /// Returns true if this error means the request referenced catalog data that
    /// does not exist.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            PlannerError::UnknownCourse { .. } | PlannerError::UnknownLecture { .. }
        )
    }

    pub(crate) fn malformed(token: &str, reason: impl Into<String>) -> Self {
        PlannerError::MalformedTimeToken {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
