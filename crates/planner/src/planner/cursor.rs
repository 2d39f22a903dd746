//! Pagination over a conflict-free search.
//!
//! A [`ScheduleCursor`] owns its search state. Each call to
//! [`ScheduleCursor::next`] resumes the search where the previous call stopped.
//! A cursor may be dropped at any point; it holds no external resources.

use serde::Serialize;
use tracing::info;

use super::catalog::Catalog;
use super::error::Result;
use super::search::ConflictFreeSearch;
use super::types::{RequestedCourse, ScheduleCandidate};

/// Result of advancing a cursor.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "option", rename_all = "snake_case")]
pub enum CursorStep {
    Candidate(ScheduleCandidate),
    /// Every candidate has been returned
    Exhausted,
}

impl CursorStep {
    pub fn into_candidate(self) -> Option<ScheduleCandidate> {
        match self {
            CursorStep::Candidate(c) => Some(c),
            CursorStep::Exhausted => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, CursorStep::Exhausted)
    }
}

pub struct ScheduleCursor {
    requests: Vec<RequestedCourse>,
    search: ConflictFreeSearch,
    served: u64,
    exhausted: bool,
}

impl ScheduleCursor {
    /// Prepares a search over `requests`. No candidate is evaluated yet.
    pub fn start(catalog: &Catalog, requests: Vec<RequestedCourse>) -> Result<Self> {
        let search = ConflictFreeSearch::build(catalog, &requests)?;

        info!(
            "Started schedule search for [{}]",
            requests
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self {
            requests,
            search,
            served: 0,
            exhausted: false,
        })
    }

    /// Returns the next conflict-free candidate, or `Exhausted` once the search
    /// space is used up. Calls after exhaustion keep returning `Exhausted`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> CursorStep {
        if self.exhausted {
            return CursorStep::Exhausted;
        }

        match self.search.next() {
            Some(candidate) => {
                self.served += 1;
                CursorStep::Candidate(candidate)
            }
            None => {
                self.exhausted = true;
                info!(
                    "Schedule search exhausted after {} candidates ({} examined, {} rejected)",
                    self.served,
                    self.search.examined(),
                    self.search.rejected()
                );
                CursorStep::Exhausted
            }
        }
    }

    pub fn requests(&self) -> &[RequestedCourse] {
        &self.requests
    }

    /// Number of candidates returned so far.
    pub fn served(&self) -> u64 {
        self.served
    }

    pub fn examined(&self) -> u64 {
        self.search.examined()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
