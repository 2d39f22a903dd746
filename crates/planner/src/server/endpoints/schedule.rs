//! Endpoints for paging through conflict-free schedules.
//!
//! A client starts a search with a list of courses and receives a session id
//! together with the first schedule. Each further call to `next` returns the
//! following schedule until the search is exhausted.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::planner::{CursorStep, PlannerError, RequestedCourse, ScheduleCursor};
use crate::server::types::ApiErrorType;
use crate::sessions::{SessionError, SessionKey, SessionStep};
use crate::types::AppState;

/// Body for starting a search.
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    /// Course names, each optionally followed by a lecture letter ("CSE 142 B")
    pub courses: Vec<String>,
}

/// Converts SessionError to API response.
pub(crate) fn session_error_to_response(error: SessionError) -> Response {
    let (status, message) = match &error {
        SessionError::NotFound => (StatusCode::NOT_FOUND, "Planning session not found"),
        SessionError::Expired => (StatusCode::GONE, "Planning session expired"),
        SessionError::OperationInProgress => (
            StatusCode::CONFLICT,
            "Another request for this session is in progress",
        ),
        SessionError::TooManySessions { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Too many active planning sessions",
        ),
        SessionError::Planner(e) if e.is_lookup_failure() => {
            (StatusCode::NOT_FOUND, "Requested course is not offered")
        }
        SessionError::Planner(PlannerError::EmptyRequest) => {
            (StatusCode::BAD_REQUEST, "No courses were requested")
        }
        SessionError::Planner(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to build schedule search",
        ),
    };

    ApiErrorType::from((status, message, Some(error.to_string()))).into_response()
}

/// Runs one cursor step off the async runtime, since a single step may have to
/// reject a long run of conflicting candidates.
async fn advance(state: &Arc<AppState>, key: SessionKey) -> Result<SessionStep, Response> {
    let state = Arc::clone(state);
    let joined = tokio::task::spawn_blocking(move || state.sessions.advance(&key)).await;

    match joined {
        Ok(Ok(step)) => Ok(step),
        Ok(Err(e)) => Err(session_error_to_response(e)),
        Err(e) => {
            error!("Schedule search task failed: {}", e);
            Err(ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Schedule search failed",
                Some(e.to_string()),
            ))
            .into_response())
        }
    }
}

fn step_response(key: &SessionKey, step: SessionStep) -> Response {
    let exhausted = step.step.is_exhausted();
    let option = match step.step {
        CursorStep::Candidate(candidate) => Some(candidate),
        CursorStep::Exhausted => None,
    };

    (
        StatusCode::OK,
        Json(json!({
            "session": key.as_str(),
            "index": step.index,
            "exhausted": exhausted,
            "option": option,
            "started_at": step.created_at,
        })),
    )
        .into_response()
}

/// POST /schedules
///
/// Resolves the requested courses, starts a search and returns the first
/// schedule. `option` is null if no conflict-free schedule exists.
pub async fn post_start_schedule(
    State(s): State<Arc<AppState>>,
    Json(body): Json<StartRequest>,
) -> Response {
    info!("POST /schedules {:?}", body.courses);

    let requests = match body
        .courses
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(|c| s.catalog.check_course(c))
        .collect::<Result<Vec<RequestedCourse>, _>>()
    {
        Ok(requests) => requests,
        Err(e) => {
            warn!("Rejected schedule request: {}", e);
            return session_error_to_response(e.into());
        }
    };

    let cursor = match ScheduleCursor::start(&s.catalog, requests) {
        Ok(cursor) => cursor,
        Err(e) => {
            warn!("Could not start schedule search: {}", e);
            return session_error_to_response(e.into());
        }
    };

    let key = match s.sessions.create(cursor) {
        Ok(key) => key,
        Err(e) => {
            warn!("Could not register planning session: {}", e);
            return session_error_to_response(e);
        }
    };

    match advance(&s, key.clone()).await {
        Ok(step) => step_response(&key, step),
        Err(response) => response,
    }
}

/// POST /schedules/:session/next
///
/// Returns the next schedule for the session, or `exhausted: true`.
pub async fn post_next_schedule(
    Path(session): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    let Some(key) = SessionKey::from_client(&session) else {
        info!("POST /schedules/<invalid>/next");
        return session_error_to_response(SessionError::NotFound);
    };
    info!("POST /schedules/{}/next", key);

    match advance(&s, key.clone()).await {
        Ok(step) => step_response(&key, step),
        Err(response) => response,
    }
}

/// DELETE /schedules/:session
///
/// Discards the session and any schedules not yet returned.
pub async fn delete_schedule(
    Path(session): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    let Some(key) = SessionKey::from_client(&session) else {
        info!("DELETE /schedules/<invalid>");
        return session_error_to_response(SessionError::NotFound);
    };
    info!("DELETE /schedules/{}", key);

    if s.sessions.remove(&key) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        session_error_to_response(SessionError::NotFound)
    }
}
