use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::server::endpoints::{courses, schedule, status};
use crate::types::AppState;

mod endpoints;
mod types;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let schedule_router = Router::new()
        .route("/schedules", post(schedule::post_start_schedule))
        .route("/schedules/:session/next", post(schedule::post_next_schedule))
        .route("/schedules/:session", delete(schedule::delete_schedule))
        .route("/check_course", get(courses::get_check_course))
        .route("/courses/:course", get(courses::get_course_offering));

    Router::new()
        .route("/health", get(status::get_health))
        .route("/sessions/stats", get(status::get_session_stats))
        .merge(schedule_router)
        .with_state(app_state)
}
