use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::server::types::ApiErrorType;
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckCourseQuery {
    course: String,
}

/// GET /check_course?course=CSE 142
///
/// Reports whether the input names an offered course (and lecture, if one was
/// given) along with the normalized name to submit.
pub async fn get_check_course(
    Query(q): Query<CheckCourseQuery>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /check_course {}", q.course);

    let body = match s.catalog.check_course(&q.course) {
        Ok(request) => json!({ "valid": true, "name": request.to_string() }),
        Err(e) => json!({ "valid": false, "name": null, "reason": e.to_string() }),
    };

    (StatusCode::OK, Json(body)).into_response()
}

/// GET /courses/:course
///
/// Every lecture group of the course, keyed by lecture label.
pub async fn get_course_offering(
    Path(course): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /courses/{}", course);

    let key: String = course.split_whitespace().collect::<String>().to_uppercase();
    match s.catalog.offering(&key) {
        Ok(offering) => (StatusCode::OK, Json(offering)).into_response(),
        Err(e) => ApiErrorType::from((
            StatusCode::NOT_FOUND,
            "Course not offered",
            Some(e.to_string()),
        ))
        .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{CatalogBuilder, Meeting, PlannerConfig, SectionKind, SectionRow};
    use serde_json::Value;

    fn state() -> Arc<AppState> {
        let rows = [("A", SectionKind::Lecture, "MWF"), ("AA", SectionKind::Quiz, "Th")]
            .into_iter()
            .map(|(id, kind, days)| SectionRow {
                course: "CSE142".to_string(),
                kind,
                identifier: id.to_string(),
                lecture: None,
                meeting: Meeting {
                    days: days.to_string(),
                    time: "1130-1220".to_string(),
                    building: "KNE".to_string(),
                    room: "130".to_string(),
                    seats: "200/200".to_string(),
                },
            });
        let catalog = CatalogBuilder::from_rows(rows).unwrap();
        Arc::new(AppState::new(catalog, PlannerConfig::default()))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn query(course: &str) -> Query<CheckCourseQuery> {
        Query(CheckCourseQuery {
            course: course.to_string(),
        })
    }

    #[tokio::test]
    async fn test_check_course_forms() {
        let s = state();

        let json = body_json(get_check_course(query("cse 142"), State(s.clone())).await).await;
        assert_eq!(json["valid"], true);
        assert_eq!(json["name"], "CSE142");

        let json = body_json(get_check_course(query("CSE142A"), State(s.clone())).await).await;
        assert_eq!(json["valid"], true);
        assert_eq!(json["name"], "CSE142 A");

        let json = body_json(get_check_course(query("CSE 142 B"), State(s.clone())).await).await;
        assert_eq!(json["valid"], false);

        let json = body_json(get_check_course(query("MATH 124"), State(s)).await).await;
        assert_eq!(json["valid"], false);
        assert!(json["name"].is_null());
    }

    #[tokio::test]
    async fn test_course_offering() {
        let s = state();

        let response = get_course_offering(Path("CSE 142".to_string()), State(s.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["Lecture A"]["LECT"]["Section"], "A");
        assert_eq!(json["Lecture A"]["QZ"][0]["Section"], "AA");

        let response = get_course_offering(Path("CSE 143".to_string()), State(s)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
