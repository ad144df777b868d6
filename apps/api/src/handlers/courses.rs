//! The instructor course surface: authorization-gated listing and upsert.
//!
//! Denial statuses and bodies are part of the public contract and differ
//! between the two endpoints, so the mapping from gate errors to responses
//! lives here rather than in the generic error wrapper.

use axum::Json;
use axum::extract::{Extension, State};
use opencourse_application::{UpsertOutcome, course_policy};
use opencourse_core::{AppError, CallerIdentity};
use opencourse_domain::CourseDraft;
use tracing::error;

use crate::dto::{CourseResponse, CourseUpsertRequest, CourseUpsertResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/courses/instructor - course records visible to the caller.
///
/// Admins receive every record; instructors receive only records whose
/// instructor matches their display name.
pub async fn list_instructor_courses_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Option<CallerIdentity>>,
) -> ApiResult<Json<Vec<CourseResponse>>> {
    let courses = state
        .course_service
        .list_instructor_courses(caller.as_ref())
        .await
        .map_err(|err| match err {
            AppError::Unauthorized(_) => AppError::Unauthorized("Unauthorized".to_owned()),
            AppError::Forbidden(_) => AppError::Forbidden(
                "Unauthorized - Only instructors or admins can access instructor courses"
                    .to_owned(),
            ),
            other => {
                error!(error = %other, "failed to fetch instructor courses");
                AppError::Internal("Failed to fetch instructor courses".to_owned())
            }
        })?;

    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

/// POST /api/courses/instructor - insert-or-update a course record.
///
/// Both unauthenticated and role-denied callers receive the documented 401
/// body on this endpoint.
pub async fn upsert_course_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Option<CallerIdentity>>,
    Json(payload): Json<CourseUpsertRequest>,
) -> ApiResult<Json<CourseUpsertResponse>> {
    // The documented denial applies before the body is even looked at.
    course_policy::can_create_or_update_course(caller.as_ref()).map_err(|_| {
        AppError::Unauthorized(
            "Unauthorized - Only instructors or admins can create courses".to_owned(),
        )
    })?;

    let draft = CourseDraft::try_from(payload)?;

    let upsert = state
        .course_service
        .upsert_course(caller.as_ref(), draft)
        .await
        .map_err(|err| match err {
            AppError::Unauthorized(_) | AppError::Forbidden(_) => AppError::Unauthorized(
                "Unauthorized - Only instructors or admins can create courses".to_owned(),
            ),
            other => {
                error!(error = %other, "failed to create or update course");
                AppError::Internal("Failed to create/update course".to_owned())
            }
        })?;

    let message = match upsert.outcome {
        UpsertOutcome::Created => "Course created successfully",
        UpsertOutcome::Updated => "Course updated successfully",
    };

    Ok(Json(CourseUpsertResponse {
        message: message.to_owned(),
        course_id: upsert.course_id.into(),
    }))
}
