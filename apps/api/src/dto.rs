//! Wire types for the HTTP API.

use opencourse_core::{AppError, CallerIdentity};
use opencourse_domain::{Course, CourseDraft, CourseId};
use serde::{Deserialize, Serialize};

/// Incoming partial course record for the upsert endpoint.
///
/// Any subset of fields may be present; unknown fields are ignored. An empty
/// `id` string is treated as absent, matching how callers signal "create".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseUpsertRequest {
    pub id: Option<String>,
    pub instructor: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub students: Option<u32>,
}

impl TryFrom<CourseUpsertRequest> for CourseDraft {
    type Error = AppError;

    fn try_from(request: CourseUpsertRequest) -> Result<Self, Self::Error> {
        let id = request
            .id
            .filter(|id| !id.is_empty())
            .map(CourseId::new)
            .transpose()?;

        Ok(Self {
            id,
            instructor: request.instructor,
            title: request.title,
            description: request.description,
            created_at: request.created_at,
            students: request.students,
        })
    }
}

/// Outgoing course record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: String,
    pub instructor: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
    pub students: u32,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id.into(),
            instructor: course.instructor,
            title: course.title,
            description: course.description,
            created_at: course.created_at,
            updated_at: course.updated_at,
            students: course.students,
        }
    }
}

/// Success payload for the course upsert endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpsertResponse {
    pub message: String,
    pub course_id: String,
}

/// Incoming payload for email/password login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Incoming payload for self-service registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Incoming payload for token-gated admin bootstrap.
#[derive(Debug, Deserialize)]
pub struct BootstrapRequest {
    pub token: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Caller identity as returned by login and `/auth/me`.
#[derive(Debug, Serialize)]
pub struct CallerIdentityResponse {
    pub subject: String,
    pub display_name: Option<String>,
    pub role: String,
}

impl From<CallerIdentity> for CallerIdentityResponse {
    fn from(identity: CallerIdentity) -> Self {
        Self {
            subject: identity.subject().to_owned(),
            display_name: identity.display_name().map(ToOwned::to_owned),
            role: identity.role().as_str().to_owned(),
        }
    }
}

/// Generic message payload.
#[derive(Debug, Serialize)]
pub struct GenericMessageResponse {
    pub message: String,
}
