//! Session-based authentication endpoints.

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use opencourse_application::{AuthOutcome, RegisterParams};
use opencourse_core::{AppError, CallerIdentity, Role};
use tower_sessions::Session;

use crate::dto::{
    BootstrapRequest, CallerIdentityResponse, GenericMessageResponse, LoginRequest,
    RegisterRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// Session key under which the caller identity is stored.
pub const SESSION_USER_KEY: &str = "caller_identity";

async fn establish_session(session: &Session, identity: &CallerIdentity) -> Result<(), AppError> {
    // OWASP Session Management: regenerate the session id on privilege change.
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })
}

/// POST /auth/login - authenticate with email and password.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<CallerIdentityResponse>> {
    match state
        .user_service
        .login(&payload.email, &payload.password)
        .await?
    {
        AuthOutcome::Authenticated(user) => {
            let identity =
                CallerIdentity::new(user.id.to_string(), user.display_name.clone(), user.role);
            establish_session(&session, &identity).await?;
            Ok(Json(identity.into()))
        }
        AuthOutcome::Failed => {
            Err(AppError::Unauthorized("invalid email or password".to_owned()).into())
        }
    }
}

/// POST /auth/register - create a student account.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<GenericMessageResponse>)> {
    state
        .user_service
        .register(RegisterParams {
            email: payload.email,
            password: payload.password,
            display_name: payload.display_name,
            role: Role::Student,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GenericMessageResponse {
            message: "account created".to_owned(),
        }),
    ))
}

/// POST /auth/bootstrap - token-gated creation of an admin account.
///
/// The only way to provision elevated roles through the API; the token is
/// operator-held startup configuration.
pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<Json<CallerIdentityResponse>> {
    if payload.token != state.bootstrap_token {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let display_name = payload.display_name.clone();
    let user_id = state
        .user_service
        .register(RegisterParams {
            email: payload.email,
            password: payload.password,
            display_name: payload.display_name,
            role: Role::Admin,
        })
        .await?;

    let identity = CallerIdentity::new(user_id.to_string(), display_name, Role::Admin);
    establish_session(&session, &identity).await?;

    Ok(Json(identity.into()))
}

/// POST /auth/logout - destroy the session.
pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me - the caller identity resolved from the session.
pub async fn me_handler(
    Extension(caller): Extension<Option<CallerIdentity>>,
) -> ApiResult<Json<CallerIdentityResponse>> {
    let caller =
        caller.ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    Ok(Json(caller.into()))
}
