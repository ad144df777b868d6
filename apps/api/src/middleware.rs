use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use opencourse_core::{AppError, CallerIdentity};
use tower_sessions::Session;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves the session into an optional caller identity, once per request.
///
/// Handlers read the resulting `Option<CallerIdentity>` extension and apply
/// the authorization gate themselves, so each endpoint controls its own
/// denial status and body.
pub async fn resolve_caller_identity(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let caller = session
        .get::<CallerIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?;

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

/// Blocks cross-site state-changing requests on cookie-authenticated routes.
pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let is_mutation = matches!(
        *request.method(),
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    );

    if is_mutation {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site")
            && fetch_site == HeaderValue::from_static("cross-site")
        {
            return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed = &state.frontend_url;
        if origin != *allowed && !referer.starts_with(allowed.as_str()) {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}
