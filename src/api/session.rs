use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use axum_extra::extract::CookieJar;

use crate::app::AppState;
use crate::auth::models::AuthenticatedUser;
use crate::auth::session::{hash_token, presented_token, removal_cookie, CurrentUser};
use crate::error::AppError;

/// Axum handler for `GET /api/auth/session`.
pub async fn session_handler(current: CurrentUser) -> Result<Json<AuthenticatedUser>, AppError> {
    current
        .0
        .map(Json)
        .ok_or_else(|| AppError::Unauthorized("Not logged in".into()))
}

/// Axum handler for `POST /api/auth/logout`: deletes the session and clears the cookie.
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(StatusCode, CookieJar), AppError> {
    if let Some(token) = presented_token(&headers) {
        state.session_repo.delete(&hash_token(&token)).await?;
        tracing::debug!("session closed");
    }
    Ok((StatusCode::NO_CONTENT, jar.remove(removal_cookie())))
}
