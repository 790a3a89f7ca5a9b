use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};

use crate::app::AppState;
use crate::auth::models::{AuthenticatedUser, Session};
use crate::db::user_repository::{SessionRepository, UserRepository};
use crate::error::AppError;

/// Cookie carrying the raw session token.
pub const SESSION_COOKIE: &str = "docgraph_session";

/// A fresh random session token (32 bytes, URL-safe base64).
pub fn generate_token() -> String {
    URL_SAFE_NO_PAD.encode(rand::random::<[u8; 32]>())
}

/// Hex SHA-256 of a token; the only form in which tokens are stored.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Persist a new session for `user_id` and return the raw token.
pub async fn start_session(
    sessions: &dyn SessionRepository,
    user_id: &str,
    ttl: Duration,
) -> Result<String, AppError> {
    let token = generate_token();
    sessions
        .create(Session {
            token_hash: hash_token(&token),
            user_id: user_id.to_string(),
            expires_at: Utc::now() + ttl,
        })
        .await?;
    Ok(token)
}

/// Resolve a raw token to the user it belongs to.
///
/// Unknown tokens, expired sessions and sessions of vanished users all
/// resolve to `None`; expired sessions are deleted on the way.
pub async fn resolve_session(
    sessions: &dyn SessionRepository,
    users: &dyn UserRepository,
    token: &str,
) -> Result<Option<AuthenticatedUser>, AppError> {
    let token_hash = hash_token(token);
    let Some(session) = sessions.find(&token_hash).await? else {
        return Ok(None);
    };

    if session.is_expired(Utc::now()) {
        sessions.delete(&token_hash).await?;
        return Ok(None);
    }

    Ok(users
        .find_by_id(&session.user_id)
        .await?
        .map(AuthenticatedUser::from))
}

/// The session cookie for a freshly issued token.
pub fn session_cookie(token: String, ttl: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

/// A cookie that clears the session cookie in the browser.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").removal().build()
}

/// The raw token presented by a request: `Authorization: Bearer` wins over
/// the cookie.
pub fn presented_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// The actor behind a request, or `None` for anonymous callers.
///
/// Never rejects for a missing or stale session; handlers decide whether
/// anonymous access is acceptable.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = presented_token(&parts.headers) else {
            return Ok(CurrentUser(None));
        };

        let user = resolve_session(
            state.session_repo.as_ref(),
            state.user_repo.as_ref(),
            &token,
        )
        .await?;

        Ok(CurrentUser(user))
    }
}
