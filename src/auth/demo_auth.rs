use axum::extract::State;
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::models::{AuthenticatedUser, ProviderProfile};
use crate::auth::session::{session_cookie, start_session};
use crate::error::AppError;

/// Provider name recorded on demo accounts.
pub const DEMO_PROVIDER: &str = "demo";

/// Built-in demo user definition.
#[derive(Debug, Clone)]
struct DemoUser {
    username: &'static str,
    password: &'static str,
    name: &'static str,
    email: &'static str,
}

/// The hard-coded demo users available when `demo_mode` is on.
const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        username: "demo",
        password: "demo",
        name: "Demo User",
        email: "demo@demo.docgraph.dev",
    },
    DemoUser {
        username: "alice",
        password: "alice",
        name: "Alice",
        email: "alice@demo.docgraph.dev",
    },
    DemoUser {
        username: "bob",
        password: "bob",
        name: "Bob",
        email: "bob@demo.docgraph.dev",
    },
];

/// Login request body.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response body. `token` can be used as a bearer token by API clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: AuthenticatedUser,
}

/// Validate demo credentials and return the provider profile to sign in as.
pub fn authenticate_demo_user(username: &str, password: &str) -> Result<ProviderProfile, AppError> {
    DEMO_USERS
        .iter()
        .find(|u| u.username == username && u.password == password)
        .map(demo_profile)
        .ok_or_else(|| AppError::Unauthorized("Invalid username or password".into()))
}

/// Profile of the demo user called `username`, if there is one.
pub fn demo_profile_for(username: &str) -> Option<ProviderProfile> {
    DEMO_USERS
        .iter()
        .find(|u| u.username == username)
        .map(demo_profile)
}

fn demo_profile(user: &DemoUser) -> ProviderProfile {
    ProviderProfile {
        provider: DEMO_PROVIDER.to_string(),
        subject: user.username.to_string(),
        name: Some(user.name.to_string()),
        email: Some(user.email.to_string()),
        image: None,
    }
}

/// Axum handler for `POST /api/auth/demo-login`.
///
/// Validates credentials against the built-in user table and opens a
/// session exactly like the OIDC callback does.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    axum::Json(req): axum::Json<LoginRequest>,
) -> Result<(CookieJar, axum::Json<LoginResponse>), AppError> {
    if !state.demo_mode {
        return Err(AppError::NotFound("Demo login is disabled".into()));
    }

    let profile = authenticate_demo_user(&req.username, &req.password)?;
    let user = state.user_repo.upsert_from_profile(profile).await?;
    let token = start_session(state.session_repo.as_ref(), &user.id, state.session_ttl).await?;

    let jar = jar.add(session_cookie(
        token.clone(),
        state.session_ttl,
        state.secure_cookies,
    ));

    Ok((
        jar,
        axum::Json(LoginResponse {
            message: "Login successful".to_string(),
            token,
            user: user.into(),
        }),
    ))
}
