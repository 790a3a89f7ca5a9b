use axum::extract::{Query, State};
use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use openidconnect::core::{CoreAuthenticationFlow, CoreClient, CoreProviderMetadata};
use openidconnect::{
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointMaybeSet, EndpointNotSet,
    EndpointSet, IssuerUrl, Nonce, RedirectUrl, Scope, TokenResponse,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::config::OidcConfig;
use crate::auth::models::ProviderProfile;
use crate::auth::session::{session_cookie, start_session};
use crate::error::AppError;

const STATE_COOKIE: &str = "docgraph_oidc_state";
const NONCE_COOKIE: &str = "docgraph_oidc_nonce";

/// Client shape produced by provider discovery.
type DiscoveredClient = CoreClient<
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointMaybeSet,
    EndpointMaybeSet,
>;

/// Authorization-code flow against a discovered OIDC provider.
pub struct OidcClient {
    client: DiscoveredClient,
    http: reqwest::Client,
    provider_name: String,
}

impl OidcClient {
    /// Discover the provider metadata and build the client.
    pub async fn discover(config: &OidcConfig) -> Result<Self, AppError> {
        config.validate()?;

        // Token exchange must not follow redirects.
        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AppError::Auth(format!("Failed to build HTTP client: {e}")))?;

        let issuer = IssuerUrl::new(config.issuer_url.clone())
            .map_err(|e| AppError::Auth(format!("Invalid issuer URL: {e}")))?;
        let redirect = RedirectUrl::new(config.redirect_uri.clone())
            .map_err(|e| AppError::Auth(format!("Invalid redirect URL: {e}")))?;

        let metadata = CoreProviderMetadata::discover_async(issuer, &http)
            .await
            .map_err(|e| AppError::Auth(format!("Failed to discover OIDC provider: {e}")))?;

        let client = CoreClient::from_provider_metadata(
            metadata,
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
        )
        .set_redirect_uri(redirect);

        Ok(Self {
            client,
            http,
            provider_name: config.provider_name.clone(),
        })
    }

    /// The provider URL to send the browser to, plus the CSRF state and
    /// nonce that must come back with the callback.
    pub fn authorize_url(&self) -> (openidconnect::url::Url, CsrfToken, Nonce) {
        self.client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                CsrfToken::new_random,
                Nonce::new_random,
            )
            .add_scope(Scope::new("profile".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .url()
    }

    /// Exchange an authorization code and verify the ID token.
    pub async fn exchange(&self, code: String, nonce: &Nonce) -> Result<ProviderProfile, AppError> {
        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .map_err(|e| AppError::Auth(format!("Token endpoint not configured: {e}")))?
            .request_async(&self.http)
            .await
            .map_err(|e| AppError::Auth(format!("Failed to exchange code: {e}")))?;

        let id_token = token_response
            .id_token()
            .ok_or_else(|| AppError::Auth("Provider returned no ID token".into()))?;
        let claims = id_token
            .claims(&self.client.id_token_verifier(), nonce)
            .map_err(|e| AppError::Unauthorized(format!("Invalid ID token: {e}")))?;

        Ok(ProviderProfile {
            provider: self.provider_name.clone(),
            subject: claims.subject().as_str().to_string(),
            name: claims
                .name()
                .and_then(|n| n.get(None))
                .map(|n| n.as_str().to_string()),
            email: claims.email().map(|e| e.as_str().to_string()),
            image: claims
                .picture()
                .and_then(|p| p.get(None))
                .map(|p| p.as_str().to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthCallbackQuery {
    pub code: String,
    pub state: String,
}

fn flow_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/api/auth")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(10))
        .build()
}

fn clear_flow_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/api/auth").removal().build()
}

/// Axum handler for `GET /api/auth/login`: redirects to the identity provider.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let oidc = state
        .oidc
        .as_ref()
        .ok_or_else(|| AppError::NotFound("OIDC login is not configured".into()))?;

    let (auth_url, csrf_token, nonce) = oidc.authorize_url();

    let jar = jar
        .add(flow_cookie(STATE_COOKIE, csrf_token.secret().clone(), state.secure_cookies))
        .add(flow_cookie(NONCE_COOKIE, nonce.secret().clone(), state.secure_cookies));

    Ok((jar, Redirect::to(auth_url.as_str())))
}

/// Axum handler for `GET /api/auth/callback`: completes the login and opens a session.
pub async fn callback_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<AuthCallbackQuery>,
) -> Result<(CookieJar, Redirect), AppError> {
    let oidc = state
        .oidc
        .as_ref()
        .ok_or_else(|| AppError::NotFound("OIDC login is not configured".into()))?;

    let expected_state = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    if expected_state.as_deref() != Some(query.state.as_str()) {
        return Err(AppError::BadRequest("Invalid CSRF state".into()));
    }
    let nonce = jar
        .get(NONCE_COOKIE)
        .map(|c| Nonce::new(c.value().to_string()))
        .ok_or_else(|| AppError::BadRequest("Missing login nonce".into()))?;

    let profile = oidc.exchange(query.code, &nonce).await?;
    let user = state.user_repo.upsert_from_profile(profile).await?;
    let token = start_session(state.session_repo.as_ref(), &user.id, state.session_ttl).await?;

    tracing::info!(user_id = %user.id, "user signed in");

    let jar = jar
        .remove(clear_flow_cookie(STATE_COOKIE))
        .remove(clear_flow_cookie(NONCE_COOKIE))
        .add(session_cookie(token, state.session_ttl, state.secure_cookies));

    Ok((jar, Redirect::to("/")))
}
