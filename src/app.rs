use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::{documents, graph, pages, session};
use crate::auth::{demo_auth, oidc};
use crate::auth::oidc::OidcClient;
use crate::db::repository::DocumentRepository;
use crate::db::user_repository::{SessionRepository, UserRepository};
use crate::rendering::pages::PageRenderer;

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub document_repo: Arc<dyn DocumentRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub session_repo: Arc<dyn SessionRepository>,
    /// `None` when no `[oidc]` provider is configured.
    pub oidc: Option<Arc<OidcClient>>,
    pub pages: Arc<PageRenderer>,
    pub session_ttl: chrono::Duration,
    pub secure_cookies: bool,
    pub demo_mode: bool,
}

/// Build the HTTP router: JSON API, HTML pages and `/public` assets.
pub fn build_router(state: AppState, public_dir: &str) -> Router {
    let api = Router::new()
        .route(
            "/documents",
            get(documents::list_documents_handler).post(documents::create_document_handler),
        )
        .route(
            "/documents/{id}",
            get(documents::get_document_handler)
                .put(documents::update_document_handler)
                .delete(documents::delete_document_handler),
        )
        .route("/graph", get(graph::graph_handler))
        .route("/auth/session", get(session::session_handler))
        .route("/auth/login", get(oidc::login_handler))
        .route("/auth/callback", get(oidc::callback_handler))
        .route("/auth/demo-login", post(demo_auth::login_handler))
        .route("/auth/logout", post(session::logout_handler));

    Router::new()
        .route("/", get(pages::graph_page_handler))
        .route("/documents/{id}", get(pages::document_page_handler))
        .nest("/api", api)
        .nest_service("/public", ServeDir::new(public_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new()),
        )
        .with_state(state)
}
