#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;

use docgraph::app::{build_router, AppState};
use docgraph::db::memory::{
    InMemoryDocumentRepository, InMemorySessionRepository, InMemoryUserRepository,
};
use docgraph::db::repository::DocumentRepository;
use docgraph::db::user_repository::{SessionRepository, UserRepository};
use docgraph::rendering::pages::PageRenderer;

/// An application wired to in-memory repositories with demo login enabled.
pub struct TestEnv {
    pub router: Router,
    pub documents: Arc<dyn DocumentRepository>,
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl TestEnv {
    pub fn start() -> Self {
        Self::with_demo_mode(true)
    }

    pub fn with_demo_mode(demo_mode: bool) -> Self {
        let documents: Arc<dyn DocumentRepository> = Arc::new(InMemoryDocumentRepository::new());
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let sessions: Arc<dyn SessionRepository> = Arc::new(InMemorySessionRepository::new());

        let state = AppState {
            document_repo: documents.clone(),
            user_repo: users.clone(),
            session_repo: sessions.clone(),
            oidc: None,
            pages: Arc::new(PageRenderer::new(false, demo_mode).expect("Failed to compile templates")),
            session_ttl: chrono::Duration::hours(1),
            secure_cookies: false,
            demo_mode,
        };

        Self {
            router: build_router(state, "public"),
            documents,
            users,
            sessions,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .save_cookies()
            .expect_success_by_default()
            .try_build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .save_cookies()
            .try_build(self.router.clone())
            .expect("Failed to build TestServer")
    }
}

/// Helper: sign `server` in as a demo user. Returns the session token.
pub async fn login(server: &axum_test::TestServer, username: &str) -> String {
    let response = server
        .post("/api/auth/demo-login")
        .json(&serde_json::json!({
            "username": username,
            "password": username
        }))
        .expect_success()
        .await;
    let body: serde_json::Value = response.json();
    body["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}

/// Helper: create a document via the API and return its id.
pub async fn create_document(
    server: &axum_test::TestServer,
    title: &str,
    content: &str,
    visibility: &str,
) -> String {
    let response = server
        .post("/api/documents")
        .json(&serde_json::json!({
            "title": title,
            "content": content,
            "visibility": visibility
        }))
        .expect_success()
        .await;
    let body: serde_json::Value = response.json();
    body["id"].as_str().expect("document id").to_string()
}

/// Helper: replace a document's outgoing links.
pub async fn set_links<S: AsRef<str>>(server: &axum_test::TestServer, id: &str, links: &[S]) {
    let links: Vec<&str> = links.iter().map(AsRef::as_ref).collect();
    server
        .put(&format!("/api/documents/{id}"))
        .json(&serde_json::json!({ "links": links }))
        .expect_success()
        .await;
}
