use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use docgraph::app::{build_router, AppState};
use docgraph::auth::oidc::OidcClient;
use docgraph::config::{AppConfig, ConfigOverrides, StorageBackend};
use docgraph::db::memory::{
    InMemoryDocumentRepository, InMemorySessionRepository, InMemoryUserRepository,
};
use docgraph::db::repository::{DocumentRepository, MongoDocumentRepository};
use docgraph::db::user_repository::{
    MongoSessionRepository, MongoUserRepository, SessionRepository, UserRepository,
};
use docgraph::demo_seeder::seed_demo_data;
use docgraph::rendering::pages::PageRenderer;

/// Personal Markdown knowledge base with a browsable link graph.
#[derive(Debug, Parser)]
#[command(name = "docgraph", version, about)]
struct Cli {
    /// Settings file (defaults to `docgraph.toml` in the working directory, if present).
    #[arg(long, env = "DOCGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. `0.0.0.0:3000`.
    #[arg(long)]
    listen: Option<String>,

    /// Storage backend: `mongo` or `memory`.
    #[arg(long)]
    storage: Option<String>,

    /// Enable demo login and seed demo documents.
    #[arg(long)]
    demo: bool,
}

struct Repositories {
    documents: Arc<dyn DocumentRepository>,
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

async fn open_repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Repositories {
                documents: Arc::new(InMemoryDocumentRepository::new()),
                users: Arc::new(InMemoryUserRepository::new()),
                sessions: Arc::new(InMemorySessionRepository::new()),
            })
        }
        StorageBackend::Mongo => {
            let client = mongodb::Client::with_uri_str(&config.mongodb_uri)
                .await
                .context("Failed to connect to MongoDB")?;
            let db = client.database(&config.mongodb_database);

            let documents = MongoDocumentRepository::new(&db);
            let users = MongoUserRepository::new(&db);
            let sessions = MongoSessionRepository::new(&db);
            documents.ensure_indexes().await?;
            users.ensure_indexes().await?;
            sessions.ensure_indexes().await?;

            tracing::info!(
                "Connected to MongoDB at {} (database '{}')",
                config.mongodb_uri,
                config.mongodb_database
            );
            Ok(Repositories {
                documents: Arc::new(documents),
                users: Arc::new(users),
                sessions: Arc::new(sessions),
            })
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(
        cli.config.as_deref(),
        ConfigOverrides {
            listen_addr: cli.listen,
            storage: cli.storage,
            demo_mode: cli.demo.then_some(true),
        },
    )
    .context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!("Starting docgraph server...");

    let repos = open_repositories(&config).await?;

    let oidc = match &config.oidc {
        Some(oidc_config) => {
            let client = OidcClient::discover(oidc_config).await?;
            tracing::info!("OIDC provider discovered at {}", oidc_config.issuer_url);
            Some(Arc::new(client))
        }
        None => {
            tracing::info!("No OIDC provider configured; only demo login is available");
            None
        }
    };

    if config.demo_mode {
        let seeded = seed_demo_data(repos.documents.as_ref(), repos.users.as_ref()).await?;
        tracing::info!("Demo mode enabled ({} documents seeded)", seeded);
    }

    let state = AppState {
        document_repo: repos.documents,
        user_repo: repos.users,
        session_repo: repos.sessions,
        pages: Arc::new(PageRenderer::new(oidc.is_some(), config.demo_mode)?),
        oidc,
        session_ttl: config.session_ttl(),
        secure_cookies: config.secure_cookies,
        demo_mode: config.demo_mode,
    };

    let app = build_router(state, &config.public_dir);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    tracing::info!("Listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
