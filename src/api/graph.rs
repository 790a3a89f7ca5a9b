use axum::extract::State;
use axum::Json;

use crate::app::AppState;
use crate::auth::models::AuthenticatedUser;
use crate::auth::session::CurrentUser;
use crate::db::repository::DocumentRepository;
use crate::error::AppError;
use crate::rendering::graph::{build_graph, GraphData};

/// Core graph logic: the link graph over every document the viewer may read.
pub async fn process_graph(
    repo: &dyn DocumentRepository,
    viewer: Option<&AuthenticatedUser>,
) -> Result<GraphData, AppError> {
    let documents = repo.list_visible(viewer.map(|u| u.id.as_str())).await?;
    let graph = build_graph(&documents);

    tracing::debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "graph built"
    );
    Ok(graph)
}

/// Axum handler for `GET /api/graph`.
pub async fn graph_handler(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<GraphData>, AppError> {
    let graph = process_graph(state.document_repo.as_ref(), current.0.as_ref()).await?;
    Ok(Json(graph))
}
