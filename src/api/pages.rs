use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::api::documents::process_get_document;
use crate::app::AppState;
use crate::auth::session::CurrentUser;
use crate::error::AppError;

/// Axum handler for `GET /`, the link graph page.
pub async fn graph_page_handler(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Html<String>, AppError> {
    Ok(Html(state.pages.graph_page(current.0.as_ref())?))
}

/// Axum handler for `GET /documents/{id}`: the rendered document, or the
/// not-found page under the same visibility rule as the JSON API.
pub async fn document_page_handler(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let viewer = current.0.as_ref();
    match process_get_document(
        state.document_repo.as_ref(),
        state.user_repo.as_ref(),
        viewer,
        &id,
    )
    .await
    {
        Ok(detail) => Ok(Html(state.pages.document_page(viewer, &detail)?).into_response()),
        Err(AppError::NotFound(_)) => {
            let page = state.pages.not_found_page(viewer, &id)?;
            Ok((StatusCode::NOT_FOUND, Html(page)).into_response())
        }
        Err(e) => Err(e),
    }
}
