use std::collections::{HashMap, HashSet};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::app::AppState;
use crate::auth::models::AuthenticatedUser;
use crate::auth::session::CurrentUser;
use crate::db::models::{Document, DocumentChanges};
use crate::db::repository::DocumentRepository;
use crate::db::user_repository::UserRepository;
use crate::error::AppError;
use crate::models::document::{
    CreateDocumentRequest, DocumentDetail, DocumentListItem, DocumentRecord, DocumentRef,
    IncomingLink, ListDocumentsQuery, OutgoingLink, OwnerRef, UpdateDocumentRequest,
};
use crate::rendering::links::{dedup_targets, extract_document_links};

fn require_actor(actor: Option<&AuthenticatedUser>) -> Result<&AuthenticatedUser, AppError> {
    actor.ok_or_else(|| AppError::Unauthorized("Authentication required".into()))
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Document '{}' not found", id))
}

fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("Title cannot be empty".into()));
    }
    Ok(())
}

/// Load a document the actor owns. Missing and foreign documents are
/// indistinguishable.
async fn find_owned(
    repo: &dyn DocumentRepository,
    actor: &AuthenticatedUser,
    id: &str,
) -> Result<Document, AppError> {
    repo.find_by_id(id)
        .await?
        .filter(|doc| doc.is_owned_by(&actor.id))
        .ok_or_else(|| not_found(id))
}

/// Outgoing links of `doc` whose targets the viewer may see, in save order.
async fn visible_outgoing(
    repo: &dyn DocumentRepository,
    doc: &Document,
    viewer: Option<&str>,
) -> Result<Vec<OutgoingLink>, AppError> {
    if doc.links_out.is_empty() {
        return Ok(Vec::new());
    }
    let targets: HashMap<String, Document> = repo
        .find_by_ids(&doc.links_out)
        .await?
        .into_iter()
        .filter(|t| t.is_visible_to(viewer))
        .map(|t| (t.id.clone(), t))
        .collect();

    Ok(doc
        .links_out
        .iter()
        .filter_map(|id| targets.get(id))
        .map(|t| OutgoingLink {
            target_document: DocumentRef::from(t),
        })
        .collect())
}

async fn build_detail(
    repo: &dyn DocumentRepository,
    users: &dyn UserRepository,
    doc: &Document,
    viewer: Option<&str>,
) -> Result<DocumentDetail, AppError> {
    let owner = users.find_by_id(&doc.user_id).await?;
    let links = visible_outgoing(repo, doc, viewer).await?;

    Ok(DocumentDetail {
        document: DocumentRecord::from(doc),
        user: OwnerRef {
            id: doc.user_id.clone(),
            name: owner.and_then(|u| u.name),
        },
        links,
    })
}

/// Core listing logic: every document the viewer may read, each with its
/// outgoing and incoming links restricted to readable endpoints.
pub async fn process_list_documents(
    repo: &dyn DocumentRepository,
    viewer: Option<&AuthenticatedUser>,
    query: ListDocumentsQuery,
) -> Result<Vec<DocumentListItem>, AppError> {
    let viewer_id = viewer.map(|u| u.id.as_str());
    let documents = repo.list_visible(viewer_id).await?;
    let by_id: HashMap<&str, &Document> = documents.iter().map(|d| (d.id.as_str(), d)).collect();

    Ok(documents
        .iter()
        .filter(|doc| query.visibility.map_or(true, |v| doc.visibility == v))
        .map(|doc| {
            let links = doc
                .links_out
                .iter()
                .filter_map(|target| by_id.get(target.as_str()))
                .map(|target| OutgoingLink {
                    target_document: DocumentRef::from(*target),
                })
                .collect();
            let linked_by = documents
                .iter()
                .filter(|source| source.links_to(&doc.id))
                .map(|source| IncomingLink {
                    source_document: DocumentRef::from(source),
                })
                .collect();

            DocumentListItem {
                document: DocumentRecord::from(doc),
                links,
                linked_by,
            }
        })
        .collect())
}

/// Core creation logic. New documents start without links; edges are
/// written by the first save.
pub async fn process_create_document(
    repo: &dyn DocumentRepository,
    actor: Option<&AuthenticatedUser>,
    request: CreateDocumentRequest,
) -> Result<DocumentRecord, AppError> {
    let actor = require_actor(actor)?;
    validate_title(&request.title)?;

    let doc = Document::new(
        &actor.id,
        request.title,
        request.content,
        request.visibility.unwrap_or_default(),
    );
    repo.insert(doc.clone()).await?;

    tracing::info!(document_id = %doc.id, user_id = %actor.id, "document created");
    Ok(DocumentRecord::from(&doc))
}

/// Core read logic. A document the viewer may not read is reported as
/// missing.
pub async fn process_get_document(
    repo: &dyn DocumentRepository,
    users: &dyn UserRepository,
    viewer: Option<&AuthenticatedUser>,
    id: &str,
) -> Result<DocumentDetail, AppError> {
    let viewer_id = viewer.map(|u| u.id.as_str());
    let doc = repo
        .find_by_id(id)
        .await?
        .filter(|doc| doc.is_visible_to(viewer_id))
        .ok_or_else(|| not_found(id))?;

    build_detail(repo, users, &doc, viewer_id).await
}

/// Core save logic: writes the supplied fields and replaces the complete
/// outgoing edge set in one record update.
pub async fn process_update_document(
    repo: &dyn DocumentRepository,
    users: &dyn UserRepository,
    actor: Option<&AuthenticatedUser>,
    id: &str,
    request: UpdateDocumentRequest,
) -> Result<DocumentDetail, AppError> {
    let actor = require_actor(actor)?;
    let existing = find_owned(repo, actor, id).await?;

    if let Some(title) = &request.title {
        validate_title(title)?;
    }

    // Derived links may point at documents deleted since the content was
    // written; only an explicit list is held to existing targets.
    let explicit = request.links.is_some();
    let targets = match request.links {
        Some(links) => links,
        None => extract_document_links(request.content.as_deref().unwrap_or(&existing.content)),
    };
    let mut targets = dedup_targets(targets);

    if !targets.is_empty() {
        let found = repo.find_by_ids(&targets).await?;
        let known: HashSet<&str> = found.iter().map(|d| d.id.as_str()).collect();

        let unknown: Vec<String> = targets
            .iter()
            .filter(|t| !known.contains(t.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            if explicit {
                return Err(AppError::BadRequest(format!(
                    "Unknown link target(s): {}",
                    unknown.join(", ")
                )));
            }
            tracing::warn!(
                document_id = %id,
                dropped = ?unknown,
                "content links to missing documents"
            );
            targets.retain(|t| known.contains(t.as_str()));
        }

        for hidden in found.iter().filter(|d| !d.is_visible_to(Some(actor.id.as_str()))) {
            tracing::warn!(
                document_id = %id,
                target_id = %hidden.id,
                "link targets a document the editor cannot read"
            );
        }
    }

    let edge_count = targets.len();
    let changes = DocumentChanges {
        title: request.title,
        content: request.content,
        visibility: request.visibility,
        links_out: targets,
    };
    let updated = repo.update(id, changes).await?.ok_or_else(|| not_found(id))?;

    tracing::info!(document_id = %id, links = edge_count, "document saved");
    build_detail(repo, users, &updated, Some(actor.id.as_str())).await
}

/// Core deletion logic: removes every edge touching the document, then the
/// document.
pub async fn process_delete_document(
    repo: &dyn DocumentRepository,
    actor: Option<&AuthenticatedUser>,
    id: &str,
) -> Result<(), AppError> {
    let actor = require_actor(actor)?;
    find_owned(repo, actor, id).await?;

    if !repo.delete(id).await? {
        return Err(not_found(id));
    }

    tracing::info!(document_id = %id, user_id = %actor.id, "document deleted");
    Ok(())
}

/// Axum handler for `GET /api/documents`.
pub async fn list_documents_handler(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<Vec<DocumentListItem>>, AppError> {
    let result =
        process_list_documents(state.document_repo.as_ref(), current.0.as_ref(), query).await?;
    Ok(Json(result))
}

/// Axum handler for `POST /api/documents`.
pub async fn create_document_handler(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentRecord>), AppError> {
    let record =
        process_create_document(state.document_repo.as_ref(), current.0.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Axum handler for `GET /api/documents/{id}`.
pub async fn get_document_handler(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DocumentDetail>, AppError> {
    let result = process_get_document(
        state.document_repo.as_ref(),
        state.user_repo.as_ref(),
        current.0.as_ref(),
        &id,
    )
    .await?;
    Ok(Json(result))
}

/// Axum handler for `PUT /api/documents/{id}`.
pub async fn update_document_handler(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateDocumentRequest>,
) -> Result<Json<DocumentDetail>, AppError> {
    let result = process_update_document(
        state.document_repo.as_ref(),
        state.user_repo.as_ref(),
        current.0.as_ref(),
        &id,
        request,
    )
    .await?;
    Ok(Json(result))
}

/// Axum handler for `DELETE /api/documents/{id}`.
pub async fn delete_document_handler(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    process_delete_document(state.document_repo.as_ref(), current.0.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
