use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::{Document, Visibility};

/// Minimal reference to a document: enough to label and link it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: String,
    pub title: String,
}

impl From<&Document> for DocumentRef {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.title.clone(),
        }
    }
}

/// An outgoing edge as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingLink {
    pub target_document: DocumentRef,
}

/// An incoming edge as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingLink {
    pub source_document: DocumentRef,
}

/// The stored fields of a document as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    pub visibility: Visibility,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Document> for DocumentRecord {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.title.clone(),
            content: doc.content.clone(),
            visibility: doc.visibility,
            user_id: doc.user_id.clone(),
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// An entry of `GET /api/documents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListItem {
    #[serde(flatten)]
    pub document: DocumentRecord,
    pub links: Vec<OutgoingLink>,
    pub linked_by: Vec<IncomingLink>,
}

/// Owner summary attached to a single-document response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerRef {
    pub id: String,
    pub name: Option<String>,
}

/// Response of `GET /api/documents/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: DocumentRecord,
    pub user: OwnerRef,
    pub links: Vec<OutgoingLink>,
}

/// Body of `POST /api/documents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Defaults to `PRIVATE` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// Body of `PUT /api/documents/:id`.
///
/// Omitted scalar fields are left unchanged. `links` is the complete list of
/// outgoing target ids; when omitted it is derived from `content` (or the
/// stored content if that is omitted too).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,
}

/// Query string of `GET /api/documents`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDocumentsQuery {
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

/// Link-picker filtering: documents whose title contains `term`
/// (case-insensitive), excluding the document being edited.
pub fn filter_by_title<'a>(
    documents: &'a [DocumentListItem],
    term: &str,
    exclude_id: Option<&str>,
) -> Vec<&'a DocumentListItem> {
    let needle = term.to_lowercase();
    documents
        .iter()
        .filter(|d| exclude_id != Some(d.document.id.as_str()))
        .filter(|d| d.document.title.to_lowercase().contains(&needle))
        .collect()
}
