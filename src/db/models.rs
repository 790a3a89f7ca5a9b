use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who may read a document besides its owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Visibility {
    /// Readable by anyone, including anonymous visitors.
    Public,
    /// Readable only by the owner.
    #[default]
    Private,
}

impl Visibility {
    /// The wire/storage representation (`PUBLIC` / `PRIVATE`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "PUBLIC",
            Visibility::Private => "PRIVATE",
        }
    }

    /// Parse a visibility flag (case-insensitive).
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PUBLIC" => Some(Visibility::Public),
            "PRIVATE" => Some(Visibility::Private),
            _ => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-owned Markdown note stored in the `documents` collection.
///
/// Outgoing links are embedded as an ordered list of target ids, so a save
/// replaces content and edges in one single-record write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    /// Raw Markdown content.
    pub content: String,
    pub visibility: Visibility,
    /// Owning user id (opaque, from the identity provider integration).
    pub user_id: String,
    /// Target document ids of outgoing links, in save order.
    #[serde(default)]
    pub links_out: Vec<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Build a fresh document owned by `user_id` with a random id and no links.
    pub fn new(user_id: &str, title: String, content: String, visibility: Visibility) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            content,
            visibility,
            user_id: user_id.to_string(),
            links_out: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// `visibility == PUBLIC` or the viewer is the owner.
    pub fn is_visible_to(&self, viewer: Option<&str>) -> bool {
        self.visibility == Visibility::Public || viewer.is_some_and(|v| self.is_owned_by(v))
    }

    /// Whether this document has an outgoing link to `target_id`.
    pub fn links_to(&self, target_id: &str) -> bool {
        self.links_out.iter().any(|t| t == target_id)
    }
}

/// The fields written by a document save.
///
/// `None` leaves a scalar field unchanged. `links_out` is always written in
/// full: the edge set is replaced, never merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub visibility: Option<Visibility>,
    pub links_out: Vec<String>,
}

impl DocumentChanges {
    /// Apply the changes to an in-memory record, stamping `updated_at`.
    pub fn apply_to(self, doc: &mut Document, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            doc.title = title;
        }
        if let Some(content) = self.content {
            doc.content = content;
        }
        if let Some(visibility) = self.visibility {
            doc.visibility = visibility;
        }
        doc.links_out = self.links_out;
        doc.updated_at = now;
    }
}
