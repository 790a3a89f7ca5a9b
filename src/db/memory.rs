//! In-process repositories, selected with `storage = "memory"`.
//!
//! They mirror the MongoDB implementations' semantics (ordering, edge
//! cleanup, upsert-by-account) so the HTTP layer can be exercised without a
//! database. Nothing survives a restart.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::auth::models::{ProviderProfile, Session, User};
use crate::db::models::{Document, DocumentChanges};
use crate::db::repository::DocumentRepository;
use crate::db::user_repository::{SessionRepository, UserRepository};
use crate::error::AppError;

#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn insert(&self, doc: Document) -> Result<(), AppError> {
        let mut docs = self.documents.write();
        if docs.iter().any(|d| d.id == doc.id) {
            return Err(AppError::Database(format!("duplicate document id '{}'", doc.id)));
        }
        docs.push(doc);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Document>, AppError> {
        Ok(self.documents.read().iter().find(|d| d.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Document>, AppError> {
        Ok(self
            .documents
            .read()
            .iter()
            .filter(|d| ids.contains(&d.id))
            .cloned()
            .collect())
    }

    async fn list_visible(&self, viewer: Option<&str>) -> Result<Vec<Document>, AppError> {
        Ok(self
            .documents
            .read()
            .iter()
            .filter(|d| d.is_visible_to(viewer))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: &str,
        changes: DocumentChanges,
    ) -> Result<Option<Document>, AppError> {
        let mut docs = self.documents.write();
        let Some(doc) = docs.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        changes.apply_to(doc, Utc::now());
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut docs = self.documents.write();
        for doc in docs.iter_mut() {
            doc.links_out.retain(|target| target != id);
        }
        let before = docs.len();
        docs.retain(|d| d.id != id);
        Ok(docs.len() < before)
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.documents.read().len() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn upsert_from_profile(&self, profile: ProviderProfile) -> Result<User, AppError> {
        let mut users = self.users.write();
        if let Some(user) = users
            .iter_mut()
            .find(|u| u.provider == profile.provider && u.subject == profile.subject)
        {
            user.name = profile.name;
            user.email = profile.email;
            user.image = profile.image;
            return Ok(user.clone());
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            provider: profile.provider,
            subject: profile.subject,
            name: profile.name,
            email: profile.email,
            image: profile.image,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().iter().find(|u| u.id == id).cloned())
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: Session) -> Result<(), AppError> {
        self.sessions
            .write()
            .insert(session.token_hash.clone(), session);
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> Result<Option<Session>, AppError> {
        Ok(self.sessions.read().get(token_hash).cloned())
    }

    async fn delete(&self, token_hash: &str) -> Result<(), AppError> {
        self.sessions.write().remove(token_hash);
        Ok(())
    }
}
