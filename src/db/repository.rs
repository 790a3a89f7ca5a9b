use async_trait::async_trait;

use crate::db::models::{Document, DocumentChanges, Visibility};
use crate::error::AppError;

/// Repository trait for document and link operations.
///
/// Links live on the source document (`links_out`), so every method here
/// keeps documents and edges consistent together. This trait allows swapping
/// the database layer in tests.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a brand-new document.
    async fn insert(&self, doc: Document) -> Result<(), AppError>;

    /// Find a document by id, regardless of visibility.
    async fn find_by_id(&self, id: &str) -> Result<Option<Document>, AppError>;

    /// Find all documents whose id is in `ids`. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Document>, AppError>;

    /// List documents the viewer may read: public ones plus, for an
    /// authenticated viewer, the ones they own. Oldest first.
    async fn list_visible(&self, viewer: Option<&str>) -> Result<Vec<Document>, AppError>;

    /// Write `changes` to the document in a single record update, replacing
    /// its outgoing edge set. Returns the updated document, or `None` if it
    /// does not exist.
    async fn update(
        &self,
        id: &str,
        changes: DocumentChanges,
    ) -> Result<Option<Document>, AppError>;

    /// Remove every edge that targets the document, then the document itself
    /// (taking its outgoing edges with it). Returns `false` if it did not exist.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;

    /// Total number of stored documents.
    async fn count(&self) -> Result<u64, AppError>;
}

/// MongoDB implementation of the DocumentRepository.
pub struct MongoDocumentRepository {
    collection: mongodb::Collection<Document>,
}

impl MongoDocumentRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("documents"),
        }
    }

    /// Create the secondary indexes used by visibility listing and
    /// incoming-edge cleanup.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::IndexModel;

        let indexes = vec![
            IndexModel::builder().keys(doc! { "user_id": 1 }).build(),
            IndexModel::builder().keys(doc! { "visibility": 1 }).build(),
            IndexModel::builder().keys(doc! { "links_out": 1 }).build(),
        ];

        self.collection.create_indexes(indexes).await?;
        Ok(())
    }

    async fn find_all(&self, filter: mongodb::bson::Document) -> Result<Vec<Document>, AppError> {
        use futures::TryStreamExt;
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "created_at": 1, "_id": 1 })
            .build();

        let cursor = self.collection.find(filter).with_options(options).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }
}

#[async_trait]
impl DocumentRepository for MongoDocumentRepository {
    async fn insert(&self, doc: Document) -> Result<(), AppError> {
        self.collection.insert_one(&doc).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Document>, AppError> {
        use mongodb::bson::doc;

        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Document>, AppError> {
        use mongodb::bson::doc;

        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_all(doc! { "_id": { "$in": ids.to_vec() } }).await
    }

    async fn list_visible(&self, viewer: Option<&str>) -> Result<Vec<Document>, AppError> {
        use mongodb::bson::doc;

        let public = Visibility::Public.as_str();
        let filter = match viewer {
            Some(user_id) => doc! {
                "$or": [
                    { "user_id": user_id },
                    { "visibility": public }
                ]
            },
            None => doc! { "visibility": public },
        };

        self.find_all(filter).await
    }

    async fn update(
        &self,
        id: &str,
        changes: DocumentChanges,
    ) -> Result<Option<Document>, AppError> {
        use mongodb::bson::{doc, Bson, DateTime as BsonDateTime};
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let mut set = doc! {
            "links_out": changes.links_out,
            "updated_at": Bson::DateTime(BsonDateTime::now()),
        };
        if let Some(title) = changes.title {
            set.insert("title", title);
        }
        if let Some(content) = changes.content {
            set.insert("content", content);
        }
        if let Some(visibility) = changes.visibility {
            set.insert("visibility", visibility.as_str());
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Ok(self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .with_options(options)
            .await?)
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        self.collection
            .update_many(
                doc! { "links_out": id },
                doc! { "$pull": { "links_out": id } },
            )
            .await?;

        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count(&self) -> Result<u64, AppError> {
        use mongodb::bson::doc;

        Ok(self.collection.count_documents(doc! {}).await?)
    }
}
