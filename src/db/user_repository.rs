use async_trait::async_trait;

use crate::auth::models::{ProviderProfile, Session, User};
use crate::error::AppError;

/// Repository trait for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create the user for `(provider, subject)` or refresh its profile,
    /// returning the stored record. The user id never changes once assigned.
    async fn upsert_from_profile(&self, profile: ProviderProfile) -> Result<User, AppError>;

    /// Find a user by its id.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
}

/// Repository trait for login sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: Session) -> Result<(), AppError>;

    /// Find a session by token hash. Expired sessions are still returned;
    /// callers decide what to do with them.
    async fn find(&self, token_hash: &str) -> Result<Option<Session>, AppError>;

    async fn delete(&self, token_hash: &str) -> Result<(), AppError>;
}

/// MongoDB implementation of the UserRepository.
pub struct MongoUserRepository {
    collection: mongodb::Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("users"),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        let account = IndexModel::builder()
            .keys(doc! { "provider": 1, "subject": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection.create_index(account).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn upsert_from_profile(&self, profile: ProviderProfile) -> Result<User, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let filter = doc! {
            "provider": profile.provider.as_str(),
            "subject": profile.subject.as_str(),
        };
        let update = doc! {
            "$set": {
                "name": profile.name,
                "email": profile.email,
                "image": profile.image,
            },
            "$setOnInsert": {
                "_id": uuid::Uuid::new_v4().to_string(),
            }
        };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(filter, update)
            .with_options(options)
            .await?
            .ok_or_else(|| AppError::Database("user upsert returned no document".into()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        use mongodb::bson::doc;

        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }
}

/// MongoDB implementation of the SessionRepository.
pub struct MongoSessionRepository {
    collection: mongodb::Collection<Session>,
}

impl MongoSessionRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("sessions"),
        }
    }

    /// TTL index so MongoDB purges expired sessions on its own.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        let ttl = IndexModel::builder()
            .keys(doc! { "expires_at": 1 })
            .options(
                IndexOptions::builder()
                    .expire_after(std::time::Duration::from_secs(0))
                    .build(),
            )
            .build();

        self.collection.create_index(ttl).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for MongoSessionRepository {
    async fn create(&self, session: Session) -> Result<(), AppError> {
        self.collection.insert_one(&session).await?;
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> Result<Option<Session>, AppError> {
        use mongodb::bson::doc;

        Ok(self.collection.find_one(doc! { "_id": token_hash }).await?)
    }

    async fn delete(&self, token_hash: &str) -> Result<(), AppError> {
        use mongodb::bson::doc;

        self.collection.delete_one(doc! { "_id": token_hash }).await?;
        Ok(())
    }
}
