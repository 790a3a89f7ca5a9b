use thiserror::Error;

/// Application-wide error types.
///
/// `NotFound` deliberately covers "does not exist", "private and not yours"
/// and "not the owner" so responses never reveal which private documents exist.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the error is a server-side failure (maps to a 5xx status).
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            AppError::Database(_) | AppError::Auth(_) | AppError::Internal(_)
        )
    }
}

/// Helper conversion from anyhow::Error
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Database(err.to_string())
    }
}
