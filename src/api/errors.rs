use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Converts `AppError` into a JSON error response.
///
/// Server-side failures are logged and surfaced with a generic message.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let (status, message) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Database(_) | AppError::Auth(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            ),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::NotFound("doc-1".into()), StatusCode::NOT_FOUND),
            (AppError::Unauthorized("no session".into()), StatusCode::UNAUTHORIZED),
            (AppError::BadRequest("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::Database("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Auth("discovery failed".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_not_found_does_not_echo_detail() {
        let response = AppError::NotFound("private document abc owned by u1".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Not Found");
    }
}
