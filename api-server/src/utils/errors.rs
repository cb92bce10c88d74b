use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shared::database::DatabaseError;
use shared::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("unauthenticated")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Storage(StorageError::Unavailable { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Storage(StorageError::InvalidEndpoint { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Storage(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Database(e) => {
                tracing::error!(error = %e, "Document store request failed");
                json!({ "error": "internal error" })
            }
            ApiError::Storage(e) => {
                tracing::error!(kind = e.kind(), error = %e, "Object storage request failed");
                json!({ "error": e.kind() })
            }
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(format!("invalid multipart body: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(kind: &str) -> StorageError {
        let source = anyhow::anyhow!("boom");
        match kind {
            "unavailable" => StorageError::Unavailable { bucket: "media".into(), source },
            "write" => StorageError::WriteFailed { key: "k".into(), source },
            _ => StorageError::ReadFailed { key: "k".into(), source },
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Database(DatabaseError::Query("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::from(storage("unavailable")).status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ApiError::from(storage("write")).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ApiError::from(storage("read")).status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(ApiError::NotFound.to_string(), "not found");
    }
}
