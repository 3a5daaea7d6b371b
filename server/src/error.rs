//! Maps every failure a handler can hit to a status code and JSON body.
//!
//! # Design
//! Client errors carry their message verbatim in `{"message": ...}`. Server
//! errors are logged with full detail and answered with a fixed message.

use axum::{
    extract::rejection::{BytesRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use todo_core::StoreError;
use tracing::{debug, error};

/// JSON body for every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The request body was not the JSON object the route expects.
    #[error(transparent)]
    Body(#[from] JsonRejection),

    #[error("Failed to deserialize form body: {0}")]
    Form(#[from] serde_urlencoded::de::Error),

    /// The body could not be read off the connection.
    #[error(transparent)]
    BodyRead(#[from] BytesRejection),

    #[error(
        "Expected request with `Content-Type: application/json` or \
         `application/x-www-form-urlencoded`"
    )]
    UnsupportedMediaType,

    /// The blocking store call panicked or was cancelled.
    #[error("store task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(StoreError::Db(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Body(rejection) => rejection.status(),
            ApiError::Form(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BodyRead(rejection) => rejection.status(),
            ApiError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            debug!(status = status.as_u16(), error = %self, "request rejected");
            self.to_string()
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_core::db::DbError;
    use todo_core::{Entity, ValidationErrors};

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError::from(StoreError::not_found(Entity::Todo, 1));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_maps_to_422() {
        let mut errors = ValidationErrors::new();
        errors.add("created_by", "can't be blank");
        let err = ApiError::from(StoreError::from(errors));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.to_string(),
            "Validation failed: Created by can't be blank"
        );
    }

    fn storage_fault() -> ApiError {
        ApiError::from(StoreError::Db(DbError::UnsupportedSchemaVersion {
            db_version: 9,
            latest_supported: 1,
        }))
    }

    #[test]
    fn storage_faults_map_to_500() {
        assert_eq!(storage_fault().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unsupported_media_type_maps_to_415() {
        assert_eq!(
            ApiError::UnsupportedMediaType.status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[tokio::test]
    async fn server_error_response_hides_detail() {
        use http_body_util::BodyExt;

        let response = storage_fault().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.message, "Internal server error");
    }
}
