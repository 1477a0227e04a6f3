use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

/// Error body for validation and store failures.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error description
    #[schema(example = "price cannot be negative")]
    pub error: String,
}

/// Error body for missing resources.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotFoundResponse {
    #[schema(example = "Product not found")]
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    DatabaseError(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ValidationError(String),
}

impl ServiceError {
    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<mongodb::error::Error> for ServiceError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::{ErrorKind, WriteFailure};

        // The only unique index in this service is on `sku`, so a duplicate-key
        // failure is always a sku collision and belongs in the validation bucket.
        let duplicate = match &*err.kind {
            ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == 11000,
            ErrorKind::Command(ce) => ce.code == 11000,
            _ => false,
        };

        if duplicate {
            ServiceError::ValidationError("sku must be unique".to_string())
        } else {
            ServiceError::DatabaseError(err.to_string())
        }
    }
}

impl From<bson::ser::Error> for ServiceError {
    fn from(err: bson::ser::Error) -> Self {
        ServiceError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            // Missing resources carry a `message`, everything else an `error`.
            Self::NotFound(msg) => json!({ "message": msg }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// API error type for HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    ServiceError(#[from] ServiceError),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::ServiceError(err) => err.into_response(),
            Self::ValidationError(msg) => ServiceError::ValidationError(msg).into_response(),
            Self::NotFound(msg) => ServiceError::NotFound(msg).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = ServiceError::NotFound("Product not found".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_maps_to_400() {
        let err = ServiceError::ValidationError("price cannot be negative".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_maps_to_500() {
        let err = ServiceError::DatabaseError("connection reset".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
