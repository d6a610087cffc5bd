//! Error handling for the NutriSync API

use axum::{
    http::StatusCode,
    response::{
        IntoResponse,
        Response,
    },
    Json,
};
use postgres_store::StoreError;
use serde::{
    Deserialize,
    Serialize,
};

/// Body of every error response
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorResponse {
    pub error: String,
}

/// API Error types
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body could not be used
    #[error("{message}")]
    BadRequest { message: String },
    /// Request body exceeded the configured limit
    #[error("{message}")]
    PayloadTooLarge { message: String },
    /// Resource not found
    #[error("{message}")]
    NotFound { message: String },
    /// Storage failure while reading or writing
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub const fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> ApiErrorResponse {
        ApiErrorResponse {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let response = self.to_response();

        if status_code.is_server_error() {
            tracing::error!(
                status_code = status_code.as_u16(),
                message = response.error,
                "API Error occurred"
            );
        } else {
            tracing::debug!(
                status_code = status_code.as_u16(),
                message = response.error,
                "Request rejected"
            );
        }

        (status_code, Json(response)).into_response()
    }
}

/// Helper functions for creating common errors
impl ApiError {
    pub fn bad_request(message: &str) -> Self {
        Self::BadRequest {
            message: message.to_string(),
        }
    }

    pub fn invalid_payload(details: &str) -> Self {
        Self::BadRequest {
            message: format!("invalid JSON payload (expect object or array): {details}"),
        }
    }

    pub fn empty_payload() -> Self {
        Self::bad_request("Empty payload")
    }

    pub fn payload_too_large(limit_bytes: usize) -> Self {
        Self::PayloadTooLarge {
            message: format!("request body exceeds {limit_bytes} bytes"),
        }
    }

    pub fn measurement_not_found() -> Self {
        Self::NotFound {
            message: "Data not found".to_string(),
        }
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
