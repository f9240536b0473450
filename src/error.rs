use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Body returned for every rejected create request
pub const INVALID_DATA: &str = "Invalid data";

/// Error response type
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Response type for unhealthy status
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
}

/// Custom error type for API endpoints
///
/// Maps handler failures to HTTP status codes and a JSON `{"error": ...}`
/// body.
#[derive(Debug)]
pub enum ApiError {
    /// Request body missing or not a JSON object
    InvalidData,
    /// Storage operation error
    DatabaseError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::InvalidData => (StatusCode::BAD_REQUEST, INVALID_DATA.to_string()),
            ApiError::DatabaseError(err) => {
                tracing::error!("Storage operation failed: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", err),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::DatabaseError(err)
    }
}
