use crate::error::{HealthResponse, UnhealthyResponse};
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// GET /health handler - Health check endpoint
///
/// Asks the store to ping its backend.
/// Returns 200 OK if the database is reachable, 503 Service Unavailable otherwise.
#[utoipa::path(
    get,
    path = routes::HEALTH,
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = UnhealthyResponse)
    ),
    tag = "health"
)]
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<HealthResponse>), (StatusCode, Json<UnhealthyResponse>)> {
    match state.store.health_check().await {
        Ok(_) => {
            tracing::debug!("Health check passed");
            Ok((
                StatusCode::OK,
                Json(HealthResponse {
                    status: "healthy".to_string(),
                }),
            ))
        }
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(UnhealthyResponse {
                    status: "unhealthy".to_string(),
                    error: format!("Cannot connect to database: {}", e),
                }),
            ))
        }
    }
}
