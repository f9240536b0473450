use crate::error::{ApiError, ErrorResponse};
use crate::models::CreateItemResponse;
use crate::routes;
use crate::state::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde_json::Value as JsonValue;

/// POST /items handler - Store a new item
///
/// The body must be a JSON object; anything else (no body, malformed
/// JSON, a missing JSON content type, arrays, scalars) is rejected with
/// `{"error": "Invalid data"}`. Field contents are not inspected.
#[utoipa::path(
    post,
    path = routes::ITEMS,
    request_body = serde_json::Value,
    responses(
        (status = 201, description = "Item stored", body = CreateItemResponse),
        (status = 400, description = "Body is not a JSON object", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn create_handler(
    State(state): State<AppState>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateItemResponse>), ApiError> {
    let payload = match payload {
        Ok(Json(JsonValue::Object(map))) => map,
        Ok(Json(other)) => {
            tracing::info!("Rejected item: expected a JSON object, got {}", json_kind(&other));
            return Err(ApiError::InvalidData);
        }
        Err(rejection) => {
            tracing::info!("Rejected item: {}", rejection.body_text());
            return Err(ApiError::InvalidData);
        }
    };

    let inserted_id = state.store.insert(payload).await?;

    tracing::info!("Successfully stored item with id: {}", inserted_id);
    Ok((StatusCode::CREATED, Json(CreateItemResponse::new(inserted_id))))
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
