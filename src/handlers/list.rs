use crate::error::{ApiError, ErrorResponse};
use crate::routes;
use crate::state::AppState;
use crate::storage::Item;
use axum::{extract::State, http::StatusCode, Json};

/// GET /items handler - List every stored item
///
/// Each item is the stored JSON object with its storage-assigned `id`
/// added as a string field. Order is whatever the store yields.
#[utoipa::path(
    get,
    path = routes::ITEMS,
    responses(
        (status = 200, description = "All stored items", body = Vec<serde_json::Value>),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn list_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<Item>>), ApiError> {
    let items = state.store.list_all().await?;

    tracing::info!("Listed {} items", items.len());
    Ok((StatusCode::OK, Json(items)))
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{body_json, get, memory_app, post_json, unreachable_app};
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_list_endpoint_empty() {
        let app = memory_app();

        let response = app.oneshot(get("/items")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_list_after_create_scenario() {
        let app = memory_app();

        let response = app
            .clone()
            .oneshot(post_json("/items", r#"{"name": "widget", "qty": 3}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        let id = created["inserted_id"].as_str().unwrap().to_string();

        let response = app.oneshot(get("/items")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!([{"id": id, "name": "widget", "qty": 3}])
        );
    }

    #[tokio::test]
    async fn test_round_trip_preserves_payload() {
        let app = memory_app();
        let payload = json!({
            "string": "hello",
            "number": 123,
            "float": 45.67,
            "boolean": true,
            "null": null,
            "array": [1, 2, 3],
            "nested": { "key": "value" },
            "unicode": "こんにちは 🚀"
        });

        let response = app
            .clone()
            .oneshot(post_json("/items", payload.to_string()))
            .await
            .unwrap();
        let id = body_json(response).await["inserted_id"].clone();

        let response = app.oneshot(get("/items")).await.unwrap();
        let items = body_json(response).await;
        let items = items.as_array().unwrap();
        assert_eq!(items.len(), 1);

        let mut item = items[0].as_object().unwrap().clone();
        assert_eq!(item.remove("id"), Some(id));
        assert_eq!(serde_json::Value::Object(item), payload);
    }

    #[tokio::test]
    async fn test_repeated_lists_match() {
        let app = memory_app();
        for i in 0..3 {
            app.clone()
                .oneshot(post_json("/items", json!({"index": i}).to_string()))
                .await
                .unwrap();
        }

        let first = body_json(app.clone().oneshot(get("/items")).await.unwrap()).await;
        let second = body_json(app.oneshot(get("/items")).await.unwrap()).await;
        assert_eq!(first.as_array().unwrap().len(), 3);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_list_storage_failure() {
        let app = unreachable_app();

        let response = app.oneshot(get("/items")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("Database error"));
    }
}
