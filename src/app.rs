use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::handlers::{create_handler, health_handler, list_handler};
use crate::routes;
use crate::state::AppState;

/// Build the service router with tracing and API docs attached
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(routes::HEALTH, get(health_handler))
        .route(routes::ITEMS, get(list_handler).post(create_handler))
        .merge(SwaggerUi::new(routes::SWAGGER_UI).url(routes::OPENAPI_JSON, ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
