use utoipa::OpenApi;

use crate::error::{ErrorResponse, HealthResponse, UnhealthyResponse};
use crate::handlers;
use crate::models::CreateItemResponse;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "rust-mongo-items API",
        version = "1.0.0",
        description = "Create and list schema-less JSON items stored in MongoDB"
    ),
    paths(
        handlers::health::health_handler,
        handlers::list::list_handler,
        handlers::create::create_handler
    ),
    components(
        schemas(
            CreateItemResponse,
            ErrorResponse,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    tags(
        (name = "health", description = "Health check operations"),
        (name = "items", description = "Item collection operations")
    )
)]
pub struct ApiDoc;
