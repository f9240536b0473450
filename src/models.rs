use serde::{Deserialize, Serialize};

pub const ITEM_ADDED: &str = "Item added successfully!";

/// Response type for a successful create
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateItemResponse {
    pub message: String,
    pub inserted_id: String,
}

impl CreateItemResponse {
    pub fn new(inserted_id: String) -> Self {
        Self {
            message: ITEM_ADDED.to_string(),
            inserted_id,
        }
    }
}
