pub mod memory;
pub mod mongo;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

use crate::config::{Config, StorageBackend};

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// A schema-less JSON document.
pub type Item = Map<String, JsonValue>;

/// Key under which the storage-assigned identifier is rendered.
pub const ID_FIELD: &str = "id";

/// Durable storage for items
///
/// Implementations must be safe to share across concurrently running
/// handlers; the service holds a single instance for its whole lifetime.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Return every stored item with its `id` rendered as a string.
    ///
    /// Ordering is whatever the backend yields and is not stable.
    async fn list_all(&self) -> Result<Vec<Item>>;

    /// Persist `payload` as a new item and return its fresh identifier
    async fn insert(&self, payload: Item) -> Result<String>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> Result<()>;
}

/// Build the store selected by `config.storage_backend`
pub async fn from_config(config: &Config) -> Result<Arc<dyn ItemStore>> {
    match config.storage_backend {
        StorageBackend::MongoDb => Ok(Arc::new(MongoStore::from_config(config).await?)),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; items are lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Render a stored item: `id` first, followed by the payload fields.
///
/// A payload field named `id` is shadowed by the storage identifier.
pub(crate) fn render_item(id: String, payload: Item) -> Item {
    let mut item = Item::with_capacity(payload.len() + 1);
    item.insert(ID_FIELD.to_string(), JsonValue::String(id));
    for (key, value) in payload {
        if key != ID_FIELD {
            item.insert(key, value);
        }
    }
    item
}
