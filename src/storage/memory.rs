use anyhow::Result;
use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{render_item, Item, ItemStore};

/// Process-local item store
///
/// Identifiers are BSON object ids so they look the same as the ones
/// MongoDB hands out.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<Vec<(String, Item)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Item>> {
        let items = self.items.read().await;
        tracing::debug!("Listed {} items from memory", items.len());
        Ok(items
            .iter()
            .map(|(id, payload)| render_item(id.clone(), payload.clone()))
            .collect())
    }

    async fn insert(&self, mut payload: Item) -> Result<String> {
        payload.remove("_id");
        let id = ObjectId::new().to_hex();
        self.items.write().await.push((id.clone(), payload));
        tracing::debug!("Inserted item with id: {}", id);
        Ok(id)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value as JsonValue};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn as_item(value: JsonValue) -> Item {
        match value {
            JsonValue::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_list_all_empty() {
        let store = MemoryStore::new();
        let items = store.list_all().await.unwrap();
        assert!(items.is_empty(), "Fresh store should be empty");
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let store = MemoryStore::new();
        let payload = as_item(json!({"name": "widget", "qty": 3}));

        let id = store.insert(payload).await.unwrap();
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));

        let items = store.list_all().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(
            JsonValue::Object(items[0].clone()),
            json!({"id": id, "name": "widget", "qty": 3})
        );
    }

    #[tokio::test]
    async fn test_client_supplied_object_id_is_ignored() {
        let store = MemoryStore::new();
        let id = store
            .insert(as_item(json!({"_id": "mine", "name": "widget"})))
            .await
            .unwrap();
        assert_ne!(id, "mine");

        let items = store.list_all().await.unwrap();
        assert!(!items[0].contains_key("_id"));
        assert_eq!(items[0]["id"], json!(id));
    }

    #[tokio::test]
    async fn test_concurrent_inserts_get_distinct_ids() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.insert(as_item(json!({"index": i}))).await })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().unwrap());
        }

        assert_eq!(ids.len(), 64, "Every insert should get its own id");
        assert_eq!(store.list_all().await.unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_repeated_reads_are_identical() {
        let store = MemoryStore::new();
        store.insert(as_item(json!({"a": 1}))).await.unwrap();
        store.insert(as_item(json!({"b": [true, null]}))).await.unwrap();

        let first = store.list_all().await.unwrap();
        let second = store.list_all().await.unwrap();
        assert_eq!(first, second);
    }
}
