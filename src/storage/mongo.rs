use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures_util::TryStreamExt;
use mongodb::{options::ClientOptions, Client, Collection};
use serde_json::Value as JsonValue;
use std::time::Duration;

use super::{render_item, Item, ItemStore};
use crate::config::{Config, DEFAULT_DATABASE};

/// Used unless the URI sets `serverSelectionTimeoutMS`
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// MongoDB-backed item store
///
/// Holds one driver client (internally pooled) and a handle on the items
/// collection. Cloning is cheap and shares the same connections.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    collection: Collection<Document>,
}

impl MongoStore {
    /// Create a store from configuration
    ///
    /// The database is `MONGO_DATABASE` when set, otherwise the default
    /// database named in the URI, otherwise `mydatabase`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let uri = config
            .mongo_uri
            .as_deref()
            .context("MONGO_URI is required for the mongodb storage backend")?;

        Self::connect(uri, config.mongo_database.as_deref(), &config.mongo_collection).await
    }

    /// Connect and verify the server answers a `ping`
    pub async fn connect(uri: &str, database: Option<&str>, collection: &str) -> Result<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .context("Failed to parse MongoDB connection string")?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options
            .server_selection_timeout
            .get_or_insert(SERVER_SELECTION_TIMEOUT);

        let database = database
            .map(str::to_string)
            .or_else(|| options.default_database.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let client = Client::with_options(options).context("Failed to create MongoDB client")?;

        client
            .database(&database)
            .run_command(doc! { "ping": 1 })
            .await
            .context("Failed to reach MongoDB")?;

        tracing::info!(
            "Successfully connected to MongoDB database '{}', collection '{}'",
            database,
            collection
        );

        let collection = client.database(&database).collection::<Document>(collection);

        Ok(Self { client, collection })
    }
}

#[async_trait]
impl ItemStore for MongoStore {
    async fn list_all(&self) -> Result<Vec<Item>> {
        let cursor = self
            .collection
            .find(doc! {})
            .await
            .context("Failed to query items from MongoDB")?;

        let documents: Vec<Document> = cursor
            .try_collect()
            .await
            .context("Failed to read items from MongoDB")?;

        let items = documents
            .into_iter()
            .map(document_to_item)
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Listed {} items", items.len());
        Ok(items)
    }

    async fn insert(&self, mut payload: Item) -> Result<String> {
        // The driver assigns `_id` only when the document has none
        payload.remove("_id");

        let document = bson::to_document(&payload).context("Failed to encode item as BSON")?;

        let result = self
            .collection
            .insert_one(document)
            .await
            .context("Failed to insert item into MongoDB")?;

        let id = id_to_string(result.inserted_id);
        tracing::debug!("Inserted item with id: {}", id);
        Ok(id)
    }

    async fn health_check(&self) -> Result<()> {
        self.client
            .database(&self.collection.namespace().db)
            .run_command(doc! { "ping": 1 })
            .await
            .context("Failed to execute health check ping")?;

        tracing::debug!("Health check ping succeeded");
        Ok(())
    }
}

fn id_to_string(id: Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.into_relaxed_extjson().to_string(),
    }
}

fn document_to_item(mut document: Document) -> Result<Item> {
    let id = document
        .remove("_id")
        .map(id_to_string)
        .ok_or_else(|| anyhow!("Stored document has no _id"))?;

    match Bson::Document(document).into_relaxed_extjson() {
        JsonValue::Object(payload) => Ok(render_item(id, payload)),
        other => Err(anyhow!("Stored document decoded to non-object JSON: {}", other)),
    }
}
