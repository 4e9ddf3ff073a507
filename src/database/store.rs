use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseError;

/// A stored JSON document with its storage-assigned identity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: Uuid,
    pub body: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Flatten into the public wire format: body fields plus id and timestamps
    pub fn to_api_output(&self) -> Value {
        let mut output = Map::with_capacity(self.body.len() + 3);
        output.insert("id".into(), Value::String(self.id.to_string()));
        for (key, value) in &self.body {
            output.insert(key.clone(), value.clone());
        }
        output.insert("created_at".into(), Value::String(self.created_at.to_rfc3339()));
        output.insert("updated_at".into(), Value::String(self.updated_at.to_rfc3339()));
        Value::Object(output)
    }

    pub fn to_api_output_array(documents: &[Document]) -> Value {
        Value::Array(documents.iter().map(Document::to_api_output).collect())
    }
}

/// Durable storage for schemaless JSON documents grouped in collections
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name for health output and logs
    fn backend(&self) -> &'static str;

    /// Create the collection if it does not exist yet
    async fn ensure_collection(&self, collection: &str) -> Result<(), DatabaseError>;

    /// Insert all bodies or none; ids and timestamps are assigned here
    async fn insert_many(
        &self,
        collection: &str,
        bodies: Vec<Map<String, Value>>,
    ) -> Result<Vec<Document>, DatabaseError>;

    /// Documents in insertion order
    async fn find_all(
        &self,
        collection: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Document>, DatabaseError>;

    async fn find_ids(&self, collection: &str, ids: &[Uuid]) -> Result<Vec<Document>, DatabaseError>;

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError>;

    /// Overwrite the body of an existing document, bumping `updated_at`
    async fn replace(
        &self,
        collection: &str,
        id: Uuid,
        body: Map<String, Value>,
    ) -> Result<Option<Document>, DatabaseError>;

    /// Remove a document, returning what was stored
    async fn delete(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError>;

    /// Connectivity check
    async fn ping(&self) -> Result<(), DatabaseError>;

    async fn insert(&self, collection: &str, body: Map<String, Value>) -> Result<Document, DatabaseError> {
        self.insert_many(collection, vec![body])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DatabaseError::QueryError("insert returned no document".to_string()))
    }
}
