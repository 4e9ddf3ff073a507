use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::store::{Document, DocumentStore};

/// Process-local document store, kept in insertion order per collection
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ensure_collection(&self, collection: &str) -> Result<(), DatabaseError> {
        DatabaseManager::validate_collection_name(collection)?;
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default();
        Ok(())
    }

    async fn insert_many(
        &self,
        collection: &str,
        bodies: Vec<Map<String, Value>>,
    ) -> Result<Vec<Document>, DatabaseError> {
        DatabaseManager::validate_collection_name(collection)?;
        let now = Utc::now();

        let documents: Vec<Document> = bodies
            .into_iter()
            .map(|body| Document {
                id: Uuid::new_v4(),
                body,
                created_at: now,
                updated_at: now,
            })
            .collect();

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .extend(documents.iter().cloned());

        Ok(documents)
    }

    async fn find_all(
        &self,
        collection: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Document>, DatabaseError> {
        DatabaseManager::validate_collection_name(collection)?;
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let offset = offset.unwrap_or(0).max(0) as usize;
        let limit = limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        Ok(documents.iter().skip(offset).take(limit).cloned().collect())
    }

    async fn find_ids(&self, collection: &str, ids: &[Uuid]) -> Result<Vec<Document>, DatabaseError> {
        DatabaseManager::validate_collection_name(collection)?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|doc| ids.contains(&doc.id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError> {
        DatabaseManager::validate_collection_name(collection)?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn replace(
        &self,
        collection: &str,
        id: Uuid,
        body: Map<String, Value>,
    ) -> Result<Option<Document>, DatabaseError> {
        DatabaseManager::validate_collection_name(collection)?;
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|doc| doc.id == id))
        else {
            return Ok(None);
        };

        document.body = body;
        document.updated_at = Utc::now();
        Ok(Some(document.clone()))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError> {
        DatabaseManager::validate_collection_name(collection)?;
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(None);
        };

        Ok(documents
            .iter()
            .position(|doc| doc.id == id)
            .map(|index| documents.remove(index)))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(name: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".into(), json!(name));
        map
    }

    #[tokio::test]
    async fn insert_assigns_identity_and_keeps_order() {
        let store = MemoryDocumentStore::new();
        let docs = store
            .insert_many("categories", vec![body("a"), body("b"), body("c")])
            .await
            .unwrap();

        assert_eq!(docs.len(), 3);
        assert_ne!(docs[0].id, docs[1].id);

        let all = store.find_all("categories", None, None).await.unwrap();
        let names: Vec<&Value> = all.iter().map(|d| &d.body["name"]).collect();
        assert_eq!(names, vec![&json!("a"), &json!("b"), &json!("c")]);

        let page = store.find_all("categories", Some(1), Some(1)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].body["name"], json!("b"));
    }

    #[tokio::test]
    async fn replace_and_delete_missing_return_none() {
        let store = MemoryDocumentStore::new();
        let missing = Uuid::new_v4();

        assert!(store.replace("categories", missing, body("x")).await.unwrap().is_none());
        assert!(store.delete("categories", missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_bumps_updated_at() {
        let store = MemoryDocumentStore::new();
        let doc = store.insert("categories", body("old")).await.unwrap();

        let updated = store
            .replace("categories", doc.id, body("new"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.body["name"], json!("new"));
        assert_eq!(updated.created_at, doc.created_at);
        assert!(updated.updated_at >= doc.updated_at);
    }

    #[tokio::test]
    async fn rejects_invalid_collection() {
        let store = MemoryDocumentStore::new();
        let result = store.insert("Bad Name", body("x")).await;
        assert!(matches!(result, Err(DatabaseError::InvalidCollectionName(_))));
    }
}
