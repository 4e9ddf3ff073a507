use std::sync::Arc;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::record::Record;
use crate::database::store::{Document, DocumentStore};
use crate::observer::error::ObserverError;
use crate::observer::pipeline::ObserverPipeline;
use crate::types::Operation;

/// Data access for one collection: reads go straight to the store, writes
/// go through the observer pipeline
#[derive(Clone)]
pub struct Repository {
    collection: String,
    store: Arc<dyn DocumentStore>,
    pipeline: Arc<ObserverPipeline>,
}

impl Repository {
    pub fn new(
        collection: impl Into<String>,
        store: Arc<dyn DocumentStore>,
        pipeline: Arc<ObserverPipeline>,
    ) -> Self {
        Self {
            collection: collection.into(),
            store,
            pipeline,
        }
    }

    pub async fn select_all(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Document>, DatabaseError> {
        self.store.find_all(&self.collection, limit, offset).await
    }

    pub async fn select_one(&self, id: Uuid) -> Result<Option<Document>, DatabaseError> {
        self.store.find_by_id(&self.collection, id).await
    }

    pub async fn select_404(&self, id: Uuid) -> Result<Document, DatabaseError> {
        self.select_one(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Record {} not found", id)))
    }

    pub async fn create_all(&self, records: Vec<Record>) -> Result<Vec<Document>, ObserverError> {
        self.run(Operation::Create, records).await
    }

    pub async fn create_one(&self, record: Record) -> Result<Document, ObserverError> {
        single(self.create_all(vec![record]).await?)
    }

    pub async fn update_one(&self, record: Record) -> Result<Document, ObserverError> {
        single(self.run(Operation::Update, vec![record]).await?)
    }

    pub async fn delete_one(&self, id: Uuid) -> Result<Document, ObserverError> {
        single(self.run(Operation::Delete, vec![Record::reference(id)]).await?)
    }

    /// Persist a record: first save creates it, later saves update it.
    ///
    /// Returns the record as stored, which is never new.
    pub async fn save(&self, record: Record) -> Result<Record, ObserverError> {
        let document = if record.is_new() {
            self.create_one(record).await?
        } else {
            self.update_one(record).await?
        };
        Ok(Record::from_document(&document))
    }

    async fn run(&self, operation: Operation, records: Vec<Record>) -> Result<Vec<Document>, ObserverError> {
        self.pipeline
            .execute(operation, &self.collection, records)
            .await
            .into_documents()
    }
}

fn single(documents: Vec<Document>) -> Result<Document, ObserverError> {
    documents
        .into_iter()
        .next()
        .ok_or_else(|| ObserverError::SystemError("write returned no document".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryDocumentStore;
    use crate::models::CategoryFactory;
    use crate::observer::implementations::category_pipeline;
    use crate::testing::CountingFactory;
    use serde_json::json;

    fn repository_with<F>(factory: Arc<F>) -> (Arc<MemoryDocumentStore>, Repository)
    where
        F: crate::models::ModelFactory<Model = crate::models::Category> + 'static,
    {
        let store = Arc::new(MemoryDocumentStore::new());
        let dyn_store: Arc<dyn DocumentStore> = store.clone();
        let pipeline = category_pipeline(dyn_store.clone(), factory, "children", None);
        (store, Repository::new("categories", dyn_store, Arc::new(pipeline)))
    }

    #[tokio::test]
    async fn save_moves_record_from_new_to_existing() {
        let (_store, repository) = repository_with(Arc::new(CategoryFactory));
        let record = Record::from_json(json!({ "name": "root", "children": [{ "name": "a" }] })).unwrap();
        assert!(record.is_new());

        let saved = repository.save(record).await.unwrap();

        assert!(!saved.is_new());
        let id = saved.id().unwrap();
        let stored = repository.select_404(id).await.unwrap();
        assert_eq!(stored.body["children"][0]["name"], json!("a"));
        assert!(stored.body["children"][0]["id"].is_string());
    }

    #[tokio::test]
    async fn hook_fires_only_on_first_save() {
        let factory = Arc::new(CountingFactory::default());
        let (_store, repository) = repository_with(factory.clone());

        let record = Record::from_json(json!({ "name": "root", "children": [{ "name": "a" }] })).unwrap();
        let mut saved = repository.save(record).await.unwrap();
        // One call for the top-level check, one for child "a"
        assert_eq!(factory.calls(), 2);

        factory.reset();
        saved.set("children", json!([{ "name": "b", "children": [{ "name": "c" }] }]));
        let resaved = repository.save(saved).await.unwrap();

        // Only the top-level validation ran; no child was built
        assert_eq!(factory.calls(), 1);
        assert_eq!(
            resaved.get("children"),
            Some(&json!([{ "name": "b", "children": [{ "name": "c" }] }]))
        );
    }

    #[tokio::test]
    async fn failing_build_persists_nothing() {
        let (store, repository) = repository_with(Arc::new(CategoryFactory));
        let record = Record::from_json(json!({
            "name": "root",
            "children": [{ "name": "a" }, { "name": "b", "children": [{ "slug": "no-name" }] }]
        }))
        .unwrap();

        let err = repository.create_one(record).await.unwrap_err();

        match err {
            ObserverError::InvalidModel(model) => assert_eq!(model.path(), "$.children[1].children[0]"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(store.find_all("categories", None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_missing_ids_are_not_found() {
        let (_store, repository) = repository_with(Arc::new(CategoryFactory));
        let missing = Uuid::new_v4();

        let update = Record::for_update(missing, json!({ "name": "x" })).unwrap();
        assert!(matches!(repository.update_one(update).await, Err(ObserverError::NotFound(_))));
        assert!(matches!(repository.delete_one(missing).await, Err(ObserverError::NotFound(_))));
        assert!(matches!(repository.select_404(missing).await, Err(DatabaseError::NotFound(_))));
    }
}
