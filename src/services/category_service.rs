use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::database::record::{Record, RecordError};
use crate::database::repository::Repository;
use crate::database::store::{Document, DocumentStore};
use crate::error::ApiError;
use crate::models::{Category, CategoryFactory, ModelFactory};
use crate::observer::implementations::category_pipeline;
use crate::tree::CHILDREN_FIELD;

/// Category operations shared by the HTTP handlers and the CLI
#[derive(Clone)]
pub struct CategoryService {
    repository: Repository,
}

impl CategoryService {
    /// Service using the stock category factory
    pub fn new(
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        observer_timeout: Option<Duration>,
    ) -> Self {
        Self::build(store, collection.into(), Arc::new(CategoryFactory), observer_timeout)
    }

    /// Service with a caller-supplied factory injected into the pipeline
    pub fn with_factory<F>(
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        factory: Arc<F>,
    ) -> Self
    where
        F: ModelFactory<Model = Category> + 'static,
    {
        Self::build(store, collection.into(), factory, None)
    }

    fn build<F>(
        store: Arc<dyn DocumentStore>,
        collection: String,
        factory: Arc<F>,
        observer_timeout: Option<Duration>,
    ) -> Self
    where
        F: ModelFactory<Model = Category> + 'static,
    {
        let pipeline = category_pipeline(store.clone(), factory, CHILDREN_FIELD, observer_timeout);
        Self {
            repository: Repository::new(collection, store, Arc::new(pipeline)),
        }
    }

    pub async fn list(&self, limit: Option<i64>, offset: Option<i64>) -> Result<Vec<Document>, ApiError> {
        if limit.is_some_and(|l| l < 0) || offset.is_some_and(|o| o < 0) {
            return Err(ApiError::bad_request("limit and offset must not be negative"));
        }
        Ok(self.repository.select_all(limit, offset).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Document, ApiError> {
        Ok(self.repository.select_404(parse_id(id)?).await?)
    }

    /// Create one category; its children become a typed tree before the write
    pub async fn create(&self, body: Value) -> Result<Document, ApiError> {
        let record = Record::from_json(body)?;
        Ok(self.repository.create_one(record).await?)
    }

    /// Create every category in `body` or none of them
    pub async fn bulk_create(&self, body: Value) -> Result<Vec<Document>, ApiError> {
        let records = Record::from_json_array(body)?;
        Ok(self.repository.create_all(records).await?)
    }

    /// Shallow-merge `changes` into a stored category; children are stored as given
    pub async fn update(&self, id: &str, changes: Value) -> Result<Document, ApiError> {
        let record = Record::for_update(parse_id(id)?, changes)?;
        Ok(self.repository.update_one(record).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<Document, ApiError> {
        Ok(self.repository.delete_one(parse_id(id)?).await?)
    }

    /// Save a record, creating it on first save and updating it afterwards
    pub async fn save(&self, record: Record) -> Result<Record, ApiError> {
        Ok(self.repository.save(record).await?)
    }
}

fn parse_id(raw: &str) -> Result<Uuid, RecordError> {
    Uuid::parse_str(raw).map_err(|_| RecordError::InvalidUuid(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::error::ApiError;
    use crate::testing::TestContext;
    use serde_json::json;

    #[tokio::test]
    async fn create_builds_four_node_tree() {
        let ctx = TestContext::new();

        let doc = ctx
            .service
            .create(json!({
                "name": "root",
                "children": [{ "name": "a" }, { "name": "b", "children": [{ "name": "c" }] }]
            }))
            .await
            .unwrap();

        // Top-level validation plus one call per nested node
        assert_eq!(ctx.factory.calls(), 4);
        assert_eq!(doc.body["children"][1]["children"][0]["name"], json!("c"));
        assert_eq!(ctx.stored_count().await, 1);
    }

    #[tokio::test]
    async fn leaf_create_does_not_recurse() {
        let ctx = TestContext::new();

        let doc = ctx.service.create(json!({ "name": "root" })).await.unwrap();

        assert_eq!(ctx.factory.calls(), 1);
        assert!(doc.body.get("children").is_none());
    }

    #[tokio::test]
    async fn failing_descendant_stores_nothing() {
        let ctx = TestContext::new();

        let err = ctx
            .service
            .create(json!({
                "name": "root",
                "children": [{ "name": "a", "children": [{ "name": 7 }] }]
            }))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 422);
        assert_eq!(ctx.stored_count().await, 0);
    }

    #[tokio::test]
    async fn bulk_create_is_all_or_nothing() {
        let ctx = TestContext::new();

        let err = ctx
            .service
            .bulk_create(json!([
                { "name": "one" },
                { "name": "two", "children": [{ "slug": "missing-name" }] }
            ]))
            .await
            .unwrap_err();

        match err {
            ApiError::UnprocessableEntity { field_errors, .. } => {
                assert!(field_errors.contains_key("$[1].children[0]"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(ctx.stored_count().await, 0);

        let docs = ctx
            .service
            .bulk_create(json!([{ "name": "one" }, { "name": "two" }]))
            .await
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(ctx.stored_count().await, 2);
    }

    #[tokio::test]
    async fn update_does_not_rebuild_children() {
        let ctx = TestContext::new();
        let doc = ctx
            .service
            .create(json!({ "name": "root", "children": [{ "name": "a" }] }))
            .await
            .unwrap();
        ctx.factory.reset();

        let updated = ctx
            .service
            .update(&doc.id.to_string(), json!({ "children": [{ "raw": true }] }))
            .await
            .unwrap();

        assert_eq!(ctx.factory.calls(), 1);
        assert_eq!(updated.body["children"], json!([{ "raw": true }]));
        assert_eq!(updated.body["name"], json!("root"));
        assert_eq!(updated.id, doc.id);
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids() {
        let ctx = TestContext::new();

        assert_eq!(ctx.service.get("not-a-uuid").await.unwrap_err().status_code(), 400);
        let missing = uuid::Uuid::new_v4().to_string();
        assert_eq!(ctx.service.get(&missing).await.unwrap_err().status_code(), 404);
        assert_eq!(ctx.service.delete(&missing).await.unwrap_err().status_code(), 404);
    }

    #[tokio::test]
    async fn delete_returns_removed_document() {
        let ctx = TestContext::new();
        let doc = ctx.service.create(json!({ "name": "gone" })).await.unwrap();

        let deleted = ctx.service.delete(&doc.id.to_string()).await.unwrap();

        assert_eq!(deleted.id, doc.id);
        assert_eq!(ctx.stored_count().await, 0);
    }
}
