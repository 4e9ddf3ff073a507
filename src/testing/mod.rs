use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::database::memory::MemoryDocumentStore;
use crate::database::store::DocumentStore;
use crate::models::{Category, CategoryFactory, ModelError, ModelFactory};
use crate::services::CategoryService;

/// Category factory that counts how many instances it was asked to build
#[derive(Debug, Default)]
pub struct CountingFactory {
    inner: CategoryFactory,
    calls: AtomicUsize,
}

impl CountingFactory {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }
}

impl ModelFactory for CountingFactory {
    type Model = Category;

    fn construct(
        &self,
        attributes: Map<String, Value>,
        children: Vec<Category>,
    ) -> Result<Category, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.construct(attributes, children)
    }
}

/// In-memory store plus a category service wired to a counting factory
pub struct TestContext {
    pub store: Arc<MemoryDocumentStore>,
    pub factory: Arc<CountingFactory>,
    pub service: CategoryService,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let factory = Arc::new(CountingFactory::default());
        let service = CategoryService::with_factory(
            store.clone() as Arc<dyn DocumentStore>,
            "categories",
            factory.clone(),
        );

        Self {
            store,
            factory,
            service,
        }
    }

    /// Number of documents currently stored in the categories collection
    pub async fn stored_count(&self) -> usize {
        self.store
            .find_all("categories", None, None)
            .await
            .map(|docs| docs.len())
            .unwrap_or(0)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
