// Helper for assembling the pipeline used by document collections
use std::sync::Arc;
use std::time::Duration;

use crate::database::store::DocumentStore;
use crate::models::{Category, ModelFactory};
use crate::observer::pipeline::ObserverPipeline;
use super::{
    ChangeLogObserver, ChildTreeObserver, CreateExecutor, DataPreparationObserver,
    DeleteExecutor, ModelValidationObserver, UpdateExecutor,
};

/// Register every observer a category collection needs, with the factory
/// injected into the validation and child tree steps
pub fn category_pipeline<F>(
    store: Arc<dyn DocumentStore>,
    factory: Arc<F>,
    child_field: &str,
    timeout: Option<Duration>,
) -> ObserverPipeline
where
    F: ModelFactory<Model = Category> + 'static,
{
    let mut pipeline = match timeout {
        Some(limit) => ObserverPipeline::new().with_timeout(limit),
        None => ObserverPipeline::new(),
    };

    pipeline.register_observer(Box::new(DataPreparationObserver::new(store.clone())));
    pipeline.register_observer(Box::new(ModelValidationObserver::new(factory.clone(), child_field)));
    pipeline.register_observer(Box::new(ChildTreeObserver::new(factory, child_field)));
    register_executors(&mut pipeline, store);
    pipeline.register_observer(Box::new(ChangeLogObserver));

    pipeline
}

/// Register the ring 5 executors for complete CRUD support
pub fn register_executors(pipeline: &mut ObserverPipeline, store: Arc<dyn DocumentStore>) {
    pipeline.register_observer(Box::new(CreateExecutor::new(store.clone())));
    pipeline.register_observer(Box::new(UpdateExecutor::new(store.clone())));
    pipeline.register_observer(Box::new(DeleteExecutor::new(store)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryDocumentStore;
    use crate::models::CategoryFactory;
    use crate::observer::traits::ObserverRing;

    #[test]
    fn registers_one_observer_chain() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let pipeline = category_pipeline(store, Arc::new(CategoryFactory), "children", None);

        assert_eq!(pipeline.observer_names(ObserverRing::DataPreparation), vec!["DataPreparationObserver"]);
        assert_eq!(pipeline.observer_names(ObserverRing::InputValidation), vec!["ModelValidationObserver"]);
        assert_eq!(pipeline.observer_names(ObserverRing::Enrichment), vec!["ChildTreeObserver"]);
        assert_eq!(pipeline.observer_names(ObserverRing::Database).len(), 3);
        assert_eq!(pipeline.observer_names(ObserverRing::PostDatabase), vec!["ChangeLogObserver"]);
    }
}
