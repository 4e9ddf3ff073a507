// Ring 5: Create Executor - inserts new records as one atomic batch
use async_trait::async_trait;
use std::sync::Arc;

use crate::database::record::Record;
use crate::database::store::DocumentStore;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Ring 5: Create Executor - handles CREATE operations only
pub struct CreateExecutor {
    store: Arc<dyn DocumentStore>,
}

impl CreateExecutor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Observer for CreateExecutor {
    fn name(&self) -> &'static str {
        "CreateExecutor"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Database
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        if ctx.records.is_empty() {
            tracing::debug!("No records to process for CREATE operation");
            ctx.result = Some(Vec::new());
            return Ok(());
        }

        if let Some(existing) = ctx.records.iter().find(|record| !record.is_new()) {
            return Err(ObserverError::ValidationError(format!(
                "Record {:?} already exists and cannot be created again",
                existing.id()
            )));
        }

        let bodies = ctx.records.iter().map(Record::to_map).collect();
        let documents = self.store.insert_many(&ctx.collection, bodies).await?;

        tracing::info!(
            "CREATE completed: {} document(s) inserted into {}",
            documents.len(),
            ctx.collection
        );

        // Records now carry their storage identity
        ctx.records = documents.iter().map(Record::from_document).collect();
        ctx.result = Some(documents);

        Ok(())
    }
}
