// Ring 5: Delete Executor - removes documents by id
use async_trait::async_trait;
use std::sync::Arc;

use crate::database::store::DocumentStore;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Ring 5: Delete Executor - handles DELETE operations only
pub struct DeleteExecutor {
    store: Arc<dyn DocumentStore>,
}

impl DeleteExecutor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Observer for DeleteExecutor {
    fn name(&self) -> &'static str {
        "DeleteExecutor"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Database
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Delete)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let mut documents = Vec::with_capacity(ctx.records.len());

        for record in &ctx.records {
            let id = record.id().ok_or_else(|| {
                ObserverError::ValidationError("DELETE requires a record id".to_string())
            })?;

            let document = self
                .store
                .delete(&ctx.collection, id)
                .await?
                .ok_or_else(|| ObserverError::NotFound(format!("Record {} not found", id)))?;
            documents.push(document);
        }

        tracing::info!(
            "DELETE completed: {} document(s) from {}",
            documents.len(),
            ctx.collection
        );

        ctx.result = Some(documents);
        Ok(())
    }
}
