// Ring 5: Update Executor - writes merged bodies back to the store
use async_trait::async_trait;
use std::sync::Arc;

use crate::database::record::Record;
use crate::database::store::DocumentStore;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Ring 5: Update Executor - handles UPDATE operations only
pub struct UpdateExecutor {
    store: Arc<dyn DocumentStore>,
}

impl UpdateExecutor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Observer for UpdateExecutor {
    fn name(&self) -> &'static str {
        "UpdateExecutor"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Database
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Update)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let mut documents = Vec::with_capacity(ctx.records.len());

        for record in &ctx.records {
            let id = record.id().ok_or_else(|| {
                ObserverError::ValidationError("UPDATE requires a record id".to_string())
            })?;

            let document = self
                .store
                .replace(&ctx.collection, id, record.to_map())
                .await?
                .ok_or_else(|| ObserverError::NotFound(format!("Record {} not found", id)))?;
            documents.push(document);
        }

        tracing::info!(
            "UPDATE completed: {} document(s) in {}",
            documents.len(),
            ctx.collection
        );

        ctx.records = documents.iter().map(Record::from_document).collect();
        ctx.result = Some(documents);

        Ok(())
    }
}
