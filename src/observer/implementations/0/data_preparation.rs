// Ring 0: Data Preparation - loads stored documents and merges updates
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::store::{Document, DocumentStore};
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Ring 0: Data Preparation Observer - injects the stored body into records
/// that reference existing documents
pub struct DataPreparationObserver {
    store: Arc<dyn DocumentStore>,
}

impl DataPreparationObserver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Observer for DataPreparationObserver {
    fn name(&self) -> &'static str {
        "DataPreparationObserver"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::DataPreparation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        // Only applies to operations that need existing data
        matches!(op, Operation::Update | Operation::Delete)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        if ctx.records.is_empty() {
            tracing::debug!("No records to prepare data for");
            return Ok(());
        }

        // Skip data loading if records already have original data loaded
        if ctx.records.iter().all(|record| record.original().is_some()) {
            tracing::debug!("Records already have original data loaded, skipping data preparation");
            return Ok(());
        }

        let ids: Vec<Uuid> = ctx.records.iter().filter_map(|record| record.id()).collect();
        if ids.is_empty() {
            return Err(ObserverError::ValidationError(format!(
                "{:?} operations require record IDs",
                ctx.operation
            )));
        }

        let existing = self.store.find_ids(&ctx.collection, &ids).await?;
        let existing_by_id: HashMap<Uuid, Document> =
            existing.into_iter().map(|doc| (doc.id, doc)).collect();

        let mut prepared = 0;
        let mut errors = Vec::new();

        for record in &mut ctx.records {
            match record.id() {
                Some(id) => match existing_by_id.get(&id) {
                    Some(document) => {
                        record.inject(document);
                        prepared += 1;
                    }
                    None => {
                        tracing::warn!("Record {} not found in {}", id, ctx.collection);
                        errors.push(ObserverError::NotFound(format!("Record {} not found", id)));
                    }
                },
                None => errors.push(ObserverError::ValidationError(
                    "Record missing ID".to_string(),
                )),
            }
        }

        for error in errors {
            ctx.add_error(error);
        }

        tracing::info!(
            "{:?} data preparation completed: {}/{} successful",
            ctx.operation,
            prepared,
            ctx.records.len()
        );

        Ok(())
    }
}
