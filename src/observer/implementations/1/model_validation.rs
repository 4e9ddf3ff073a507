// Ring 1: Input Validation - checks top-level attributes through the model factory
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::database::record::Record;
use crate::models::ModelFactory;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Ring 1: Model Validation Observer - rejects records whose own attributes
/// the factory would refuse, before any child tree is built
pub struct ModelValidationObserver<F> {
    factory: Arc<F>,
    child_field: String,
}

impl<F> ModelValidationObserver<F> {
    pub fn new(factory: Arc<F>, child_field: impl Into<String>) -> Self {
        Self {
            factory,
            child_field: child_field.into(),
        }
    }

    /// Record fields without the child field, which ring 4 handles
    fn attributes(&self, record: &Record) -> Map<String, Value> {
        let mut attributes = record.to_map();
        attributes.remove(&self.child_field);
        attributes
    }
}

#[async_trait]
impl<F> Observer for ModelValidationObserver<F>
where
    F: ModelFactory + 'static,
{
    fn name(&self) -> &'static str {
        "ModelValidationObserver"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::InputValidation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let many = ctx.records.len() > 1;
        let mut errors = Vec::new();

        for (index, record) in ctx.records.iter().enumerate() {
            if let Err(error) = self.factory.construct(self.attributes(record), Vec::new()) {
                let error = if many {
                    error.rebase(&format!("$[{}]", index))
                } else {
                    error
                };
                errors.push(ObserverError::from(error));
            }
        }

        tracing::debug!(
            "Validated {} record(s), {} rejected",
            ctx.records.len(),
            errors.len()
        );

        for error in errors {
            ctx.add_error(error);
        }
        Ok(())
    }
}
