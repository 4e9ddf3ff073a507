// Ring 4: Enrichment - expands the child field of new records into typed trees
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::models::{Category, ModelError, ModelFactory};
use crate::observer::context::{ObserverContext, TreeStats};
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};
use crate::tree;

/// Ring 4: Child Tree Observer - runs the tree builder over the child field
/// of every record that has never been saved.
///
/// Records that already exist are left alone, even when their child field
/// changed. A build error fails the record and, through the pipeline, the
/// whole save.
pub struct ChildTreeObserver<F> {
    factory: Arc<F>,
    child_field: String,
}

impl<F> ChildTreeObserver<F>
where
    F: ModelFactory<Model = Category>,
{
    pub fn new(factory: Arc<F>, child_field: impl Into<String>) -> Self {
        Self {
            factory,
            child_field: child_field.into(),
        }
    }

    /// Build, identify and serialize one record's children
    fn expand(&self, raw: Value) -> Result<(Value, usize), ModelError> {
        let mut children = tree::build_children(self.factory.as_ref(), raw, &self.child_field)?;
        for child in &mut children {
            child.assign_missing_ids();
        }

        let typed_nodes = children.iter().map(Category::node_count).sum();
        let value = serde_json::to_value(&children)
            .map_err(|e| ModelError::invalid(format!("unserializable child tree: {}", e)))?;
        Ok((value, typed_nodes))
    }
}

#[async_trait]
impl<F> Observer for ChildTreeObserver<F>
where
    F: ModelFactory<Model = Category> + 'static,
{
    fn name(&self) -> &'static str {
        "ChildTreeObserver"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Enrichment
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        // Updates reach the observer but carry existing records only
        matches!(op, Operation::Create | Operation::Update)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let many = ctx.records.len() > 1;
        let mut stats = ctx.get_metadata::<TreeStats>().cloned().unwrap_or_default();
        let mut errors = Vec::new();

        for (index, record) in ctx.records.iter_mut().enumerate() {
            if !record.is_new() {
                stats.skipped_existing += 1;
                continue;
            }

            let Some(raw) = record.take(&self.child_field) else {
                continue;
            };

            match self.expand(raw) {
                Ok((children, typed_nodes)) => {
                    record.set(self.child_field.clone(), children);
                    stats.expanded_records += 1;
                    stats.typed_nodes += typed_nodes;
                }
                Err(error) => {
                    let error = if many {
                        error.rebase(&format!("$[{}]", index))
                    } else {
                        error
                    };
                    tracing::warn!("Child tree rejected: {}", error);
                    errors.push(ObserverError::from(error));
                }
            }
        }

        tracing::debug!(
            "Child trees: {} expanded, {} typed nodes, {} existing skipped",
            stats.expanded_records,
            stats.typed_nodes,
            stats.skipped_existing
        );

        ctx.set_metadata(stats);
        for error in errors {
            ctx.add_error(error);
        }
        Ok(())
    }
}
