// Ring 6: Post-Database - logs what a successful write changed
use async_trait::async_trait;

use crate::observer::context::{ObserverContext, TreeStats};
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Ring 6: Change Log Observer - one info line per written document
#[derive(Default)]
pub struct ChangeLogObserver;

#[async_trait]
impl Observer for ChangeLogObserver {
    fn name(&self) -> &'static str {
        "ChangeLogObserver"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::PostDatabase
    }

    fn applies_to_operation(&self, _op: Operation) -> bool {
        true
    }

    fn priority(&self) -> u8 {
        90
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let Some(documents) = ctx.result.as_ref() else {
            return Ok(());
        };

        for document in documents {
            tracing::info!(
                collection = %ctx.collection,
                operation = ?ctx.operation,
                id = %document.id,
                "Document written"
            );
        }

        if let Some(stats) = ctx.get_metadata::<TreeStats>() {
            if stats.typed_nodes > 0 {
                tracing::info!(
                    "Built {} typed child node(s) across {} new record(s)",
                    stats.typed_nodes,
                    stats.expanded_records
                );
            }
        }

        Ok(())
    }
}
