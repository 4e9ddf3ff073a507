use async_trait::async_trait;
use std::time::Duration;

use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;

pub use crate::types::Operation;

/// Observer rings with semantic meaning, executed in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ObserverRing {
    DataPreparation = 0, // Load existing documents, merge updates
    InputValidation = 1, // Model validation of top-level fields
    Enrichment = 4,      // Derived content, e.g. typed child trees
    Database = 5,        // Store writes
    PostDatabase = 6,    // Logging after the write succeeded
}

impl ObserverRing {
    /// Rings that run before anything is written
    pub fn is_pre_database(&self) -> bool {
        (*self as u8) < (ObserverRing::Database as u8)
    }

    /// Get all rings for an operation type
    pub fn for_operation(operation: &Operation) -> Vec<Self> {
        use ObserverRing::*;

        match operation {
            Operation::Create | Operation::Update => vec![
                DataPreparation, InputValidation, Enrichment, Database, PostDatabase,
            ],
            Operation::Delete => vec![DataPreparation, Database, PostDatabase],
        }
    }
}

/// A pipeline step with metadata and applicability checks
#[async_trait]
pub trait Observer: Send + Sync {
    /// Observer name for logging and debugging
    fn name(&self) -> &'static str;

    /// Which ring this observer belongs to
    fn ring(&self) -> ObserverRing;

    /// Check if observer applies to this operation
    fn applies_to_operation(&self, op: Operation) -> bool;

    /// Check if observer applies to this collection
    fn applies_to_collection(&self, _collection: &str) -> bool {
        true
    }

    /// Execution timeout (default 5 seconds)
    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    /// Priority within ring (lower numbers execute first)
    fn priority(&self) -> u8 {
        50
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError>;
}
