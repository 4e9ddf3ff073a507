// Observer implementations organized by rings
// Each ring handles a specific phase of a write

// Ring 0: Data Preparation - load stored documents, merge updates
#[path = "0/data_preparation.rs"]
pub mod data_preparation;

// Ring 1: Input Validation - top-level model checks
#[path = "1/model_validation.rs"]
pub mod model_validation;

// Ring 4: Enrichment - typed child trees for new records
#[path = "4/child_tree.rs"]
pub mod child_tree;

// Ring 5: Database - store writes
#[path = "5/create_executor.rs"]
pub mod create_executor;
#[path = "5/delete_executor.rs"]
pub mod delete_executor;
#[path = "5/update_executor.rs"]
pub mod update_executor;

// Ring 6: Post-Database - logging after the write
#[path = "6/change_log.rs"]
pub mod change_log;

// Helper for registering observers (not ring-specific)
pub mod registry;
pub use registry::*;

pub use data_preparation::*;
pub use model_validation::*;
pub use child_tree::*;
pub use create_executor::*;
pub use delete_executor::*;
pub use update_executor::*;
pub use change_log::*;
