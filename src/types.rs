/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Write operations supported throughout the system
/// Used by both the observer pipeline and the repository layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Delete,
}
