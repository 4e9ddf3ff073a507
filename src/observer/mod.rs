// Observer system for processing record writes through a ring-ordered pipeline

pub mod context;
pub mod traits;
pub mod pipeline;
pub mod error;
pub mod implementations;

// Re-export core types
pub use context::*;
pub use traits::*;
pub use pipeline::*;
pub use error::*;
