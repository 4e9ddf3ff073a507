use std::time::Duration;
use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::database::store::Document;
use crate::models::ModelError;
use crate::observer::traits::ObserverRing;

/// Observer system errors with structured error types
#[derive(Debug, Error, Clone)]
pub enum ObserverError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid model: {0}")]
    InvalidModel(ModelError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("System error: {0}")]
    SystemError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<ModelError> for ObserverError {
    fn from(error: ModelError) -> Self {
        ObserverError::InvalidModel(error)
    }
}

/// Convert from database errors
impl From<DatabaseError> for ObserverError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(msg) => ObserverError::NotFound(msg),
            DatabaseError::InvalidCollectionName(name) => {
                ObserverError::ValidationError(format!("Invalid collection name: {}", name))
            }
            other => ObserverError::DatabaseError(other.to_string()),
        }
    }
}

/// Results from observer pipeline execution
#[derive(Debug, Clone)]
pub struct ObserverResult {
    pub success: bool,
    pub documents: Vec<Document>,
    pub errors: Vec<ObserverError>,
    pub execution_time: Duration,
    pub rings_executed: Vec<ObserverRing>,
}

impl ObserverResult {
    /// Stored documents on success, otherwise the first collected error
    pub fn into_documents(self) -> Result<Vec<Document>, ObserverError> {
        if self.success {
            return Ok(self.documents);
        }
        Err(self.errors.into_iter().next().unwrap_or_else(|| {
            ObserverError::SystemError("pipeline failed without reporting an error".to_string())
        }))
    }
}
