// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::database::manager::DatabaseError;
use crate::database::record::RecordError;
use crate::models::ModelError;
use crate::observer::error::ObserverError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 404 Not Found
    NotFound(String),

    // 422 Unprocessable Entity (well-formed JSON the model rejects)
    UnprocessableEntity {
        message: String,
        field_errors: HashMap<String, String>,
    },

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// HTTP status and machine-readable code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::ValidationError { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::InvalidJson(_) => (StatusCode::BAD_REQUEST, "INVALID_JSON"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::UnprocessableEntity { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE_ENTITY")
            }
            ApiError::InternalServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR")
            }
            ApiError::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_and_code().0.as_u16()
    }

    pub fn error_code(&self) -> &'static str {
        self.status_and_code().1
    }

    /// Client-safe message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::InvalidJson(msg)
            | ApiError::NotFound(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
            ApiError::ValidationError { message, .. }
            | ApiError::UnprocessableEntity { message, .. } => message,
        }
    }

    /// Error envelope: `{"success": false, "error", "code", "field_errors"?}`
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        });

        match self {
            ApiError::ValidationError {
                field_errors: Some(field_errors),
                ..
            }
            | ApiError::UnprocessableEntity { field_errors, .. } => {
                response["field_errors"] = json!(field_errors);
            }
            _ => {}
        }

        response
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn unprocessable_entity(
        message: impl Into<String>,
        field_errors: HashMap<String, String>,
    ) -> Self {
        ApiError::UnprocessableEntity {
            message: message.into(),
            field_errors,
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::SystemFieldNotAllowed(field) => {
                ApiError::bad_request(format!("System field '{}' cannot be set via API", field))
            }
            RecordError::InvalidJson(msg) => ApiError::invalid_json(msg),
            RecordError::InvalidUuid(value) => {
                let mut field_errors = HashMap::new();
                field_errors.insert("id".to_string(), format!("Invalid UUID format: {}", value));
                ApiError::validation_error("Invalid field format", Some(field_errors))
            }
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(err.path().to_string(), err.detail());
        ApiError::unprocessable_entity(err.to_string(), field_errors)
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::InvalidCollectionName(name) => {
                ApiError::bad_request(format!("Invalid collection name: {}", name))
            }
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) => {
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
            other => {
                // Don't expose storage internals to clients
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<ObserverError> for ApiError {
    fn from(err: ObserverError) -> Self {
        match err {
            ObserverError::ValidationError(msg) => ApiError::validation_error(msg, None),
            ObserverError::InvalidModel(model_err) => model_err.into(),
            ObserverError::NotFound(msg) => ApiError::not_found(msg),
            ObserverError::DatabaseError(msg) => {
                tracing::error!("Observer database error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            ObserverError::TimeoutError(msg) => {
                tracing::error!("Observer timeout: {}", msg);
                ApiError::internal_server_error("Request processing timed out")
            }
            ObserverError::SystemError(msg) => {
                tracing::error!("Observer system error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, _) = self.status_and_code();
        (status, Json(self.to_json())).into_response()
    }
}
