// HTTP handlers, one module per resource
pub mod categories;
pub mod root;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::Json;
use serde_json::Value;

use crate::error::ApiError;

/// Unwrap a JSON body, reporting malformed input in the error envelope
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}
