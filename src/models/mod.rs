pub mod category;

pub use category::{Category, CategoryFactory};

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while turning plain JSON objects into typed model instances.
///
/// Every variant carries the JSON path of the node that failed (`$` is the
/// node handed to the builder, `$.children[1]` its second child, and so on).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid node at {path}: {message}")]
    Validation { path: String, message: String },

    #[error("invalid node at {path}: field '{field}' must be an array, found {found}")]
    Structure {
        path: String,
        field: String,
        found: &'static str,
    },
}

impl ModelError {
    /// Validation failure anchored at the root; builders re-anchor it with `at`
    pub fn invalid(message: impl Into<String>) -> Self {
        ModelError::Validation {
            path: "$".to_string(),
            message: message.into(),
        }
    }

    /// Replace the path with the node the error was raised for
    pub fn at(self, node_path: &str) -> Self {
        match self {
            ModelError::Validation { message, .. } => ModelError::Validation {
                path: node_path.to_string(),
                message,
            },
            ModelError::Structure { field, found, .. } => ModelError::Structure {
                path: node_path.to_string(),
                field,
                found,
            },
        }
    }

    /// Move the whole path under another root, e.g. `$.name` -> `$[2].name`
    pub fn rebase(self, root: &str) -> Self {
        let path = self.path();
        let rebased = format!("{}{}", root, path.strip_prefix('$').unwrap_or(path));
        self.at(&rebased)
    }

    pub fn path(&self) -> &str {
        match self {
            ModelError::Validation { path, .. } | ModelError::Structure { path, .. } => path,
        }
    }

    /// Message without the path prefix, for per-field error maps
    pub fn detail(&self) -> String {
        match self {
            ModelError::Validation { message, .. } => message.clone(),
            ModelError::Structure { field, found, .. } => {
                format!("field '{}' must be an array, found {}", field, found)
            }
        }
    }
}

/// Constructs one typed instance from a plain JSON object.
///
/// `attributes` is the node with its child field already removed; `children`
/// holds the typed instances built from that field, in input order. Keeping
/// the two apart means a factory never sees typed values inside a plain map.
pub trait ModelFactory: Send + Sync {
    type Model;

    fn construct(
        &self,
        attributes: Map<String, Value>,
        children: Vec<Self::Model>,
    ) -> Result<Self::Model, ModelError>;
}

/// Short JSON type name for error messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
