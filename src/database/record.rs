use serde_json::{Map, Value};
use std::collections::HashSet;
use uuid::Uuid;

use crate::database::store::Document;

/// System fields that can only be set by the storage layer, not by API input
const SYSTEM_FIELDS: &[&str] = &["id", "created_at", "updated_at"];

/// Errors that can occur during Record operations
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("System field '{0}' cannot be set via API input")]
    SystemFieldNotAllowed(&'static str),
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
    #[error("Invalid UUID: {0}")]
    InvalidUuid(String),
}

/// A pending write: document fields plus what the store last held.
///
/// A record without an id has never been persisted (`is_new`). It gets its
/// identity from the store on first successful save and is `EXISTING` from
/// then on.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: Option<Uuid>,
    /// Body as last loaded from the store (None until loaded)
    original: Option<Map<String, Value>>,
    /// Current field values
    fields: Map<String, Value>,
    /// Fields changed since `original` was loaded
    modified_fields: HashSet<String>,
}

impl Record {
    /// Create a new record from API input JSON, rejecting system fields
    pub fn from_json(json: Value) -> Result<Self, RecordError> {
        match json {
            Value::Object(map) => {
                if let Some(field) = SYSTEM_FIELDS.iter().find(|f| map.contains_key(**f)) {
                    return Err(RecordError::SystemFieldNotAllowed(*field));
                }
                Ok(Self {
                    id: None,
                    original: None,
                    fields: map,
                    modified_fields: HashSet::new(),
                })
            }
            _ => Err(RecordError::InvalidJson("Expected JSON object".to_string())),
        }
    }

    /// Convert a JSON array to new records, reporting the failing index
    pub fn from_json_array(json: Value) -> Result<Vec<Self>, RecordError> {
        match json {
            Value::Array(array) => array
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    Self::from_json(item)
                        .map_err(|e| RecordError::InvalidJson(format!("Item {}: {}", index, e)))
                })
                .collect(),
            _ => Err(RecordError::InvalidJson("Expected JSON array".to_string())),
        }
    }

    /// Changes for an already persisted record; the original body is loaded later
    pub fn for_update(id: Uuid, changes: Value) -> Result<Self, RecordError> {
        let mut record = Self::from_json(changes)?;
        record.id = Some(id);
        record.modified_fields = record.fields.keys().cloned().collect();
        Ok(record)
    }

    /// Reference to a persisted record by id only (e.g. for deletion)
    pub fn reference(id: Uuid) -> Self {
        Self {
            id: Some(id),
            original: None,
            fields: Map::new(),
            modified_fields: HashSet::new(),
        }
    }

    /// Record mirroring what the store holds
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: Some(document.id),
            original: Some(document.body.clone()),
            fields: document.body.clone(),
            modified_fields: HashSet::new(),
        }
    }

    /// Inject the stored body, re-applying any pending changes on top
    pub fn inject(&mut self, document: &Document) -> &mut Self {
        let mut fields = document.body.clone();
        for key in &self.modified_fields {
            match self.fields.get(key) {
                Some(value) => {
                    fields.insert(key.clone(), value.clone());
                }
                None => {
                    fields.remove(key);
                }
            }
        }
        self.original = Some(document.body.clone());
        self.fields = fields;
        self
    }

    /// True until the record has been durably stored
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    /// Get field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set field value with automatic change tracking
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();

        if SYSTEM_FIELDS.contains(&key.as_str()) {
            tracing::warn!("Attempted to set system field '{}' - ignoring", key);
            return self;
        }

        self.modified_fields.insert(key.clone());
        self.fields.insert(key, value.into());
        self
    }

    /// Remove a field and return its value
    pub fn take(&mut self, key: &str) -> Option<Value> {
        let value = self.fields.remove(key);
        if value.is_some() {
            self.modified_fields.insert(key.to_string());
        }
        value
    }

    /// Stored body before changes
    pub fn original(&self) -> Option<&Map<String, Value>> {
        self.original.as_ref()
    }

    /// Document body to write
    pub fn to_map(&self) -> Map<String, Value> {
        self.fields.clone()
    }
}
