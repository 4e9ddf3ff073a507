use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;

use crate::database::record::Record;
use crate::database::store::Document;
use crate::observer::error::ObserverError;
use crate::observer::traits::{ObserverRing, Operation};

/// The data structure that flows through the observer pipeline
#[derive(Debug)]
pub struct ObserverContext {
    pub operation: Operation,
    pub collection: String,

    /// Records being written; replaced with their persisted form by ring 5
    pub records: Vec<Record>,

    /// Stored documents after database operations (populated by ring 5)
    pub result: Option<Vec<Document>>,

    // Type-safe metadata storage for cross-observer communication
    metadata: HashMap<TypeId, Box<dyn Any + Send>>,

    pub start_time: Instant,
    pub current_ring: Option<ObserverRing>,

    pub errors: Vec<ObserverError>,
}

impl ObserverContext {
    pub fn new(operation: Operation, collection: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            operation,
            collection: collection.into(),
            records,
            result: None,
            metadata: HashMap::new(),
            start_time: Instant::now(),
            current_ring: None,
            errors: Vec::new(),
        }
    }

    /// Store typed metadata
    pub fn set_metadata<T: Send + 'static>(&mut self, data: T) {
        self.metadata.insert(TypeId::of::<T>(), Box::new(data));
    }

    /// Retrieve typed metadata
    pub fn get_metadata<T: Send + 'static>(&self) -> Option<&T> {
        self.metadata
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    /// Retrieve mutable typed metadata
    pub fn get_metadata_mut<T: Send + 'static>(&mut self) -> Option<&mut T> {
        self.metadata
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut::<T>())
    }

    pub fn add_error(&mut self, error: ObserverError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn execution_time(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Count records that have never been persisted
    pub fn new_record_count(&self) -> usize {
        self.records.iter().filter(|record| record.is_new()).count()
    }
}

/// What the child-tree step did during one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// New records whose children were expanded
    pub expanded_records: usize,
    /// Typed nodes built below those records
    pub typed_nodes: usize,
    /// Existing records left untouched
    pub skipped_existing: usize,
}
