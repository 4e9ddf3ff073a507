// Observer pipeline: runs registered observers ring by ring around the store write

use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::database::record::Record;
use crate::observer::context::ObserverContext;
use crate::observer::error::{ObserverError, ObserverResult};
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Executes observers in ring order; pre-database failures stop the run
/// before anything is written
pub struct ObserverPipeline {
    observers: BTreeMap<ObserverRing, Vec<Box<dyn Observer>>>,

    /// Overrides every observer's own timeout when set
    timeout_override: Option<Duration>,
}

impl ObserverPipeline {
    pub fn new() -> Self {
        Self {
            observers: BTreeMap::new(),
            timeout_override: None,
        }
    }

    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout_override = Some(limit);
        self
    }

    /// Register an observer, keeping each ring sorted by priority
    pub fn register_observer(&mut self, observer: Box<dyn Observer>) {
        let ring = observer.ring();
        let name = observer.name();
        let ring_observers = self.observers.entry(ring).or_default();
        ring_observers.push(observer);
        ring_observers.sort_by_key(|o| o.priority());

        tracing::debug!("Registered observer '{}' for ring {:?}", name, ring);
    }

    /// Observer names registered for a ring, in execution order
    pub fn observer_names(&self, ring: ObserverRing) -> Vec<&'static str> {
        self.observers
            .get(&ring)
            .map(|observers| observers.iter().map(|o| o.name()).collect())
            .unwrap_or_default()
    }

    /// Execute the pipeline for a write operation
    pub async fn execute(
        &self,
        operation: Operation,
        collection: &str,
        records: Vec<Record>,
    ) -> ObserverResult {
        let mut ctx = ObserverContext::new(operation, collection, records);
        let relevant_rings = ObserverRing::for_operation(&operation);
        let mut rings_executed = Vec::with_capacity(relevant_rings.len());

        tracing::info!(
            "Observer pipeline starting: operation={:?}, collection={}, records={}, new={}",
            ctx.operation,
            ctx.collection,
            ctx.records.len(),
            ctx.new_record_count()
        );

        for ring in relevant_rings {
            ctx.current_ring = Some(ring);
            rings_executed.push(ring);

            self.execute_ring(ring, &mut ctx).await;

            if ctx.has_errors() {
                tracing::warn!(
                    "Observer pipeline stopped at ring {:?} with {} error(s)",
                    ring,
                    ctx.errors.len()
                );
                if ring.is_pre_database() {
                    tracing::debug!("Nothing was written to {}", ctx.collection);
                }
                break;
            }
        }

        let execution_time = ctx.execution_time();
        tracing::debug!("Observer pipeline finished in {:?}", execution_time);

        ObserverResult {
            success: ctx.errors.is_empty(),
            documents: ctx.result.unwrap_or_default(),
            errors: ctx.errors,
            execution_time,
            rings_executed,
        }
    }

    /// Execute observers in a specific ring, collecting their errors
    async fn execute_ring(&self, ring: ObserverRing, ctx: &mut ObserverContext) {
        let Some(observers) = self.observers.get(&ring) else {
            tracing::trace!("No observers registered for ring {:?}", ring);
            return;
        };

        tracing::debug!("Executing ring {:?} with {} observers", ring, observers.len());

        for observer in observers {
            if !observer.applies_to_operation(ctx.operation) {
                tracing::trace!(
                    "Observer {} skipped - doesn't apply to operation {:?}",
                    observer.name(),
                    ctx.operation
                );
                continue;
            }

            if !observer.applies_to_collection(&ctx.collection) {
                tracing::trace!(
                    "Observer {} skipped - doesn't apply to collection {}",
                    observer.name(),
                    ctx.collection
                );
                continue;
            }

            let limit = self.timeout_override.unwrap_or_else(|| observer.timeout());
            let observer_start = Instant::now();
            let result = timeout(limit, observer.execute(ctx)).await;
            let execution_time = observer_start.elapsed();

            match result {
                Ok(Ok(())) => {
                    tracing::debug!(
                        "Observer: {} completed successfully in {:?}",
                        observer.name(),
                        execution_time
                    );
                }
                Ok(Err(error)) => {
                    tracing::warn!(
                        "Observer: {} failed in {:?}: {}",
                        observer.name(),
                        execution_time,
                        error
                    );
                    ctx.add_error(error);
                }
                Err(_elapsed) => {
                    tracing::error!("Observer: {} timed out after {:?}", observer.name(), limit);
                    ctx.add_error(ObserverError::TimeoutError(format!(
                        "Observer {} timed out after {:?}",
                        observer.name(),
                        limit
                    )));
                }
            }
        }
    }
}

impl Default for ObserverPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Probe {
        name: &'static str,
        ring: ObserverRing,
        priority: u8,
        fail: bool,
        delay: Option<Duration>,
        log: Arc<std::sync::Mutex<Vec<&'static str>>>,
        runs: Arc<AtomicUsize>,
    }

    impl Probe {
        fn new(name: &'static str, ring: ObserverRing, log: &Arc<std::sync::Mutex<Vec<&'static str>>>) -> Self {
            Self {
                name,
                ring,
                priority: 50,
                fail: false,
                delay: None,
                log: log.clone(),
                runs: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Observer for Probe {
        fn name(&self) -> &'static str {
            self.name
        }

        fn ring(&self) -> ObserverRing {
            self.ring
        }

        fn applies_to_operation(&self, op: Operation) -> bool {
            op == Operation::Create
        }

        fn priority(&self) -> u8 {
            self.priority
        }

        async fn execute(&self, _ctx: &mut ObserverContext) -> Result<(), ObserverError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.runs.fetch_add(1, Ordering::SeqCst);
            self.log.lock().unwrap().push(self.name);
            if self.fail {
                return Err(ObserverError::ValidationError(format!("{} failed", self.name)));
            }
            Ok(())
        }
    }

    fn record() -> Vec<Record> {
        vec![Record::from_json(json!({ "name": "x" })).unwrap()]
    }

    #[tokio::test]
    async fn runs_rings_in_order_and_priority_within_ring() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut pipeline = ObserverPipeline::new();

        pipeline.register_observer(Box::new(Probe::new("db", ObserverRing::Database, &log)));
        let mut late = Probe::new("late", ObserverRing::InputValidation, &log);
        late.priority = 90;
        pipeline.register_observer(Box::new(late));
        let mut early = Probe::new("early", ObserverRing::InputValidation, &log);
        early.priority = 10;
        pipeline.register_observer(Box::new(early));
        pipeline.register_observer(Box::new(Probe::new("prep", ObserverRing::DataPreparation, &log)));

        let result = pipeline.execute(Operation::Create, "categories", record()).await;

        assert!(result.success);
        assert_eq!(*log.lock().unwrap(), vec!["prep", "early", "late", "db"]);
        assert_eq!(
            pipeline.observer_names(ObserverRing::InputValidation),
            vec!["early", "late"]
        );
    }

    #[tokio::test]
    async fn pre_database_failure_skips_database_ring() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut pipeline = ObserverPipeline::new();

        let mut failing = Probe::new("enrich", ObserverRing::Enrichment, &log);
        failing.fail = true;
        pipeline.register_observer(Box::new(failing));
        let db = Probe::new("db", ObserverRing::Database, &log);
        let db_runs = db.runs.clone();
        pipeline.register_observer(Box::new(db));

        let result = pipeline.execute(Operation::Create, "categories", record()).await;

        assert!(!result.success);
        assert_eq!(db_runs.load(Ordering::SeqCst), 0);
        assert_eq!(result.rings_executed.last(), Some(&ObserverRing::Enrichment));
        assert!(matches!(result.into_documents(), Err(ObserverError::ValidationError(_))));
    }

    #[tokio::test]
    async fn skips_observers_for_other_operations() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut pipeline = ObserverPipeline::new();
        pipeline.register_observer(Box::new(Probe::new("create-only", ObserverRing::Enrichment, &log)));

        let result = pipeline.execute(Operation::Delete, "categories", vec![]).await;

        assert!(result.success);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn slow_observer_times_out() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut slow = Probe::new("slow", ObserverRing::InputValidation, &log);
        slow.delay = Some(Duration::from_millis(200));
        let mut pipeline = ObserverPipeline::new().with_timeout(Duration::from_millis(10));
        pipeline.register_observer(Box::new(slow));

        let result = pipeline.execute(Operation::Create, "categories", record()).await;

        assert!(!result.success);
        assert!(matches!(result.errors[0], ObserverError::TimeoutError(_)));
    }
}
