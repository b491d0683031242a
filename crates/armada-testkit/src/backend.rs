use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;

use armada_core::{
    collate, BatchReport, CollectionBackend, FetchError, MutationError, Page, PatchFn, Predicate,
    Query, Record, Scope, TargetFailure,
};

use crate::fault::FaultPlan;
use crate::generator::generate;
use crate::latency::DelayProfile;
use crate::rng::SimRng;

/// In-memory collection backend with simulated latency.
///
/// Owns its record set in insertion order; reads and scoped mutations
/// share one predicate implementation, so a bulk operation always sees
/// the membership a fetch would. Constructed explicitly and passed to
/// callers — there is no ambient instance.
///
/// Concurrent mutations are not serialized: whichever task's submission
/// completes last wins, which is the documented behavior of the whole
/// stack.
#[derive(Debug, Clone)]
pub struct InMemoryBackend<R> {
    records: Arc<RwLock<Vec<R>>>,
    delay: DelayProfile,
    rng: Arc<Mutex<SimRng>>,
    faults: Arc<FaultPlan>,
}

impl<R: Record> InMemoryBackend<R> {
    /// Backend over an existing dataset, with no delay.
    pub fn new(records: Vec<R>) -> Self {
        InMemoryBackend {
            records: Arc::new(RwLock::new(records)),
            delay: DelayProfile::none(),
            rng: Arc::new(Mutex::new(SimRng::new(0))),
            faults: Arc::new(FaultPlan::default()),
        }
    }

    /// Backend over a generated dataset, seeded for reproducibility.
    /// Latency sampling gets an independent stream forked off the same
    /// seed.
    pub fn generate(
        seed: u64,
        count: usize,
        factory: impl FnMut(usize, &mut SimRng) -> R,
    ) -> Self {
        let mut rng = SimRng::new(seed);
        let records = generate(count, &mut rng, factory);
        InMemoryBackend {
            rng: Arc::new(Mutex::new(rng.fork())),
            ..InMemoryBackend::new(records)
        }
    }

    pub fn with_delay(mut self, delay: DelayProfile) -> Self {
        self.delay = delay;
        self
    }

    /// Shared handle for scripting failures from tests.
    pub fn faults(&self) -> Arc<FaultPlan> {
        Arc::clone(&self.faults)
    }

    /// Copy of the full record set, in insertion order.
    pub fn snapshot(&self) -> Vec<R> {
        self.read_records().clone()
    }

    pub fn len(&self) -> usize {
        self.read_records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_records().is_empty()
    }

    fn read_records(&self) -> std::sync::RwLockReadGuard<'_, Vec<R>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_records(&self) -> std::sync::RwLockWriteGuard<'_, Vec<R>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulated network pause. Affects timing only.
    async fn settle(&self) {
        if self.delay.is_zero() {
            return;
        }
        let duration = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            self.delay.sample(&mut rng)
        };
        tracing::trace!(?duration, "simulated latency");
        tokio::time::sleep(duration).await;
    }
}

#[async_trait]
impl<R: Record> CollectionBackend<R> for InMemoryBackend<R> {
    async fn fetch_page(&self, query: &Query) -> Result<Page<R>, FetchError> {
        self.settle().await;
        if self.faults.take_fetch_failure() {
            return Err(FetchError::Unavailable("injected fetch failure".into()));
        }

        let records = self.read_records();
        let page = collate(&records, query)?;
        tracing::debug!(total = page.total, returned = page.items.len(), "fetched page");
        Ok(page)
    }

    async fn update_many(&self, updates: Vec<R>) -> Result<BatchReport<R::Id>, MutationError> {
        self.settle().await;
        if self.faults.take_mutation_failure() {
            return Err(MutationError::Submit("injected mutation failure".into()));
        }

        let mut records = self.write_records();
        let mut report = BatchReport::new();
        for update in updates {
            let id = update.id();
            match records.iter().position(|r| r.id() == id) {
                Some(pos) => {
                    records[pos] = update;
                    report.applied.push(id);
                }
                None => report.failed.push((id, TargetFailure::NotFound)),
            }
        }
        tracing::debug!(
            applied = report.applied.len(),
            failed = report.failed.len(),
            "update_many"
        );
        Ok(report)
    }

    async fn update_all(
        &self,
        patch: PatchFn<R>,
        scope: &Scope,
    ) -> Result<BatchReport<R::Id>, MutationError> {
        self.settle().await;
        if self.faults.take_mutation_failure() {
            return Err(MutationError::Submit("injected mutation failure".into()));
        }

        // Membership is computed now, against current records, not against
        // whatever snapshot the caller was looking at when it queued this.
        let predicate = Predicate::compile::<R>(scope)?;
        let mut records = self.write_records();
        let mut report = BatchReport::new();
        for record in records.iter_mut() {
            if predicate.matches(record) {
                *record = patch(record);
                report.applied.push(record.id());
            }
        }
        tracing::debug!(applied = report.applied.len(), "update_all");
        Ok(report)
    }

    async fn delete_many(&self, ids: Vec<R::Id>) -> Result<BatchReport<R::Id>, MutationError> {
        self.settle().await;
        if self.faults.take_mutation_failure() {
            return Err(MutationError::Submit("injected mutation failure".into()));
        }

        let mut records = self.write_records();
        let mut report = BatchReport::new();
        for id in ids {
            match records.iter().position(|r| r.id() == id) {
                Some(pos) => {
                    records.remove(pos);
                    report.applied.push(id);
                }
                None => report.failed.push((id, TargetFailure::NotFound)),
            }
        }
        tracing::debug!(
            applied = report.applied.len(),
            failed = report.failed.len(),
            "delete_many"
        );
        Ok(report)
    }

    async fn delete_all(&self, scope: &Scope) -> Result<BatchReport<R::Id>, MutationError> {
        self.settle().await;
        if self.faults.take_mutation_failure() {
            return Err(MutationError::Submit("injected mutation failure".into()));
        }

        let predicate = Predicate::compile::<R>(scope)?;
        let mut records = self.write_records();
        let mut report = BatchReport::new();
        records.retain(|record| {
            if predicate.matches(record) {
                report.applied.push(record.id());
                false
            } else {
                true
            }
        });
        tracing::debug!(deleted = report.applied.len(), "delete_all");
        Ok(report)
    }
}
