use std::sync::{mpsc, Arc, Mutex, PoisonError, RwLock};

use chrono::Utc;

use armada_core::{
    compare_records, BatchReport, CollectionBackend, Cursor, FetchError, MutationError, Page,
    PatchFn, Predicate, Query, Record, SortKey,
};

use crate::batch::{BatchId, BatchState, MutationBatch};
use crate::notify::Notification;

/// Per-batch knobs for an optimistic mutation.
#[derive(Debug, Clone, Default)]
pub struct MutationOptions {
    /// Keep a mutated record at its current position in the view even if
    /// it no longer matches the active filter, so the user does not lose
    /// it mid-edit. Without this, such records drop out immediately.
    pub keep_position: bool,
    /// Overrides the default success notification text.
    pub success_message: Option<String>,
    /// Overrides the default failure notification text.
    pub failure_message: Option<String>,
}

impl MutationOptions {
    pub fn keep_position() -> Self {
        MutationOptions {
            keep_position: true,
            ..MutationOptions::default()
        }
    }

    pub fn with_success(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }
}

/// Client-visible collection view with optimistic mutations.
///
/// Mutations apply to the view immediately and submit to the backend
/// asynchronously. A successful submit commits the tentative state; a
/// failed one restores the pre-mutation snapshot and surfaces a failure
/// notification. "All" variants operate on the current query's scope and
/// leave membership to the backend, which recomputes it at submit time.
///
/// Overlapping in-flight batches are not serialized: each snapshots the
/// view it saw, and whichever settles last determines the final view.
/// After a lost race the next `refresh` reconverges on backend state.
pub struct OptimisticCollection<R: Record, B> {
    backend: B,
    query: RwLock<Query>,
    view: RwLock<Vec<R>>,
    next_cursor: RwLock<Option<Cursor>>,
    batches: RwLock<Vec<MutationBatch<R>>>,
    subscribers: Mutex<Vec<mpsc::Sender<Notification>>>,
}

impl<R: Record, B: CollectionBackend<R>> OptimisticCollection<R, B> {
    pub fn new(backend: B, query: Query) -> Self {
        OptimisticCollection {
            backend,
            query: RwLock::new(query),
            view: RwLock::new(Vec::new()),
            next_cursor: RwLock::new(None),
            batches: RwLock::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// The backend this collection submits to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn query(&self) -> Query {
        self.query.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replace the active query (filters, search, sort). The view keeps
    /// its current contents until the next `refresh`.
    pub fn set_query(&self, query: Query) {
        *self.query.write().unwrap_or_else(PoisonError::into_inner) = query;
        *self.write_cursor() = None;
    }

    /// Current view contents, in display order.
    pub fn items(&self) -> Vec<R> {
        self.read_view().clone()
    }

    /// Ids and states of every batch issued so far, oldest first.
    pub fn batches(&self) -> Vec<(BatchId, BatchState)> {
        self.read_batches().iter().map(|b| (b.id, b.state)).collect()
    }

    pub fn batch_state(&self, id: BatchId) -> Option<BatchState> {
        self.read_batches()
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.state)
    }

    /// Receive a notification per settled batch.
    pub fn subscribe(&self) -> mpsc::Receiver<Notification> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Reload the first page for the active query. On failure the prior
    /// view is retained.
    pub async fn refresh(&self) -> Result<Page<R>, FetchError> {
        let query = Query {
            cursor: None,
            ..self.query()
        };
        let page = self.backend.fetch_page(&query).await?;
        *self.write_view() = page.items.clone();
        *self.write_cursor() = page.cursor.clone();
        Ok(page)
    }

    /// Fetch and append the next page, if any. Returns whether more pages
    /// remain afterwards.
    pub async fn load_more(&self) -> Result<bool, FetchError> {
        let cursor = match self.next_cursor.read().unwrap_or_else(PoisonError::into_inner).clone() {
            Some(cursor) => cursor,
            None => return Ok(false),
        };
        let query = Query {
            cursor: Some(cursor),
            ..self.query()
        };
        let page = self.backend.fetch_page(&query).await?;
        let more = page.cursor.is_some();
        self.write_view().extend(page.items);
        *self.write_cursor() = page.cursor;
        Ok(more)
    }

    pub async fn update_one(
        &self,
        record: R,
        options: MutationOptions,
    ) -> Result<BatchId, MutationError> {
        self.update_many(vec![record], options).await
    }

    /// Optimistically replace the given records, then submit.
    pub async fn update_many(
        &self,
        records: Vec<R>,
        options: MutationOptions,
    ) -> Result<BatchId, MutationError> {
        let query = self.query();
        let predicate = Predicate::compile::<R>(&query.scope())?;

        let batch = {
            let mut view = self.write_view();
            let batch = MutationBatch::pending(view.clone());
            for record in &records {
                match view.iter().position(|r| r.id() == record.id()) {
                    Some(pos) if predicate.matches(record) || options.keep_position => {
                        view[pos] = record.clone();
                    }
                    Some(pos) => {
                        view.remove(pos);
                    }
                    // Not on the current page; the backend still gets it.
                    None => {}
                }
            }
            resort(&mut view, &query.sort);
            batch
        };
        let id = self.push_batch(batch, records.len(), "update");

        let outcome = settle_outcome(self.backend.update_many(records).await);
        self.settle(id, outcome, &options, "updated");
        Ok(id)
    }

    /// Optimistically patch every view record matching the current scope,
    /// then submit. The backend re-derives scope membership at submit
    /// time, so records that drifted in or out since the view loaded are
    /// handled there.
    pub async fn update_all(
        &self,
        patch: impl Fn(&R) -> R + Send + Sync + 'static,
        options: MutationOptions,
    ) -> Result<BatchId, MutationError> {
        let query = self.query();
        let scope = query.scope();
        let predicate = Predicate::compile::<R>(&scope)?;
        let patch = Arc::new(patch);

        let (batch, touched) = {
            let mut view = self.write_view();
            let batch = MutationBatch::pending(view.clone());
            let mut touched = 0;
            let mut index = 0;
            while index < view.len() {
                if !predicate.matches(&view[index]) {
                    index += 1;
                    continue;
                }
                touched += 1;
                let patched = (*patch)(&view[index]);
                if predicate.matches(&patched) || options.keep_position {
                    view[index] = patched;
                    index += 1;
                } else {
                    view.remove(index);
                }
            }
            resort(&mut view, &query.sort);
            (batch, touched)
        };
        let id = self.push_batch(batch, touched, "update_all");

        let submit: PatchFn<R> = {
            let patch = Arc::clone(&patch);
            Box::new(move |record| (*patch)(record))
        };
        let outcome = settle_outcome(self.backend.update_all(submit, &scope).await);
        self.settle(id, outcome, &options, "updated");
        Ok(id)
    }

    pub async fn delete_one(
        &self,
        id: R::Id,
        options: MutationOptions,
    ) -> Result<BatchId, MutationError> {
        self.delete_many(vec![id], options).await
    }

    /// Optimistically remove the given records, then submit.
    pub async fn delete_many(
        &self,
        ids: Vec<R::Id>,
        options: MutationOptions,
    ) -> Result<BatchId, MutationError> {
        let batch = {
            let mut view = self.write_view();
            let batch = MutationBatch::pending(view.clone());
            for id in &ids {
                if let Some(pos) = view.iter().position(|r| r.id() == *id) {
                    view.remove(pos);
                }
            }
            batch
        };
        let id = self.push_batch(batch, ids.len(), "delete");

        let outcome = settle_outcome(self.backend.delete_many(ids).await);
        self.settle(id, outcome, &options, "deleted");
        Ok(id)
    }

    /// Optimistically remove every view record matching the current
    /// scope, then submit. Scope membership is re-derived by the backend
    /// at submit time.
    pub async fn delete_all(&self, options: MutationOptions) -> Result<BatchId, MutationError> {
        let query = self.query();
        let scope = query.scope();
        let predicate = Predicate::compile::<R>(&scope)?;

        let (batch, touched) = {
            let mut view = self.write_view();
            let batch = MutationBatch::pending(view.clone());
            let before = view.len();
            view.retain(|record| !predicate.matches(record));
            let touched = before - view.len();
            (batch, touched)
        };
        let id = self.push_batch(batch, touched, "delete_all");

        let outcome = settle_outcome(self.backend.delete_all(&scope).await);
        self.settle(id, outcome, &options, "deleted");
        Ok(id)
    }

    fn push_batch(&self, batch: MutationBatch<R>, targets: usize, kind: &str) -> BatchId {
        let id = batch.id;
        tracing::debug!(batch = %id, targets, kind, "tentative apply");
        self.write_batches().push(batch);
        id
    }

    fn settle(
        &self,
        id: BatchId,
        outcome: Result<usize, String>,
        options: &MutationOptions,
        verb: &str,
    ) {
        match outcome {
            Ok(count) => {
                self.mark(id, BatchState::Committed);
                tracing::info!(batch = %id, count, "mutation committed");
                let message = options
                    .success_message
                    .clone()
                    .unwrap_or_else(|| format!("{count} records {verb}"));
                self.notify(Notification::Success { batch: id, message });
            }
            Err(reason) => {
                if let Some(snapshot) = self.snapshot_of(id) {
                    *self.write_view() = snapshot;
                }
                self.mark(id, BatchState::RolledBack);
                tracing::warn!(batch = %id, reason, "mutation rolled back");
                let message = options.failure_message.clone().unwrap_or(reason);
                self.notify(Notification::Failure { batch: id, message });
            }
        }
    }

    fn mark(&self, id: BatchId, state: BatchState) {
        let mut batches = self.write_batches();
        if let Some(batch) = batches.iter_mut().find(|b| b.id == id) {
            batch.state = state;
            batch.settled = Some(Utc::now());
        }
    }

    fn snapshot_of(&self, id: BatchId) -> Option<Vec<R>> {
        self.read_batches()
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.snapshot.clone())
    }

    fn notify(&self, notification: Notification) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(notification.clone()).is_ok());
    }

    fn read_view(&self) -> std::sync::RwLockReadGuard<'_, Vec<R>> {
        self.view.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_view(&self) -> std::sync::RwLockWriteGuard<'_, Vec<R>> {
        self.view.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cursor(&self) -> std::sync::RwLockWriteGuard<'_, Option<Cursor>> {
        self.next_cursor.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_batches(&self) -> std::sync::RwLockReadGuard<'_, Vec<MutationBatch<R>>> {
        self.batches.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_batches(&self) -> std::sync::RwLockWriteGuard<'_, Vec<MutationBatch<R>>> {
        self.batches.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An empty ordering means the view's existing order is preserved; the
/// collection is never resorted behind the user's back.
fn resort<R: Record>(view: &mut [R], sort: &[SortKey]) {
    if sort.is_empty() {
        return;
    }
    view.sort_by(|a, b| compare_records(a, b, sort));
}

/// Collapse a backend result into commit/rollback. A report with any
/// per-target failure rolls the batch back: the view must not keep
/// tentative state the backend only partially accepted.
fn settle_outcome<Id>(result: Result<BatchReport<Id>, MutationError>) -> Result<usize, String> {
    match result {
        Ok(report) if report.all_applied() => Ok(report.applied.len()),
        Ok(report) => Err(format!(
            "{} of {} targets failed",
            report.failed.len(),
            report.applied.len() + report.failed.len()
        )),
        Err(err) => Err(err.to_string()),
    }
}
