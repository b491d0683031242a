use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, MutationError};
use crate::page::Page;
use crate::query::{Query, Scope};
use crate::record::Record;

/// Why one target of a batch mutation did not apply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TargetFailure {
    #[error("no record with this id")]
    NotFound,

    #[error("rejected: {0}")]
    Rejected(String),
}

/// Per-target outcome of a batch mutation.
///
/// A batch that reaches the backend never collapses into a single boolean:
/// callers see exactly which targets applied and which failed, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport<Id> {
    pub applied: Vec<Id>,
    pub failed: Vec<(Id, TargetFailure)>,
}

impl<Id> BatchReport<Id> {
    pub fn new() -> Self {
        BatchReport {
            applied: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn all_applied(&self) -> bool {
        self.failed.is_empty()
    }
}

impl<Id> Default for BatchReport<Id> {
    fn default() -> Self {
        Self::new()
    }
}

/// Patch applied to every record in a bulk update's scope.
pub type PatchFn<R> = Box<dyn Fn(&R) -> R + Send + Sync>;

/// The read/mutation surface of a record collection.
///
/// Consumed by a UI-facing layer and implemented by a data source; filter
/// and sort specs are plain data, so an implementation may equally be an
/// in-process store or a remote API client. All entry points are
/// asynchronous, and scoped bulk mutations recompute scope membership at
/// submit time rather than trusting a snapshot taken earlier.
///
/// Unknown ids in `update_many` / `delete_many` are reported per-target as
/// [`TargetFailure::NotFound`] while the rest of the batch still applies.
/// Concurrent mutations of the same record are not serialized; whichever
/// submission completes last wins.
#[async_trait]
pub trait CollectionBackend<R: Record>: Send + Sync {
    /// Fetch one page of the collection.
    async fn fetch_page(&self, query: &Query) -> Result<Page<R>, FetchError>;

    /// Replace stored records by id. Callers merge fields before
    /// submitting.
    async fn update_many(&self, records: Vec<R>) -> Result<BatchReport<R::Id>, MutationError>;

    /// Apply a patch to every record matching `scope` at submit time.
    async fn update_all(
        &self,
        patch: PatchFn<R>,
        scope: &Scope,
    ) -> Result<BatchReport<R::Id>, MutationError>;

    /// Remove records by id.
    async fn delete_many(&self, ids: Vec<R::Id>) -> Result<BatchReport<R::Id>, MutationError>;

    /// Remove every record matching `scope` at submit time.
    async fn delete_all(&self, scope: &Scope) -> Result<BatchReport<R::Id>, MutationError>;
}
