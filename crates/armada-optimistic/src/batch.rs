use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one optimistic mutation batch.
pub type BatchId = Uuid;

/// Lifecycle of an optimistic mutation batch.
///
/// A batch starts `Pending` the moment its tentative view change is
/// applied, then settles exactly once: `Committed` when the submit
/// succeeds, `RolledBack` when it fails and the view is restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchState {
    Pending,
    Committed,
    RolledBack,
}

/// One in-flight or settled mutation batch.
#[derive(Debug, Clone)]
pub struct MutationBatch<R> {
    pub id: BatchId,
    pub state: BatchState,
    pub started: DateTime<Utc>,
    pub settled: Option<DateTime<Utc>>,
    /// The view as it was before the tentative apply; restored verbatim
    /// on rollback.
    pub(crate) snapshot: Vec<R>,
}

impl<R> MutationBatch<R> {
    pub(crate) fn pending(snapshot: Vec<R>) -> Self {
        MutationBatch {
            id: Uuid::new_v4(),
            state: BatchState::Pending,
            started: Utc::now(),
            settled: None,
            snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_batches_are_pending() {
        let batch: MutationBatch<u8> = MutationBatch::pending(vec![1, 2, 3]);
        assert_eq!(batch.state, BatchState::Pending);
        assert!(batch.settled.is_none());
        assert_eq!(batch.snapshot, [1, 2, 3]);
    }

    #[test]
    fn batch_state_serde_round_trip() {
        for state in [BatchState::Pending, BatchState::Committed, BatchState::RolledBack] {
            let json = serde_json::to_string(&state).unwrap();
            let back: BatchState = serde_json::from_str(&json).unwrap();
            assert_eq!(state, back);
        }
    }
}
