use serde::{Deserialize, Serialize};

use crate::batch::BatchId;

/// User-facing outcome of a settled mutation batch.
///
/// Surfaced on the subscription channel when a batch commits or rolls
/// back; the UI layer renders these as toasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    Success { batch: BatchId, message: String },
    Failure { batch: BatchId, message: String },
}

impl Notification {
    pub fn message(&self) -> &str {
        match self {
            Notification::Success { message, .. } | Notification::Failure { message, .. } => message,
        }
    }

    pub fn batch(&self) -> BatchId {
        match self {
            Notification::Success { batch, .. } | Notification::Failure { batch, .. } => *batch,
        }
    }
}
