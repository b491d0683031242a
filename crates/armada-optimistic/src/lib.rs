//! Optimistic mutation reconciliation over a collection backend.
//!
//! A mutation batch applies to the client-visible view immediately, then
//! submits asynchronously. On success it commits; on failure the view is
//! restored from the batch's pre-mutation snapshot and a failure
//! notification is surfaced. Independent of any rendering framework.

pub mod batch;
pub mod notify;
pub mod reconciler;

pub use batch::{BatchId, BatchState, MutationBatch};
pub use notify::Notification;
pub use reconciler::{MutationOptions, OptimisticCollection};
