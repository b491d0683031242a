use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted failures for the simulated backend.
///
/// Counters are armed by tests and consumed one per call, so "the next
/// submit rejects" scenarios are deterministic without touching the
/// backend's data.
#[derive(Debug, Default)]
pub struct FaultPlan {
    fetch_failures: AtomicUsize,
    mutation_failures: AtomicUsize,
}

impl FaultPlan {
    /// Make the next `n` page fetches fail.
    pub fn fail_next_fetches(&self, n: usize) {
        self.fetch_failures.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` mutation submits fail.
    pub fn fail_next_mutations(&self, n: usize) {
        self.mutation_failures.store(n, Ordering::SeqCst);
    }

    pub(crate) fn take_fetch_failure(&self) -> bool {
        take(&self.fetch_failures)
    }

    pub(crate) fn take_mutation_failure(&self) -> bool {
        take(&self.mutation_failures)
    }
}

fn take(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}
