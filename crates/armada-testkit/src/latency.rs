use std::time::Duration;

use crate::rng::SimRng;

/// Bounded random delay applied to every simulated backend call.
///
/// Models network variance: the sample affects timing only, never
/// results. `none` disables delay for deterministic tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayProfile {
    min: Duration,
    max: Duration,
}

impl DelayProfile {
    /// Delay between `min_ms` and `max_ms` milliseconds, inclusive.
    /// Bounds are normalized so the smaller one is the floor.
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        DelayProfile {
            min: Duration::from_millis(min_ms.min(max_ms)),
            max: Duration::from_millis(min_ms.max(max_ms)),
        }
    }

    /// No delay at all.
    pub fn none() -> Self {
        DelayProfile {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.max.is_zero()
    }

    pub(crate) fn sample(&self, rng: &mut SimRng) -> Duration {
        if self.is_zero() {
            return Duration::ZERO;
        }
        let min_ms = self.min.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        Duration::from_millis(rng.int_in(min_ms as i64, max_ms as i64) as u64)
    }
}

impl Default for DelayProfile {
    fn default() -> Self {
        // Latency envelope of a plausible remote backend.
        DelayProfile::from_millis(300, 900)
    }
}
