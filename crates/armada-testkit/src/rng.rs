use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Seeded random number generator for the simulated backend.
///
/// The same seed always produces the same sequence, so generated datasets
/// and sampled latencies are reproducible. `fork` derives an independent
/// stream, letting one seed drive dataset generation and latency sampling
/// without the two interleaving.
#[derive(Debug, Clone)]
pub struct SimRng {
    rng: ChaCha20Rng,
    seed: u64,
    forks: u64,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng {
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
            forks: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Uniform integer in `[min, max]`.
    pub fn int_in(&mut self, min: i64, max: i64) -> i64 {
        self.rng.gen_range(min..=max)
    }

    /// Uniform usize in `[min, max]`.
    pub fn usize_in(&mut self, min: usize, max: usize) -> usize {
        self.rng.gen_range(min..=max)
    }

    /// Uniform float in `[min, max)`.
    pub fn f64_in(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniformly chosen element of a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.usize_in(0, items.len() - 1)]
    }

    /// Derive an independent stream. The fork seed mixes the parent seed
    /// with a fork counter so successive forks diverge.
    pub fn fork(&mut self) -> Self {
        self.forks += 1;
        let fork_seed = self
            .seed
            .wrapping_add(self.forks.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        SimRng::new(fork_seed)
    }
}
