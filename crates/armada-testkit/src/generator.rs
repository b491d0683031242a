use crate::rng::SimRng;

/// Build `count` records with a caller-supplied factory.
///
/// The factory receives the record's index and the shared RNG, mirroring
/// how a mock service seeds its dataset at construction. Records come
/// back in generation order, which the backend treats as insertion order.
pub fn generate<R>(
    count: usize,
    rng: &mut SimRng,
    mut factory: impl FnMut(usize, &mut SimRng) -> R,
) -> Vec<R> {
    (0..count).map(|i| factory(i, rng)).collect()
}
