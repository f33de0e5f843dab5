//! PRNG helpers for tests.
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// A `ChaCha20Rng` with a fixed seed, for deterministic tests.
pub fn seeded_rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// A `ChaCha20Rng` seeded from OS entropy, matching how worker tasks seed
/// their streams.
pub fn os_rng() -> ChaCha20Rng {
    ChaCha20Rng::from_os_rng()
}
