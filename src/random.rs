//! Random source construction.
//!
//! Every stochastic step in the optimizer receives an explicit `&mut R`
//! created here. There is no shared global generator: the orchestrator owns
//! one master RNG and each parallel batch gets its own, seeded from
//! [`derive_seed`].

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Creates a seeded random number generator.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Derives an independent seed for stream `index` from `base`.
///
/// Uses the SplitMix64 finalizer so that consecutive indices map to
/// well-separated seeds.
///
/// Reference: Steele, Lea & Flood (2014), "Fast Splittable Pseudorandom
/// Number Generators"
pub fn derive_seed(base: u64, index: u64) -> u64 {
    let mut z = base.wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
