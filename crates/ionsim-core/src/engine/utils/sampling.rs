use rand::SeedableRng;
use rand::rngs::StdRng;

/// Golden-ratio increment used to spread consecutive site indices across the
/// seed space.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed of the generator owned by site `index` in a run seeded with `seed`.
#[inline]
pub fn site_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64).wrapping_mul(SEED_STRIDE)
}

/// Independent generator for one lattice site.
///
/// Each site draws from its own stream, so the outcome of a site depends only
/// on the run seed and its index, never on which worker thread handled it.
pub fn site_rng(seed: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(site_seed(seed, index))
}
