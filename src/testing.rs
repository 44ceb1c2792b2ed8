use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

/// Fixed random seed to support repeatable testing
const SEED: [u8; 32] = [
    7, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 15, 14, 13, 12, 11, 10, 9, 8, 7, 6,
    5, 4, 3, 2, 1,
];

/// Get a random number generator with a const seed for repeatable testing
pub fn rng_fixed_seed() -> StdRng {
    StdRng::from_seed(SEED)
}

/// Generate `n` coordinates uniformly distributed in `[lo, hi)`
pub fn random_points(rng: &mut StdRng, n: usize, lo: f64, hi: f64) -> Vec<f64> {
    std::iter::repeat_with(|| rng.random_range(lo..hi))
        .take(n)
        .collect()
}
