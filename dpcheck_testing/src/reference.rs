//! High-precision reference statistics backed by `statrs`, used to validate
//! the hand-rolled numerics.
use statrs::distribution::{Discrete, DiscreteCDF, Hypergeometric};
use statrs::function::factorial::ln_binomial;

/// Reference hypergeometric probability mass at `k` for population
/// `population`, success count `successes` and draw size `draws`.
pub fn hypergeom_pmf(k: i64, population: u64, successes: u64, draws: u64) -> f64 {
    if k < 0 {
        return 0.0;
    }
    let distribution = Hypergeometric::new(population, successes, draws).unwrap();
    distribution.pmf(k as u64)
}

/// Reference hypergeometric survival function `Pr[X > k]`.
pub fn hypergeom_sf(k: i64, population: u64, successes: u64, draws: u64) -> f64 {
    if k < 0 {
        return 1.0;
    }
    let distribution = Hypergeometric::new(population, successes, draws).unwrap();
    distribution.sf(k as u64)
}

/// Reference log of the binomial coefficient `n choose k`.
pub fn log_binomial(n: u64, k: u64) -> f64 {
    ln_binomial(n, k)
}
