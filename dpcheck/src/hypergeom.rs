//! Probability mass and survival functions of the hypergeometric
//! distribution, following the `(k, M, n, N)` parameter convention of
//! `scipy.stats.hypergeom`: population size `M`, number of success objects
//! `n`, number of draws `N`.
//!
//! Mathematically `sf(k) = 1 - cdf(k)`, but subtracting the cdf from 1 loses
//! six or more decimals in the tails, so the survival function instead
//! propagates the pmf through its forward/backward recurrences as described
//! by [Wu (1993)].
//!
//! [Wu (1993)]: https://doi.org/10.1145/151271.151274
use dpcheck_core::DpCheckError;
use statrs::function::gamma::ln_gamma;

/// Log of the binomial coefficient `n choose k`.
fn ln_binomial(n: u64, k: u64) -> f64 {
    debug_assert!(k <= n, r#""k" must not exceed "n""#);
    if k == n || k == 0 {
        return 0.0;
    }
    let k = if k * 2 > n { n - k } else { k };
    ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0)
}

/// Probability that a hypergeometric draw of `draws` objects out of a
/// population of `population` objects, `successes` of which are of type 1,
/// yields exactly `k` type-1 objects.
pub fn pmf(k: i64, population: u64, successes: u64, draws: u64) -> Result<f64, DpCheckError> {
    if draws > population {
        return Err(DpCheckError::DrawsExceedPopulation { draws, population });
    }
    if k < 0 {
        return Ok(0.0);
    }
    let k = k as u64;
    if k > successes || k > draws {
        return Ok(0.0);
    }
    if draws > population - successes && k + population - successes < draws {
        return Ok(0.0);
    }
    let log_mass = ln_binomial(successes, k) + ln_binomial(population - successes, draws - k)
        - ln_binomial(population, draws);
    Ok(log_mass.exp())
}

/// Survival function `Pr[X > k]` of the same distribution.
pub fn sf(k: i64, population: u64, successes: u64, draws: u64) -> Result<f64, DpCheckError> {
    if draws > population {
        return Err(DpCheckError::DrawsExceedPopulation { draws, population });
    }
    if k >= successes.min(draws) as i64 {
        return Ok(0.0);
    }
    if k < 0 {
        return Ok(1.0);
    }

    let m = population as f64;
    let n = successes as f64;
    let nn = draws as f64;

    // The distribution peaks at k = N·n/M. Summing the pmf away from the mode
    // keeps the recurrence from starting at a near-zero term whose relative
    // error would be amplified through every step:
    //   P(X=i+1) = P(X=i) · ((n−i)/(i+1)) · ((N−i)/(M−n+i+1−N))
    //   P(X=i−1) = P(X=i) · (i/(n−i+1)) · ((M−n+i−N)/(N−i+1))
    if k as f64 > nn * n / m {
        let mut pmf_i = pmf(k + 1, population, successes, draws)?;
        let mut result = pmf_i;
        for i in (k + 1)..draws as i64 {
            let i = i as f64;
            pmf_i *= ((n - i) / (i + 1.0)) * ((nn - i) / (m - n + i + 1.0 - nn));
            result += pmf_i;
        }
        Ok(result)
    } else {
        let mut pmf_i = pmf(k, population, successes, draws)?;
        let mut result = pmf_i;
        for i in (1..=k).rev() {
            let i = i as f64;
            pmf_i *= (i / (n - i + 1.0)) * ((m - n + i - nn) / (nn - i + 1.0));
            result += pmf_i;
        }
        Ok(1.0 - result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpcheck_testing::{assert_close, log_binomial as reference_ln_binomial};
    use dpcheck_testing::{hypergeom_pmf as reference_pmf, hypergeom_sf as reference_sf};

    #[test]
    fn test_precision() {
        assert_close(pmf(2, 2500, 50, 500).unwrap(), 0.0010114963068932233, 11);
    }

    #[test]
    fn test_ln_binomial() {
        assert_close(ln_binomial(200, 100), reference_ln_binomial(200, 100), 11);
        assert_close(ln_binomial(5, 3), reference_ln_binomial(5, 3), 11);
        assert_close(ln_binomial(67, 32), reference_ln_binomial(67, 32), 11);
        assert_eq!(ln_binomial(100, 0), 0.0);
        assert_eq!(ln_binomial(100, 100), 0.0);
    }

    #[test]
    fn test_pmf() {
        assert_close(pmf(0, 2, 1, 0).unwrap(), 1.0, 11);
        assert_close(pmf(1, 2, 1, 0).unwrap(), 0.0, 11);
        assert_close(pmf(0, 2, 0, 2).unwrap(), 1.0, 11);
        assert_close(pmf(-1, 100, 5, 10).unwrap(), 0.0, 11);
    }

    #[test]
    fn test_pmf_against_reference() {
        for population in (1000..10000).step_by(500) {
            for successes in (1000..population).step_by(500) {
                for draws in (10..1000).step_by(50) {
                    for k in (10..draws).step_by(30) {
                        assert_close(
                            pmf(k as i64, population, successes, draws).unwrap(),
                            reference_pmf(k as i64, population, successes, draws),
                            9,
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_pmf_rejects_oversized_draw() {
        assert_eq!(
            pmf(1, 100, 20, 300),
            Err(DpCheckError::DrawsExceedPopulation { draws: 300, population: 100 })
        );
    }

    #[test]
    fn test_sf_against_reference() {
        for population in (1000..10000).step_by(500) {
            for successes in (1000..population).step_by(500) {
                for draws in (10..1000).step_by(50) {
                    for k in (10..draws).step_by(30) {
                        assert_close(
                            sf(k as i64, population, successes, draws).unwrap(),
                            reference_sf(k as i64, population, successes, draws),
                            9,
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_sf_boundaries() {
        // k >= min(n, N)
        assert_eq!(sf(20, 100, 5, 10).unwrap(), 0.0);
        // k < 0
        assert_eq!(sf(-1, 100, 5, 10).unwrap(), 1.0);
        assert_eq!(
            sf(1, 100, 20, 300),
            Err(DpCheckError::DrawsExceedPopulation { draws: 300, population: 100 })
        );
    }
}
