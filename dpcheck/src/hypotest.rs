//! Hypothesis tester: p-values for the null hypothesis "the mechanism
//! satisfies ε-differential privacy on these inputs under this event".
use crate::hypergeom;
use crate::sampler::run_mechanism;
use dpcheck_core::{DpCheckError, Event, Mechanism, MechanismArgs};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Binomial, Distribution};
use rayon::prelude::*;

/// Number of binomial subsamples averaged by [`test_statistic`] to bound the
/// variance contributed by the randomness of `cx` itself.
const SUBSAMPLE_DRAWS: usize = 200;

/// P-value for observed counts `(cx, cy)` with `cx ≥ cy` out of `iterations`
/// runs per database, against the tested `epsilon`.
///
/// Conditional on the marginal successes, the count under the first database
/// of a 2×T draw is hypergeometric with population `2T`, success count `T`
/// and draw size `cx + cy`, giving the raw p-value `sf(cx − 1, 2T, T,
/// cx + cy)`. The returned value is the mean of that tail over draws
/// `cx' ~ Binomial(cx, e^−ε)`, the count expected to survive a hypothetical
/// ε-scaling.
pub fn test_statistic<R>(
    prng: &mut R,
    cx: u64,
    cy: u64,
    epsilon: f64,
    iterations: u64,
) -> Result<f64, DpCheckError>
where
    R: Rng + ?Sized,
{
    let binomial = Binomial::new(cx, (-epsilon).exp())
        .map_err(|_| DpCheckError::InvalidEpsilon(epsilon))?;
    let mut total = 0.0;
    for _ in 0..SUBSAMPLE_DRAWS {
        let subsampled = binomial.sample(prng);
        total += hypergeom::sf(
            subsampled as i64 - 1,
            2 * iterations,
            iterations,
            subsampled + cy,
        )?;
    }
    Ok(total / SUBSAMPLE_DRAWS as f64)
}

/// Runs the full hypothesis test: samples `iterations` runs per database
/// across the worker pool, sums the per-worker tallies of `event` and
/// computes [`test_statistic`] on the totals.
pub fn hypothesis_test<M>(
    pool: &rayon::ThreadPool,
    mechanism: &M,
    d1: &[f64],
    d2: &[f64],
    args: &MechanismArgs,
    event: &Event,
    epsilon: f64,
    iterations: u64,
) -> Result<f64, DpCheckError>
where
    M: Mechanism,
{
    let (cx, cy) = collect_counts(pool, mechanism, d1, d2, args, event, iterations)?;
    let mut prng = ChaCha20Rng::from_os_rng();
    test_statistic(&mut prng, cx, cy, epsilon, iterations)
}

/// Like [`hypothesis_test`], but also reports the reverse p-value computed
/// with the two counts exchanged.
pub fn hypothesis_test_pair<M>(
    pool: &rayon::ThreadPool,
    mechanism: &M,
    d1: &[f64],
    d2: &[f64],
    args: &MechanismArgs,
    event: &Event,
    epsilon: f64,
    iterations: u64,
) -> Result<(f64, f64), DpCheckError>
where
    M: Mechanism,
{
    let (cx, cy) = collect_counts(pool, mechanism, d1, d2, args, event, iterations)?;
    let mut prng = ChaCha20Rng::from_os_rng();
    let p1 = test_statistic(&mut prng, cx, cy, epsilon, iterations)?;
    let p2 = test_statistic(&mut prng, cy, cx, epsilon, iterations)?;
    Ok((p1, p2))
}

/// Partitions `iterations` into one nearly-equal chunk per worker (remainder
/// added to the last), samples every chunk on the pool with a worker-local
/// PRNG and sums the tallies.
fn collect_counts<M>(
    pool: &rayon::ThreadPool,
    mechanism: &M,
    d1: &[f64],
    d2: &[f64],
    args: &MechanismArgs,
    event: &Event,
    iterations: u64,
) -> Result<(u64, u64), DpCheckError>
where
    M: Mechanism,
{
    let workers = pool.current_num_threads().max(1) as u64;
    let chunks: Vec<u64> = if iterations < workers {
        vec![iterations]
    } else {
        let mut chunks = vec![iterations / workers; workers as usize];
        if let Some(last) = chunks.last_mut() {
            *last += iterations % workers;
        }
        chunks
    };

    let tallies = pool.install(|| {
        chunks
            .par_iter()
            .map(|&chunk| {
                let mut prng = ChaCha20Rng::from_os_rng();
                run_mechanism(mechanism, &mut prng, d1, d2, args, Some(event), chunk)
            })
            .collect::<Result<Vec<_>, _>>()
    })?;

    let mut cx = 0;
    let mut cy = 0;
    for tally in tallies.iter().flatten() {
        cx += tally.cx;
        cy += tally.cy;
    }
    Ok(if cx >= cy { (cx, cy) } else { (cy, cx) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpcheck_testing::{assert_close, seeded_rng};

    #[test]
    fn test_statistic_symmetry_limits() {
        let mut prng = seeded_rng(31);
        assert_close(test_statistic(&mut prng, 1000, 1000, 1.0, 2000).unwrap(), 1.0, 7);
        assert_close(test_statistic(&mut prng, 1999, 1, 1.0, 2000).unwrap(), 0.0, 7);
    }

    #[test]
    fn test_statistic_monotone_in_cx() {
        let mut prng = seeded_rng(37);
        let p_values: Vec<f64> = [400, 800, 1600]
            .iter()
            .map(|&cx| test_statistic(&mut prng, cx, 100, 0.5, 2000).unwrap())
            .collect();
        assert!(p_values[0] >= p_values[1]);
        assert!(p_values[1] >= p_values[2]);
    }

    #[test]
    fn test_statistic_monotone_in_epsilon() {
        let mut prng = seeded_rng(41);
        let p_values: Vec<f64> = [0.1, 0.5, 1.0, 2.0]
            .iter()
            .map(|&epsilon| test_statistic(&mut prng, 800, 100, epsilon, 2000).unwrap())
            .collect();
        for pair in p_values.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn test_statistic_rejects_negative_epsilon() {
        let mut prng = seeded_rng(43);
        assert_eq!(
            test_statistic(&mut prng, 100, 10, -0.5, 1000),
            Err(DpCheckError::InvalidEpsilon(-0.5))
        );
    }
}
