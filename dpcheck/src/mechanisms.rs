//! Reference differentially-private mechanisms used as detector inputs.
//!
//! The suite pairs each correct mechanism with known-broken variants whose
//! privacy claims the detector is expected to falsify, following the
//! benchmark of [Lyu et al. (2017)] for the sparse-vector family.
//!
//! [Lyu et al. (2017)]: https://doi.org/10.14778/3055330.3055331
use dpcheck_core::{DpCheckError, Mechanism, MechanismArgs, Output};
use rand::Rng;
use rand_distr::{Distribution, Exp};

/// Laplace noise with the given scale, sampled by inverting the CDF of a
/// uniform draw. A zero scale (infinite budget) yields no noise.
fn laplace<R: Rng + ?Sized>(prng: &mut R, scale: f64) -> f64 {
    if scale == 0.0 {
        return 0.0;
    }
    let u = prng.random::<f64>() - 0.5;
    -scale * u.signum() * (1.0 - 2.0 * u.abs()).ln()
}

/// Exponential noise with rate `lambda`. An infinite rate (infinite budget)
/// yields no noise.
fn exponential<R: Rng + ?Sized>(prng: &mut R, lambda: f64) -> f64 {
    match Exp::new(lambda) {
        Ok(exp) => exp.sample(prng),
        Err(_) => 0.0,
    }
}

/// Index of the first maximum.
fn argmax(values: impl Iterator<Item = f64>) -> usize {
    let mut best_index = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (index, value) in values.enumerate() {
        if value > best_value {
            best_index = index;
            best_value = value;
        }
    }
    best_index
}

/// Report-noisy-max with Laplace(2/ε) noise, returning the index of the
/// largest noisy query.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoisyMaxArgmax;

impl Mechanism for NoisyMaxArgmax {
    fn invoke<R: Rng + ?Sized>(
        &self,
        prng: &mut R,
        queries: &[f64],
        args: &MechanismArgs,
    ) -> Result<Output, DpCheckError> {
        let scale = 2.0 / args.epsilon()?;
        Ok(argmax(queries.iter().map(|&query| query + laplace(prng, scale))).into())
    }
}

/// Broken noisy-max that returns the maximum noisy value instead of its
/// index.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoisyMaxValue;

impl Mechanism for NoisyMaxValue {
    fn invoke<R: Rng + ?Sized>(
        &self,
        prng: &mut R,
        queries: &[f64],
        args: &MechanismArgs,
    ) -> Result<Output, DpCheckError> {
        let scale = 2.0 / args.epsilon()?;
        let maximum = queries
            .iter()
            .map(|&query| query + laplace(prng, scale))
            .fold(f64::NEG_INFINITY, f64::max);
        Ok(maximum.into())
    }
}

/// Report-noisy-max with Exponential(2/ε) noise.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoisyMaxExpArgmax;

impl Mechanism for NoisyMaxExpArgmax {
    fn invoke<R: Rng + ?Sized>(
        &self,
        prng: &mut R,
        queries: &[f64],
        args: &MechanismArgs,
    ) -> Result<Output, DpCheckError> {
        let rate = args.epsilon()? / 2.0;
        Ok(argmax(queries.iter().map(|&query| query + exponential(prng, rate))).into())
    }
}

/// Broken exponential-noise noisy-max returning the maximum value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoisyMaxExpValue;

impl Mechanism for NoisyMaxExpValue {
    fn invoke<R: Rng + ?Sized>(
        &self,
        prng: &mut R,
        queries: &[f64],
        args: &MechanismArgs,
    ) -> Result<Output, DpCheckError> {
        let rate = args.epsilon()? / 2.0;
        let maximum = queries
            .iter()
            .map(|&query| query + exponential(prng, rate))
            .fold(f64::NEG_INFINITY, f64::max);
        Ok(maximum.into())
    }
}

/// Histogram release with Laplace(1/ε) noise, returning the first noisy
/// count.
#[derive(Debug, Clone, Copy, Default)]
pub struct Histogram;

impl Mechanism for Histogram {
    fn invoke<R: Rng + ?Sized>(
        &self,
        prng: &mut R,
        queries: &[f64],
        args: &MechanismArgs,
    ) -> Result<Output, DpCheckError> {
        let scale = args.epsilon()?.recip();
        let first = queries.first().copied().unwrap_or_default();
        Ok((first + laplace(prng, scale)).into())
    }
}

/// Broken histogram using Laplace(ε) noise instead of Laplace(1/ε).
#[derive(Debug, Clone, Copy, Default)]
pub struct HistogramWrongScale;

impl Mechanism for HistogramWrongScale {
    fn invoke<R: Rng + ?Sized>(
        &self,
        prng: &mut R,
        queries: &[f64],
        args: &MechanismArgs,
    ) -> Result<Output, DpCheckError> {
        let scale = args.epsilon()?;
        let first = queries.first().copied().unwrap_or_default();
        Ok((first + laplace(prng, scale)).into())
    }
}

/// Distance between the answer vector and the fixed first-half-positive
/// pattern of length `total`. Positions past a truncated answer vector count
/// as mismatches.
fn pattern_distance(answers: &[bool], total: usize) -> f64 {
    let positive_count = total / 2;
    let mismatched = answers
        .iter()
        .enumerate()
        .filter(|&(index, &answer)| answer != (index < positive_count))
        .count();
    (mismatched + total.saturating_sub(answers.len())) as f64
}

/// Sparse-vector technique with parameters `N` (answer budget) and `T`
/// (threshold), returning the number of negative answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseVector;

impl Mechanism for SparseVector {
    fn invoke<R: Rng + ?Sized>(
        &self,
        prng: &mut R,
        queries: &[f64],
        args: &MechanismArgs,
    ) -> Result<Output, DpCheckError> {
        let epsilon = args.epsilon()?;
        let budget = args.require("N")? as u64;
        let threshold = args.require("T")?;
        let noisy_threshold = threshold + laplace(prng, 2.0 / epsilon);
        let mut negatives = 0_u64;
        let mut positives = 0_u64;
        for &query in queries {
            let noise = laplace(prng, 4.0 * budget as f64 / epsilon);
            if query + noise >= noisy_threshold {
                positives += 1;
                if positives >= budget {
                    break;
                }
            } else {
                negatives += 1;
            }
        }
        Ok((negatives as f64).into())
    }
}

/// Broken sparse vector that adds no noise to the queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseVectorNoQueryNoise;

impl Mechanism for SparseVectorNoQueryNoise {
    fn invoke<R: Rng + ?Sized>(
        &self,
        prng: &mut R,
        queries: &[f64],
        args: &MechanismArgs,
    ) -> Result<Output, DpCheckError> {
        let epsilon = args.epsilon()?;
        let threshold = args.require("T")?;
        let noisy_threshold = threshold + laplace(prng, 2.0 / epsilon);
        let answers: Vec<bool> = queries.iter().map(|&query| query >= noisy_threshold).collect();
        Ok(pattern_distance(&answers, queries.len()).into())
    }
}

/// Broken sparse vector whose query noise does not scale with `N` and whose
/// positive answers are unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseVectorUnbounded;

impl Mechanism for SparseVectorUnbounded {
    fn invoke<R: Rng + ?Sized>(
        &self,
        prng: &mut R,
        queries: &[f64],
        args: &MechanismArgs,
    ) -> Result<Output, DpCheckError> {
        let epsilon = args.epsilon()?;
        let threshold = args.require("T")?;
        let noisy_threshold = threshold + laplace(prng, 2.0 / epsilon);
        let answers: Vec<bool> = queries
            .iter()
            .map(|&query| query + laplace(prng, 2.0 / epsilon) >= noisy_threshold)
            .collect();
        Ok(pattern_distance(&answers, queries.len()).into())
    }
}

/// Broken sparse vector whose query noise does not scale with `N`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseVectorWrongScale;

impl Mechanism for SparseVectorWrongScale {
    fn invoke<R: Rng + ?Sized>(
        &self,
        prng: &mut R,
        queries: &[f64],
        args: &MechanismArgs,
    ) -> Result<Output, DpCheckError> {
        let epsilon = args.epsilon()?;
        let budget = args.require("N")? as u64;
        let threshold = args.require("T")?;
        let noisy_threshold = threshold + laplace(prng, 4.0 / epsilon);
        let mut answers = Vec::with_capacity(queries.len());
        let mut positives = 0_u64;
        for &query in queries {
            let noise = laplace(prng, 4.0 / (3.0 * epsilon));
            if query + noise > noisy_threshold {
                answers.push(true);
                positives += 1;
                if positives >= budget {
                    break;
                }
            } else {
                answers.push(false);
            }
        }
        Ok(pattern_distance(&answers, queries.len()).into())
    }
}

/// Broken sparse vector that leaks the noisy query value of every positive
/// answer. Returns the tuple `(number of negative answers, last output)`,
/// with negative answers coded as `0.0` in the second coordinate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseVectorLeaky;

impl Mechanism for SparseVectorLeaky {
    fn invoke<R: Rng + ?Sized>(
        &self,
        prng: &mut R,
        queries: &[f64],
        args: &MechanismArgs,
    ) -> Result<Output, DpCheckError> {
        let epsilon = args.epsilon()?;
        let budget = args.require("N")? as u64;
        let threshold = args.require("T")?;
        let noisy_threshold = threshold + laplace(prng, 2.0 / epsilon);
        let mut answers: Vec<f64> = Vec::with_capacity(queries.len());
        let mut negatives = 0_u64;
        let mut positives = 0_u64;
        for &query in queries {
            let noisy = query + laplace(prng, 2.0 * budget as f64 / epsilon);
            if noisy > noisy_threshold {
                answers.push(noisy);
                positives += 1;
                if positives >= budget {
                    break;
                }
            } else {
                answers.push(0.0);
                negatives += 1;
            }
        }
        let last = answers.last().copied().unwrap_or_default();
        Ok((negatives as f64, last).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpcheck_testing::os_rng;

    const INF: f64 = f64::INFINITY;

    fn noiseless(n_budget: f64, threshold: f64) -> MechanismArgs {
        MechanismArgs::with_epsilon(INF).with("N", n_budget).with("T", threshold)
    }

    #[test]
    fn test_noisy_max() {
        let mut prng = os_rng();
        let args = MechanismArgs::with_epsilon(INF);
        assert_eq!(
            NoisyMaxArgmax.invoke(&mut prng, &[1.0, 2.0, 1.0], &args),
            Ok(Output::Scalar(1.0))
        );
        assert_eq!(
            NoisyMaxValue.invoke(&mut prng, &[1.0, 3.0, 1.0], &args),
            Ok(Output::Scalar(3.0))
        );
        assert_eq!(
            NoisyMaxExpArgmax.invoke(&mut prng, &[1.0, 3.0, 1.0], &args),
            Ok(Output::Scalar(1.0))
        );
        assert_eq!(
            NoisyMaxExpValue.invoke(&mut prng, &[1.0, 3.0, 1.0], &args),
            Ok(Output::Scalar(3.0))
        );
    }

    #[test]
    fn test_sparse_vector() {
        let mut prng = os_rng();
        let queries = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(
            SparseVector.invoke(&mut prng, &queries, &noiseless(1.0, 2.5)),
            Ok(Output::Scalar(2.0))
        );
        assert_eq!(
            SparseVectorNoQueryNoise.invoke(&mut prng, &queries, &noiseless(1.0, 1.5)),
            Ok(Output::Scalar(3.0))
        );
        assert_eq!(
            SparseVectorNoQueryNoise.invoke(&mut prng, &queries, &noiseless(1.0, 3.5)),
            Ok(Output::Scalar(3.0))
        );
        assert_eq!(
            SparseVectorNoQueryNoise.invoke(&mut prng, &queries, &noiseless(1.0, 2.5)),
            Ok(Output::Scalar(4.0))
        );
        assert_eq!(
            SparseVectorNoQueryNoise.invoke(&mut prng, &[4.0, 3.0, 2.0, 1.0], &noiseless(1.0, 2.5)),
            Ok(Output::Scalar(0.0))
        );
        assert_eq!(
            SparseVectorUnbounded.invoke(&mut prng, &queries, &noiseless(1.0, 1.5)),
            Ok(Output::Scalar(3.0))
        );
        assert_eq!(
            SparseVectorWrongScale.invoke(&mut prng, &queries, &noiseless(1.0, 3.5)),
            Ok(Output::Scalar(3.0))
        );
        assert_eq!(
            SparseVectorLeaky.invoke(&mut prng, &queries, &noiseless(1.0, 2.0)),
            Ok(Output::Tuple(vec![2.0, 3.0]))
        );
    }

    #[test]
    fn test_histogram() {
        let mut prng = os_rng();
        assert_eq!(
            Histogram.invoke(&mut prng, &[1.0, 2.0], &MechanismArgs::with_epsilon(INF)),
            Ok(Output::Scalar(1.0))
        );
        assert_eq!(
            HistogramWrongScale.invoke(&mut prng, &[1.0, 2.0], &MechanismArgs::with_epsilon(0.0)),
            Ok(Output::Scalar(1.0))
        );
    }

    #[test]
    fn test_missing_parameters_are_rejected() {
        let mut prng = os_rng();
        assert_eq!(
            NoisyMaxArgmax.invoke(&mut prng, &[1.0], &MechanismArgs::new()),
            Err(DpCheckError::MissingEpsilon)
        );
        assert_eq!(
            SparseVector.invoke(&mut prng, &[1.0], &MechanismArgs::with_epsilon(1.0)),
            Err(DpCheckError::MissingArgument("N".to_owned()))
        );
    }
}
