//! Event selection: over a set of neighboring-input candidates and their
//! auto-discovered event spaces, picks the combination most likely to expose
//! a privacy violation.
use crate::hypotest::test_statistic;
use crate::sampler::{run_mechanism, EventCount};
use dpcheck_core::{DpCheckError, Event, Mechanism, MechanismArgs};
use indicatif::ProgressBar;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use tracing::debug;

/// Events with fewer than `RARE_EVENT_FACTOR · iterations · e^ε` joint
/// occurrences carry too little signal; their p-value is reported as `+∞` so
/// they can never win selection.
const RARE_EVENT_FACTOR: f64 = 0.001;

/// A neighboring database pair together with the arguments to run the
/// mechanism with.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPair {
    pub d1: Vec<f64>,
    pub d2: Vec<f64>,
    pub args: MechanismArgs,
}

/// The input pair and event chosen by [`select_event`].
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub input: InputPair,
    pub event: Event,
}

/// Samples every candidate input pair on the worker pool with an
/// auto-generated event space, scores each event with the single-shot test
/// statistic and returns the candidate/event pair with the minimum p-value.
///
/// Ties resolve to the first minimum in candidate order, which is
/// deterministic for a deterministic candidate list.
pub fn select_event<M>(
    pool: &rayon::ThreadPool,
    mechanism: &M,
    input_list: &[InputPair],
    epsilon: f64,
    iterations: u64,
    quiet: bool,
) -> Result<Selection, DpCheckError>
where
    M: Mechanism,
{
    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(input_list.len() as u64)
    };

    let tallies: Vec<Vec<EventCount>> = pool.install(|| {
        input_list
            .par_iter()
            .map(|input| {
                let mut prng = ChaCha20Rng::from_os_rng();
                let counts = run_mechanism(
                    mechanism,
                    &mut prng,
                    &input.d1,
                    &input.d2,
                    &input.args,
                    None,
                    iterations,
                );
                progress.inc(1);
                counts
            })
            .collect::<Result<_, _>>()
    })?;
    progress.finish_and_clear();

    let threshold = RARE_EVENT_FACTOR * iterations as f64 * epsilon.exp();
    let mut prng = ChaCha20Rng::from_os_rng();
    let mut best: Option<(f64, Selection)> = None;
    for (input, counts) in input_list.iter().zip(&tallies) {
        for count in counts {
            let p_value = if (count.cx + count.cy) as f64 > threshold {
                test_statistic(&mut prng, count.cx, count.cy, epsilon, iterations)?
            } else {
                f64::INFINITY
            };
            debug!(
                d1 = ?input.d1,
                d2 = ?input.d2,
                args = %input.args,
                event = %count.event,
                p_value,
                cx = count.cx,
                cy = count.cy,
                ratio = if count.cx > 0 { count.cy as f64 / count.cx as f64 } else { f64::INFINITY },
                "event candidate evaluated"
            );
            if best.as_ref().map_or(true, |(best_p, _)| p_value < *best_p) {
                best = Some((
                    p_value,
                    Selection { input: input.clone(), event: count.event.clone() },
                ));
            }
        }
    }
    best.map(|(_, selection)| selection).ok_or(DpCheckError::NoCandidates)
}
