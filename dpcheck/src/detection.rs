//! Detection driver: sweeps a list of test-ε values, selecting the most
//! promising input/event per ε and testing it with the detection budget.
use crate::generators::{generate_databases, resolve_arguments, Sensitivity};
use crate::hypotest::hypothesis_test;
use crate::selectors::{select_event, InputPair, Selection};
use dpcheck_core::{DpCheckError, Event, Mechanism, MechanismArgs, EPSILON};
use indicatif::ProgressBar;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

/// Configuration of [`detect_counterexample`].
#[derive(Debug, Clone)]
pub struct DetectionOptions {
    /// Explicit `(D1, D2)` pair to test; candidates are generated when absent.
    pub databases: Option<(Vec<f64>, Vec<f64>)>,
    /// Database sizes to generate candidates for.
    pub num_input: Vec<usize>,
    /// Sampler budget of the event-selection phase.
    pub event_iterations: u64,
    /// Sampler budget of the detection phase.
    pub detect_iterations: u64,
    /// Worker-pool size; the number of logical CPUs when `None`.
    pub cores: Option<usize>,
    /// Neighboring regime used when generating candidates.
    pub sensitivity: Sensitivity,
    /// Suppresses progress output. Logs are unaffected.
    pub quiet: bool,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        DetectionOptions {
            databases: None,
            num_input: vec![5, 10],
            event_iterations: 100_000,
            detect_iterations: 500_000,
            cores: None,
            sensitivity: Sensitivity::AllDiffer,
            quiet: false,
        }
    }
}

/// Outcome of one tested ε.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionReport {
    pub epsilon: f64,
    pub p_value: f64,
    pub d1: Vec<f64>,
    pub d2: Vec<f64>,
    pub args: MechanismArgs,
    pub event: Event,
}

/// Searches for counterexamples to the mechanism's privacy claim at each of
/// `test_epsilons`, in request order.
///
/// For every ε the selector picks the `(D1, D2, args, event)` with the
/// minimum p-value under the event-selection budget, and the tester then
/// recomputes the p-value on that choice under the larger detection budget.
/// A p-value ≤ 0.05 is statistically significant evidence that the claim is
/// violated at that ε.
pub fn detect_counterexample<M>(
    mechanism: &M,
    test_epsilons: &[f64],
    default_args: &MechanismArgs,
    options: &DetectionOptions,
) -> Result<Vec<DetectionReport>, DpCheckError>
where
    M: Mechanism,
{
    info!(
        epsilons = ?test_epsilons,
        args = %default_args,
        cores = ?options.cores,
        "starting counterexample detection"
    );

    let pool = ThreadPoolBuilder::new()
        .num_threads(options.cores.unwrap_or(0))
        .build()
        .map_err(|error| DpCheckError::WorkerPool(error.to_string()))?;

    let progress = if options.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(test_epsilons.len() as u64)
    };

    let mut reports = Vec::with_capacity(test_epsilons.len());
    for &epsilon in test_epsilons {
        let input_list = candidate_inputs(default_args, epsilon, options);
        let Selection { input, event } = select_event(
            &pool,
            mechanism,
            &input_list,
            epsilon,
            options.event_iterations,
            options.quiet,
        )?;
        let p_value = hypothesis_test(
            &pool,
            mechanism,
            &input.d1,
            &input.d2,
            &input.args,
            &event,
            epsilon,
            options.detect_iterations,
        )?;
        info!(epsilon, p_value, event = %event, "epsilon tested");
        debug!(d1 = ?input.d1, d2 = ?input.d2, args = %input.args, "chosen input pair");
        if !options.quiet {
            progress.println(format!(
                "epsilon: {epsilon} | p-value: {p_value:5.3} | event: {event}"
            ));
        }
        reports.push(DetectionReport {
            epsilon,
            p_value,
            d1: input.d1,
            d2: input.d2,
            args: input.args,
            event,
        });
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(reports)
}

/// Builds the validated candidate list for one tested ε.
///
/// The claimed budget stays fixed across the sweep when the caller supplied
/// one; the current test ε only fills the gap when no `epsilon` was given.
fn candidate_inputs(
    default_args: &MechanismArgs,
    epsilon: f64,
    options: &DetectionOptions,
) -> Vec<InputPair> {
    let mut args = default_args.clone();
    if !args.contains(EPSILON) {
        debug!(epsilon, "no claimed budget supplied, testing against the current epsilon");
        args.set(EPSILON, epsilon);
    }

    let pairs: Vec<(Vec<f64>, Vec<f64>)> = match &options.databases {
        Some((d1, d2)) => vec![(d1.clone(), d2.clone())],
        None => options
            .num_input
            .iter()
            .flat_map(|&num_input| generate_databases(num_input, options.sensitivity))
            .collect(),
    };

    pairs
        .into_iter()
        .filter_map(|(d1, d2)| resolve_arguments(&args).map(|args| InputPair { d1, d2, args }))
        .collect()
}
