//! Monte-Carlo sampler: runs a mechanism many times on a pair of neighboring
//! databases and tallies how often each candidate output event occurs.
use dpcheck_core::{DpCheckError, Event, EventCoord, Mechanism, MechanismArgs};
use itertools::Itertools;
use ndarray::Array1;
use rand::Rng;
use tracing::debug;

/// Iterations materialized per chunk. Larger requests are split so the
/// per-coordinate output columns stay bounded in memory.
const MAX_CHUNK_ITERATIONS: u64 = 1_000_000;

/// Fraction of the chunk size below which the number of distinct values marks
/// a coordinate as categorical.
const CATEGORICAL_FRACTION: f64 = 0.002;

/// Fraction of the combined outputs covered by the densest window whose
/// endpoints bound the interval search space of a continuous coordinate.
const DENSEST_WINDOW_FRACTION: f64 = 0.7;

/// Number of `(−∞, α)` half-lines generated per continuous coordinate.
const NUM_HALF_LINES: usize = 10;

/// An event together with its occurrence counts under the two databases.
///
/// `cx` is always the larger of the two counts.
#[derive(Debug, Clone, PartialEq)]
pub struct EventCount {
    pub event: Event,
    pub cx: u64,
    pub cy: u64,
}

/// Runs `mechanism` on `d1` and `d2` for `total_iterations` each and counts,
/// for every candidate event, how many outputs fall inside it.
///
/// When `event` is given the tally covers exactly that event; otherwise an
/// event search space is derived from the outputs of the first chunk, one
/// coordinate space per return coordinate, combined as a Cartesian product.
pub fn run_mechanism<M, R>(
    mechanism: &M,
    prng: &mut R,
    d1: &[f64],
    d2: &[f64],
    args: &MechanismArgs,
    event: Option<&Event>,
    total_iterations: u64,
) -> Result<Vec<EventCount>, DpCheckError>
where
    M: Mechanism,
    R: Rng + ?Sized,
{
    // one sample run to discover the return shape
    let sample = mechanism.invoke(prng, d1, args)?;
    let arity = sample.arity();
    if arity == 0 {
        return Err(DpCheckError::UnsupportedReturn);
    }
    if let Some(event) = event {
        if event.arity() != arity {
            return Err(DpCheckError::EventDimensionMismatch {
                expected: arity,
                got: event.arity(),
            });
        }
    }
    if total_iterations > MAX_CHUNK_ITERATIONS {
        debug!(total_iterations, "iterations too large, dividing into chunks");
    }

    let mut events: Vec<Event> = Vec::new();
    let mut counts: Vec<(u64, u64)> = Vec::new();
    let mut first_chunk = true;

    let mut remaining = total_iterations;
    loop {
        let iterations = remaining.min(MAX_CHUNK_ITERATIONS);
        let mut columns_d1 = vec![Vec::with_capacity(iterations as usize); arity];
        let mut columns_d2 = vec![Vec::with_capacity(iterations as usize); arity];
        for _ in 0..iterations {
            mechanism.invoke(prng, d1, args)?.append_to(&mut columns_d1)?;
            mechanism.invoke(prng, d2, args)?.append_to(&mut columns_d2)?;
        }

        if first_chunk {
            events = match event {
                Some(event) => vec![event.clone()],
                None => {
                    let space = generate_event_space(&columns_d1, &columns_d2, iterations);
                    debug!(num_events = space.len(), "event search space generated");
                    space
                }
            };
            counts = vec![(0, 0); events.len()];
            first_chunk = false;
        }

        for (slot, candidate) in counts.iter_mut().zip(&events) {
            slot.0 += count_matches(candidate, &columns_d1);
            slot.1 += count_matches(candidate, &columns_d2);
        }

        remaining -= iterations;
        if remaining == 0 {
            break;
        }
    }

    Ok(events
        .into_iter()
        .zip(counts)
        .map(|(event, (cx, cy))| {
            let (cx, cy) = if cx >= cy { (cx, cy) } else { (cy, cx) };
            EventCount { event, cx, cy }
        })
        .collect())
}

/// Number of iterations whose output satisfies every coordinate of `event`.
fn count_matches(event: &Event, columns: &[Vec<f64>]) -> u64 {
    let len = columns.first().map_or(0, Vec::len);
    (0..len)
        .filter(|&i| {
            event
                .coords()
                .iter()
                .zip(columns)
                .all(|(coord, column)| coord.contains(column[i]))
        })
        .count() as u64
}

/// Derives the per-coordinate event search space from the outputs of the
/// first chunk and combines the coordinate spaces as a Cartesian product.
///
/// A coordinate with few distinct values is categorical and contributes one
/// exact event per observed value. A continuous coordinate contributes 10
/// `(−∞, α)` half-lines whose endpoints span the densest 70% of the combined
/// outputs. Only lower half-lines are generated; upper tails are deliberately
/// not part of the search space.
fn generate_event_space(
    columns_d1: &[Vec<f64>],
    columns_d2: &[Vec<f64>],
    iterations: u64,
) -> Vec<Event> {
    let mut coordinate_spaces: Vec<Vec<EventCoord>> = Vec::with_capacity(columns_d1.len());
    for (column_d1, column_d2) in columns_d1.iter().zip(columns_d2) {
        let mut combined: Vec<f64> = column_d1.iter().chain(column_d2).copied().collect();
        combined.sort_unstable_by(f64::total_cmp);

        let mut unique = combined.clone();
        unique.dedup();
        if (unique.len() as f64) < CATEGORICAL_FRACTION * iterations as f64 {
            coordinate_spaces.push(
                unique
                    .into_iter()
                    .map(|value| EventCoord::Exact(value as i64))
                    .collect(),
            );
            continue;
        }

        // the contiguous index window of this length with minimum span holds
        // the densest DENSEST_WINDOW_FRACTION of the combined outputs
        let window = (DENSEST_WINDOW_FRACTION * combined.len() as f64) as usize;
        let mut upper = None;
        for candidate in window..combined.len() {
            let span = combined[candidate] - combined[candidate - window];
            let better = match upper {
                Some((_, best_span)) => span < best_span,
                None => true,
            };
            if better {
                upper = Some((candidate, span));
            }
        }
        let Some((upper, _)) = upper else {
            coordinate_spaces.push(Vec::new());
            continue;
        };
        let endpoints = Array1::linspace(combined[upper - window], combined[upper], NUM_HALF_LINES);
        coordinate_spaces.push(
            endpoints
                .iter()
                .map(|&alpha| EventCoord::Interval(f64::NEG_INFINITY, alpha))
                .collect(),
        );
    }

    coordinate_spaces
        .into_iter()
        .multi_cartesian_product()
        .map(Event::new)
        .collect()
}
