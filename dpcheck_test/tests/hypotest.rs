//! Hypothesis-test scenarios around a claimed ε = 0.5 noisy-max run, on both
//! a single-worker and a default-sized pool.
use dpcheck::hypotest::hypothesis_test_pair;
use dpcheck::mechanisms::NoisyMaxArgmax;
use dpcheck::{Event, EventCoord, MechanismArgs};
use dpcheck_testing::{eventually, MAX_RUNS};

const ITERATIONS: u64 = 100_000;

fn run_scenarios(threads: usize) {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .unwrap();
    let d1 = [0.0, 2.0, 2.0, 2.0, 2.0];
    let d2 = [1.0; 5];
    let args = MechanismArgs::with_epsilon(0.5);
    let event = Event::from(EventCoord::Exact(0));

    let test_pair = |epsilon| {
        hypothesis_test_pair(
            &pool,
            &NoisyMaxArgmax,
            &d1,
            &d2,
            &args,
            &event,
            epsilon,
            ITERATIONS,
        )
        .unwrap()
    };

    // below the claim the violation shows up one-sided
    eventually(MAX_RUNS, || {
        let (p1, p2) = test_pair(0.25);
        p1 <= 0.05 && (0.95..=1.0).contains(&p2)
    });
    // at the claim neither direction is significant
    eventually(MAX_RUNS, || {
        let (p1, p2) = test_pair(0.5);
        (0.05..=1.0).contains(&p1) && (0.95..=1.0).contains(&p2)
    });
    // above the claim both directions are clearly satisfied
    eventually(MAX_RUNS, || {
        let (p1, p2) = test_pair(0.75);
        p1 >= 0.95 && p2 >= 0.95
    });
}

#[test]
fn test_hypothesis_test_single_core() {
    run_scenarios(1);
}

#[test]
fn test_hypothesis_test_multi_core() {
    run_scenarios(0);
}
