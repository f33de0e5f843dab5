/// Generates an end-to-end detection test for a mechanism expected to satisfy
/// its claimed ε = 0.7 budget: the detector must flag it below the claim
/// (p ≤ 0.05 at ε = 0.6) and pass it at and above the claim (p ≥ 0.05 at
/// ε = 0.7, p ≥ 0.95 at ε = 0.8).
///
/// # Parameters
///
/// - `mechanism_type`: The mechanism type to test (e.g., `NoisyMaxArgmax`)
/// - `name`: Suffix of the generated test function name
/// - `num_input`: The database size to generate candidates for
/// - `sensitivity`: The neighboring regime
/// - `args`: Extra mechanism arguments besides the claimed budget
#[macro_export]
macro_rules! correct_mechanism_tests {
    ($mechanism_type:ty, $name:ident, $num_input:expr, $sensitivity:expr, $args:expr$(,)?) => {
        compose_idents::compose_idents!(test_fn = concat(test_correct_, $name), {
            #[test]
            fn test_fn() {
                let mut args = $args;
                args.set(::dpcheck::EPSILON, 0.7);
                let options = ::dpcheck::DetectionOptions {
                    num_input: vec![$num_input],
                    sensitivity: $sensitivity,
                    quiet: true,
                    ..::dpcheck::DetectionOptions::default()
                };
                ::dpcheck_testing::eventually(::dpcheck_testing::MAX_RUNS, || {
                    let reports = ::dpcheck::detect_counterexample(
                        &<$mechanism_type>::default(),
                        &[0.6, 0.7, 0.8],
                        &args,
                        &options,
                    )
                    .expect("detection failed");
                    reports[0].p_value <= 0.05
                        && reports[1].p_value >= 0.05
                        && reports[2].p_value >= 0.95
                });
            }
        });
    };
}
pub use correct_mechanism_tests;

/// Generates an end-to-end detection test for a mechanism with a known-broken
/// privacy claim: the detector must falsify the claimed ε = 0.7 budget at the
/// claim itself (p ≤ 0.05 at ε = 0.7).
#[macro_export]
macro_rules! incorrect_mechanism_tests {
    ($mechanism_type:ty, $name:ident, $num_input:expr, $sensitivity:expr, $args:expr$(,)?) => {
        compose_idents::compose_idents!(test_fn = concat(test_incorrect_, $name), {
            #[test]
            fn test_fn() {
                let mut args = $args;
                args.set(::dpcheck::EPSILON, 0.7);
                let options = ::dpcheck::DetectionOptions {
                    num_input: vec![$num_input],
                    sensitivity: $sensitivity,
                    quiet: true,
                    ..::dpcheck::DetectionOptions::default()
                };
                ::dpcheck_testing::eventually(::dpcheck_testing::MAX_RUNS, || {
                    let reports = ::dpcheck::detect_counterexample(
                        &<$mechanism_type>::default(),
                        &[0.7],
                        &args,
                        &options,
                    )
                    .expect("detection failed");
                    reports[0].p_value <= 0.05
                });
            }
        });
    };
}
pub use incorrect_mechanism_tests;
