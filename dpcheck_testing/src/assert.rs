//! Numeric assertion helpers.
use num_traits::Float;
use std::fmt::Debug;

/// Asserts that two values agree to the given number of decimal places, i.e.
/// that they differ by at most `1.5 · 10^-decimals`.
pub fn assert_close<V>(actual: V, expected: V, decimals: i32)
where
    V: Float + Debug,
{
    let tolerance = V::from(1.5).unwrap() * V::from(10.0).unwrap().powi(-decimals);
    let difference = (actual - expected).abs();
    assert!(
        difference <= tolerance,
        "values differ by {:?} at {} decimal places: {:?} vs {:?}",
        difference,
        decimals,
        actual,
        expected
    );
}
