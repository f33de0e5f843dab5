//! Neighboring database candidates and argument validation.
use dpcheck_core::{MechanismArgs, EPSILON};
use tracing::error;

/// Neighboring regime of a database pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensitivity {
    /// Every pair of elements may differ by at most 1 in absolute value.
    AllDiffer,
    /// Exactly one element differs, by 1; all others are equal.
    OneDiffer,
}

/// Generates candidate `(D1, D2)` pairs of length `num_input`, assuming a
/// maximum per-element distance of 1.
///
/// Both regimes get the two baseline candidates (one element below, one
/// above); `AllDiffer` adds the patterns that move every element at once,
/// including the crossed-halves pair.
pub fn generate_databases(num_input: usize, sensitivity: Sensitivity) -> Vec<(Vec<f64>, Vec<f64>)> {
    let with_head = |head: f64, rest: f64| {
        let mut d2 = vec![rest; num_input];
        if let Some(first) = d2.first_mut() {
            *first = head;
        }
        d2
    };

    let d1 = vec![1.0; num_input];
    let mut candidates = vec![
        (d1.clone(), with_head(0.0, 1.0)), // one below
        (d1.clone(), with_head(2.0, 1.0)), // one above
    ];

    if sensitivity == Sensitivity::AllDiffer {
        let half = num_input / 2;
        let mut half_half = vec![2.0; half];
        half_half.resize(num_input, 0.0);
        let mut crossed_d1 = vec![1.0; half];
        crossed_d1.resize(num_input, 0.0);
        let mut crossed_d2 = vec![0.0; half];
        crossed_d2.resize(num_input, 1.0);
        candidates.extend([
            (d1.clone(), with_head(2.0, 0.0)), // one above, rest below
            (d1.clone(), with_head(0.0, 2.0)), // one below, rest above
            (d1.clone(), half_half),
            (d1.clone(), vec![2.0; num_input]), // all above
            (d1.clone(), vec![0.0; num_input]), // all below
            (crossed_d1, crossed_d2),
        ]);
    }

    candidates
}

/// Validates that the supplied arguments carry the `epsilon` privacy budget.
///
/// A refused candidate is logged and yields `None`, which callers skip.
pub fn resolve_arguments(args: &MechanismArgs) -> Option<MechanismArgs> {
    if !args.contains(EPSILON) {
        error!("the `epsilon` privacy budget is not provided");
        return None;
    }
    Some(args.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_differ_candidates() {
        let candidates = generate_databases(5, Sensitivity::AllDiffer);
        assert_eq!(candidates.len(), 8);
        for (d1, d2) in &candidates {
            assert_eq!(d1.len(), 5);
            assert_eq!(d2.len(), 5);
            for (a, b) in d1.iter().zip(d2) {
                assert!((a - b).abs() <= 1.0);
            }
        }
    }

    #[test]
    fn test_one_differ_candidates() {
        let candidates = generate_databases(5, Sensitivity::OneDiffer);
        assert_eq!(candidates.len(), 2);
        for (d1, d2) in &candidates {
            assert_eq!(d1.len(), 5);
            assert_eq!(d2.len(), 5);
            let unequal = d1.iter().zip(d2).filter(|(a, b)| a != b).count();
            assert_eq!(unequal, 1);
        }
    }

    #[test]
    fn test_crossed_halves_shape() {
        let candidates = generate_databases(5, Sensitivity::AllDiffer);
        let (d1, d2) = candidates.last().unwrap();
        assert_eq!(d1, &[1.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(d2, &[0.0, 0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_resolve_arguments() {
        assert!(resolve_arguments(&MechanismArgs::with_epsilon(0.5)).is_some());
        assert!(resolve_arguments(&MechanismArgs::new().with("N", 1.0)).is_none());
    }
}
