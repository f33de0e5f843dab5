//! The mechanism contract: a randomized algorithm under privacy test.
use crate::DpCheckError;
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;

/// Name of the privacy-budget parameter every mechanism receives.
pub const EPSILON: &str = "epsilon";

/// Named scalar parameters passed to a mechanism on every invocation.
///
/// Backed by an ordered map so that log output is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MechanismArgs {
    values: BTreeMap<String, f64>,
}

impl MechanismArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments carrying only the `epsilon` privacy budget.
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self::new().with(EPSILON, epsilon)
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_owned(), value);
    }

    /// Builder-style [`MechanismArgs::set`].
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The value of a parameter the mechanism cannot run without.
    pub fn require(&self, name: &str) -> Result<f64, DpCheckError> {
        self.get(name)
            .ok_or_else(|| DpCheckError::MissingArgument(name.to_owned()))
    }

    /// The `epsilon` privacy budget.
    pub fn epsilon(&self) -> Result<f64, DpCheckError> {
        self.get(EPSILON).ok_or(DpCheckError::MissingEpsilon)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl fmt::Display for MechanismArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (index, (name, value)) in self.values.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

/// Output of a single mechanism invocation: one scalar, or a fixed-arity
/// ordered tuple of scalars.
///
/// Boolean-valued coordinates must be coerced to `0.0`/`1.0` by the mechanism
/// before the output is constructed, so that every coordinate carries a
/// uniform numeric type across invocations.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Scalar(f64),
    Tuple(Vec<f64>),
}

impl Output {
    /// Number of return coordinates.
    pub fn arity(&self) -> usize {
        match self {
            Output::Scalar(_) => 1,
            Output::Tuple(values) => values.len(),
        }
    }

    /// Appends the output coordinates to the per-coordinate columns.
    ///
    /// Fails when the arity does not match the column count, i.e. the return
    /// shape drifted since the shape-discovery run.
    pub fn append_to(&self, columns: &mut [Vec<f64>]) -> Result<(), DpCheckError> {
        match self {
            Output::Scalar(value) if columns.len() == 1 => {
                columns[0].push(*value);
                Ok(())
            }
            Output::Tuple(values) if values.len() == columns.len() => {
                for (column, value) in columns.iter_mut().zip(values) {
                    column.push(*value);
                }
                Ok(())
            }
            _ => Err(DpCheckError::ReturnShapeDrift {
                expected: columns.len(),
                got: self.arity(),
            }),
        }
    }
}

impl From<f64> for Output {
    fn from(value: f64) -> Self {
        Output::Scalar(value)
    }
}

impl From<usize> for Output {
    fn from(value: usize) -> Self {
        Output::Scalar(value as f64)
    }
}

impl From<(f64, f64)> for Output {
    fn from((first, second): (f64, f64)) -> Self {
        Output::Tuple(vec![first, second])
    }
}

/// A randomized algorithm under test.
///
/// A mechanism receives an explicit pseudo-random source, an ordered sequence
/// of real-valued queries, and named scalar parameters that include the
/// `epsilon` privacy budget. It returns either one scalar or a fixed-arity
/// tuple of scalars; the return shape must not change between invocations for
/// the same parameters. Mechanisms never mutate their inputs and never reach
/// for thread-local randomness.
pub trait Mechanism: Sync {
    /// Runs the mechanism once.
    fn invoke<R: Rng + ?Sized>(
        &self,
        prng: &mut R,
        queries: &[f64],
        args: &MechanismArgs,
    ) -> Result<Output, DpCheckError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_accessors() {
        let args = MechanismArgs::with_epsilon(0.7).with("N", 1.0);
        assert_eq!(args.epsilon(), Ok(0.7));
        assert_eq!(args.require("N"), Ok(1.0));
        assert_eq!(args.get("T"), None);
        assert_eq!(
            args.require("T"),
            Err(DpCheckError::MissingArgument("T".to_owned()))
        );
        assert_eq!(MechanismArgs::new().epsilon(), Err(DpCheckError::MissingEpsilon));
    }

    #[test]
    fn test_args_display_is_ordered() {
        let args = MechanismArgs::with_epsilon(0.5).with("T", 1.0).with("N", 2.0);
        assert_eq!(args.to_string(), "{N: 2, T: 1, epsilon: 0.5}");
    }

    #[test]
    fn test_output_append() {
        let mut columns = vec![Vec::new(), Vec::new()];
        Output::from((1.0, 2.0)).append_to(&mut columns).unwrap();
        Output::Tuple(vec![3.0, 4.0]).append_to(&mut columns).unwrap();
        assert_eq!(columns, vec![vec![1.0, 3.0], vec![2.0, 4.0]]);

        assert_eq!(
            Output::from(1.0).append_to(&mut columns),
            Err(DpCheckError::ReturnShapeDrift { expected: 2, got: 1 })
        );
    }
}
