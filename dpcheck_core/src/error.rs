//! Error definitions.
use thiserror::Error;

/// Project-wise error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DpCheckError {
    /// Hypergeometric parameters where the number of draws exceeds the
    /// population size.
    #[error("the number of draws ({draws}) is larger than the total number of objects ({population})")]
    DrawsExceedPopulation { draws: u64, population: u64 },
    /// A pre-specified event whose dimension does not match the return arity
    /// of the mechanism.
    #[error("given event should have the same dimension as the return value (expected {expected}, got {got})")]
    EventDimensionMismatch { expected: usize, got: usize },
    /// A mechanism output that is neither a scalar nor a fixed-arity tuple of
    /// scalars.
    #[error("unsupported mechanism return: outputs must be a scalar or a non-empty tuple of scalars")]
    UnsupportedReturn,
    /// A mechanism whose return arity changed between invocations.
    #[error("mechanism return arity changed from {expected} to {got} between invocations")]
    ReturnShapeDrift { expected: usize, got: usize },
    /// Mechanism arguments with no `epsilon` privacy budget.
    #[error("the `epsilon` privacy budget is not provided")]
    MissingEpsilon,
    /// A mechanism argument required by the mechanism but absent from the map.
    #[error("mechanism argument `{0}` is not provided")]
    MissingArgument(String),
    /// A privacy budget outside the valid range.
    #[error("invalid privacy budget {0}; epsilon must be non-negative")]
    InvalidEpsilon(f64),
    /// An input candidate list with nothing to select from.
    #[error("no input candidates available for event selection")]
    NoCandidates,
    /// Worker-pool construction failure.
    #[error("unable to build the worker pool: {0}")]
    WorkerPool(String),
}
