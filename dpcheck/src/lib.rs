//! Statistical counterexample detection for differential-privacy mechanisms,
//! based on [Ding et al. (2018)].
//!
//! Given a mechanism that claims to satisfy ε-differential privacy, the
//! detector searches for a pair of neighboring databases and an output event
//! whose observed probability ratio exceeds `exp(ε)` with statistical
//! significance. The result is one p-value per tested ε; a p-value below 0.05
//! is a counterexample to the claim. The tool only falsifies — it never
//! proves a mechanism private.
//!
//! [Ding et al. (2018)]: https://doi.org/10.1145/3243734.3243818
pub mod detection;
pub mod generators;
pub mod hypergeom;
pub mod hypotest;
pub mod mechanisms;
pub mod sampler;
pub mod selectors;

pub use detection::{detect_counterexample, DetectionOptions, DetectionReport};
pub use dpcheck_core::{
    DpCheckError, Event, EventCoord, Mechanism, MechanismArgs, Output, EPSILON,
};
pub use generators::{generate_databases, resolve_arguments, Sensitivity};
pub use hypotest::{hypothesis_test, hypothesis_test_pair, test_statistic};
pub use sampler::{run_mechanism, EventCount};
pub use selectors::{select_event, InputPair, Selection};
