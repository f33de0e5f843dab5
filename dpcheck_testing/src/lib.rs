//! Test-support utilities for the dpcheck workspace.
pub mod assert;
pub use assert::*;

pub mod reference;
pub use reference::*;

pub mod retry;
pub use retry::*;

pub mod rng;
pub use rng::*;
