//! CLI command implementations.

mod available;
mod benchmark;

pub use available::{available, AvailableArgs};
pub use benchmark::{benchmark, BenchmarkArgs};
