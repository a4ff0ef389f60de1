//! Built-in analysis passes.

pub mod verification;

pub use verification::{GatesInBasis, GatesInBasisResult};
