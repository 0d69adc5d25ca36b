//! Strict analysis facade
//!
//! Wraps the total parser with input limits and mixed-operator gating and
//! produces a self-contained truth table for presentation layers.

mod analyzer;
#[cfg(feature = "python")]
mod session;

pub use analyzer::*;
#[cfg(feature = "python")]
pub use session::*;
