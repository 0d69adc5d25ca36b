//! Expression parsing and truth-path analysis
//!
//! This module turns conditional source text such as `if (a || (b && c)) {`
//! into a tree of conditions joined by operators, computes the compact
//! evaluation paths of every level and expands them to leaf granularity.

mod ast;
pub mod cache;
mod expander;
mod normalizer;
mod operator;
pub mod parser;
mod paths;
pub mod scanner;
mod tristate;


pub use ast::*;
pub use cache::*;
pub use expander::*;
pub use normalizer::*;
pub use operator::*;
pub use parser::*;
pub use paths::*;
pub use scanner::*;
pub use tristate::*;
