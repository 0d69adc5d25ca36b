//! Resource limits for strict analysis

use serde::{Deserialize, Serialize};

/// Bounds applied by [`crate::analysis::Analyzer`] and the parse cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum raw submission length in bytes
    pub max_input_len: usize,
    /// Maximum sub-expression nesting depth (the top level is depth 0)
    pub max_nesting_depth: usize,
    /// Maximum operand count of one XOR group (paths grow as 2^n)
    pub max_xor_operands: usize,
    /// Maximum number of trees held by the parse cache
    pub max_cache_entries: usize,
    /// Maximum expanded truth table rows, true and false together
    pub max_rows: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_len: 10_000,
            max_nesting_depth: 32,
            max_xor_operands: 12,
            max_cache_entries: 2048,
            max_rows: 65_536,
        }
    }
}

impl Limits {
    /// Limits that never reject anything
    pub fn unbounded() -> Self {
        Self {
            max_input_len: usize::MAX,
            max_nesting_depth: usize::MAX,
            max_xor_operands: usize::MAX,
            max_cache_entries: usize::MAX,
            max_rows: usize::MAX,
        }
    }
}
