//! Configuration module for the parser token sets and analysis limits
//!
//! Token sets are regex fragments, joined into alternations and compiled once
//! into [`TokenPatterns`]. Compiled patterns hold no match state, so one set
//! can be shared by every parse on every thread.

mod limits;
mod tokens;

pub use limits::*;
pub use tokens::*;

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Parser configuration: token sets plus limits for strict analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Line break tokens collapsed to a single space by the normalizer
    pub line_break: Vec<String>,
    /// AND operator tokens
    pub and: Vec<String>,
    /// OR operator tokens
    pub or: Vec<String>,
    /// XOR operator tokens
    pub xor: Vec<String>,
    /// Syntax stripped from the start of a submission
    pub ignore_leading: Vec<String>,
    /// Syntax stripped from the end of a submission
    pub ignore_trailing: Vec<String>,
    /// Limits enforced by the strict analyzer and the parse cache
    pub limits: Limits,
}

fn tokens(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            line_break: tokens(&[r"\r\n", r"\r", r"\n"]),
            and: tokens(&[r"&&", r"\sAND\s"]),
            or: tokens(&[r"\|\|", r"\sOR\s"]),
            xor: tokens(&[r"\^", r"\sXOR\s"]),
            ignore_leading: tokens(&[r"\s", r"if\b", r"else\b", r"elseif\b", r"\}"]),
            ignore_trailing: tokens(&[r"\s", r"\{", r";"]),
            limits: Limits::default(),
        }
    }
}

impl ParserConfig {
    /// Load a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ParserConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject token sets the parser cannot work with
    pub fn validate(&self) -> Result<()> {
        for (name, list) in [("and", &self.and), ("or", &self.or), ("xor", &self.xor)] {
            if list.is_empty() || list.iter().any(|t| t.is_empty()) {
                return Err(AnalysisError::Deserialization(format!(
                    "operator token list `{}` must contain only non-empty tokens",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Compile the token sets into reusable patterns
    pub fn compile(&self) -> Result<TokenPatterns> {
        self.validate()?;
        TokenPatterns::compile(self)
    }
}
