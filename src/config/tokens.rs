//! Compiled token patterns

use super::ParserConfig;
use crate::error::{AnalysisError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Patterns compiled from the default [`ParserConfig`]
pub static DEFAULT_PATTERNS: Lazy<TokenPatterns> = Lazy::new(|| {
    ParserConfig::default()
        .compile()
        .expect("default token patterns are valid")
});

/// Compiled regexes for every token set in a [`ParserConfig`]
#[derive(Debug, Clone)]
pub struct TokenPatterns {
    /// A run of line breaks
    pub(crate) line_breaks: Option<Regex>,
    /// Leading syntax, captured expression, trailing syntax
    pub(crate) capture_expression: Regex,
    /// Any operator token
    pub(crate) operator: Regex,
    /// Operator tokens anchored at the start of a piece
    pub(crate) leading_and: Regex,
    pub(crate) leading_or: Regex,
    pub(crate) leading_xor: Regex,
    /// An operator token, optional whitespace and an opening parenthesis at
    /// the end of the text
    pub(crate) sub_expression_open: Regex,
}

fn alternation(tokens: &[String]) -> Option<String> {
    if tokens.is_empty() {
        None
    } else {
        Some(format!("(?:{})", tokens.join("|")))
    }
}

fn compile(pattern: String) -> Result<Regex> {
    Regex::new(&pattern).map_err(|source| AnalysisError::InvalidPattern { pattern, source })
}

impl TokenPatterns {
    pub(crate) fn compile(config: &ParserConfig) -> Result<Self> {
        // Check each token on its own so the error names the bad fragment
        let every_token = config
            .line_break
            .iter()
            .chain(&config.and)
            .chain(&config.or)
            .chain(&config.xor)
            .chain(&config.ignore_leading)
            .chain(&config.ignore_trailing);
        for token in every_token {
            compile(format!("(?i){}", token))?;
        }

        let line_breaks = match alternation(&config.line_break) {
            Some(alt) => Some(compile(format!("{}+", alt))?),
            None => None,
        };

        let leading = alternation(&config.ignore_leading)
            .map(|alt| format!("{}*", alt))
            .unwrap_or_default();
        let trailing = alternation(&config.ignore_trailing)
            .map(|alt| format!("{}*", alt))
            .unwrap_or_default();
        let capture_expression = compile(format!("(?is)^{}(.*?){}$", leading, trailing))?;

        let and = alternation(&config.and).unwrap_or_default();
        let or = alternation(&config.or).unwrap_or_default();
        let xor = alternation(&config.xor).unwrap_or_default();
        let any_operator = format!("(?:{}|{}|{})", and, or, xor);

        Ok(Self {
            line_breaks,
            capture_expression,
            operator: compile(format!("(?i){}", any_operator))?,
            leading_and: compile(format!("(?i)^{}", and))?,
            leading_or: compile(format!("(?i)^{}", or))?,
            leading_xor: compile(format!("(?i)^{}", xor))?,
            sub_expression_open: compile(format!(r"(?i){}\s*\($", any_operator))?,
        })
    }

    /// Whether the parenthesis closing `prefix` opens a sub-expression, i.e.
    /// is preceded only by whitespace or by an operator token
    pub(crate) fn opens_sub_expression(&self, prefix: &str) -> bool {
        let before = prefix.strip_suffix('(').unwrap_or(prefix);
        before.trim().is_empty() || self.sub_expression_open.is_match(prefix)
    }
}
