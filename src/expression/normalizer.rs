//! Submission normalizer
//!
//! Reduces raw source text such as `} else if (a || b) {` spread over several
//! lines to the single-line expression substance.

use crate::config::{TokenPatterns, DEFAULT_PATTERNS};

/// Normalize with the default token sets
pub fn normalize(raw: &str) -> String {
    normalize_with(raw, &DEFAULT_PATTERNS)
}

/// Collapse line breaks to single spaces, then keep only the text between
/// the leading and trailing ignorable syntax
///
/// Only one expression is extracted; text holding several statements is not
/// split.
pub fn normalize_with(raw: &str, patterns: &TokenPatterns) -> String {
    let collapsed = match &patterns.line_breaks {
        Some(line_breaks) => line_breaks.replace_all(raw, " "),
        None => raw.into(),
    };

    let expression = patterns
        .capture_expression
        .captures(&collapsed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(&collapsed)
        .to_string();

    tracing::debug!(%expression, "normalized submission");
    expression
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_if_and_braces() {
        assert_eq!(normalize("if( A || B ) {"), "( A || B )");
        assert_eq!(normalize("} else if (a && b) {"), "(a && b)");
        assert_eq!(normalize("}elseif(a){"), "(a)");
        assert_eq!(normalize("return a || b;"), "return a || b");
    }

    #[test]
    fn test_collapses_line_breaks() {
        assert_eq!(normalize("if (a ||\r\n    b) {\n"), "(a ||     b)");
        assert_eq!(normalize("a\n\n&& b"), "a && b");
    }

    #[test]
    fn test_keeps_identifiers_starting_with_keywords() {
        assert_eq!(normalize("iffy || elsewhere"), "iffy || elsewhere");
    }

    #[test]
    fn test_case_insensitive_keywords() {
        assert_eq!(normalize("IF (a) {"), "(a)");
    }

    #[test]
    fn test_empty_and_syntax_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  if { ; "), "");
    }
}
