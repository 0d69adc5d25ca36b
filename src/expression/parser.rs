//! Expression parser
//!
//! Recursively partitions normalized text into sub-expressions (real
//! top-level parenthesis pairs found by the scanner) and raw chunks, splits
//! the raw chunks on operator tokens and builds the [`Expression`] tree.
//! Parsing is total: malformed text degrades to a best-effort tree.

use crate::config::{Limits, ParserConfig, TokenPatterns, DEFAULT_PATTERNS};
use crate::error::{AnalysisError, Result};
use crate::expression::ast::{has_mixed_operators, Condition, Entry, Expression};
use crate::expression::normalizer::normalize_with;
use crate::expression::operator::Operator;
use crate::expression::scanner::{
    find_top_level_parenthesis_with, matching_close, remove_literals_with,
};

/// Parse with the default token sets
pub fn parse(text: &str) -> Expression {
    Parser::default().parse(text)
}

/// Strip surrounding whitespace and matched outer parenthesis pairs until
/// nothing changes
pub fn trim_parenthesis_pairs(text: &str) -> &str {
    let mut current = text.trim();
    while current.starts_with('(') && matching_close(current, 0) == Some(current.len() - 1) {
        current = current[1..current.len() - 1].trim();
    }
    current
}

/// A piece of the text at one level: raw text or an already parsed
/// sub-expression
enum Chunk<'t> {
    Text(&'t str),
    Node(Expression),
}

/// Expression parser over a compiled token set
#[derive(Debug, Clone)]
pub struct Parser {
    patterns: TokenPatterns,
    limits: Limits,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.clone(),
            limits: Limits::default(),
        }
    }
}

impl Parser {
    /// Build a parser from a configuration, compiling its token sets
    pub fn with_config(config: &ParserConfig) -> Result<Self> {
        Ok(Self {
            patterns: config.compile()?,
            limits: config.limits,
        })
    }

    pub fn patterns(&self) -> &TokenPatterns {
        &self.patterns
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn normalize(&self, raw: &str) -> String {
        normalize_with(raw, &self.patterns)
    }

    /// Parse without limits; never fails
    pub fn parse(&self, text: &str) -> Expression {
        self.build(text, 0, &Limits::unbounded())
            .unwrap_or_else(|_| Expression::empty())
    }

    /// Parse, rejecting nesting deeper than the configured depth and XOR
    /// groups with more operands than the configured maximum
    pub fn try_parse(&self, text: &str) -> Result<Expression> {
        self.build(text, 0, &self.limits)
    }

    fn build(&self, text: &str, depth: usize, limits: &Limits) -> Result<Expression> {
        let text = trim_parenthesis_pairs(text);
        let pairs = find_top_level_parenthesis_with(text, &self.patterns);

        let mut chunks = Vec::with_capacity(pairs.len() * 2 + 1);
        let mut last = 0;
        for pair in &pairs {
            if depth + 1 > limits.max_nesting_depth {
                return Err(AnalysisError::NestingTooDeep {
                    max: limits.max_nesting_depth,
                    actual: depth + 1,
                });
            }
            chunks.push(Chunk::Text(&text[last..pair.start]));
            chunks.push(Chunk::Node(self.build(
                &text[pair.start..=pair.end],
                depth + 1,
                limits,
            )?));
            last = pair.end + 1;
        }
        if last < text.len() {
            chunks.push(Chunk::Text(&text[last..]));
        }

        let mut operators = Vec::new();
        let mut conditions = Vec::new();
        for chunk in chunks {
            match chunk {
                Chunk::Node(expression) => conditions.push(Entry::Node(expression)),
                Chunk::Text(raw) => self.split_conditions(raw, &mut operators, &mut conditions),
            }
        }

        if !has_mixed_operators(&operators)
            && operators.first() == Some(&Operator::Xor)
            && conditions.len() > limits.max_xor_operands
        {
            return Err(AnalysisError::TooManyXorOperands {
                max: limits.max_xor_operands,
                actual: conditions.len(),
            });
        }

        let expression = Expression::new(operators, conditions);
        tracing::trace!(
            depth,
            conditions = expression.conditions().len(),
            operators = expression.operators().len(),
            mixed = expression.has_mixed_operators(),
            "built expression level"
        );
        Ok(expression)
    }

    /// Split a raw chunk before every operator token, recording the operator
    /// that leads each piece and keeping the non-empty remainder as a leaf
    fn split_conditions(&self, raw: &str, operators: &mut Vec<Operator>, conditions: &mut Vec<Entry>) {
        let masked = remove_literals_with(raw, &self.patterns);
        let text = masked.text.as_str();

        let mut bounds: Vec<usize> = self
            .patterns
            .operator
            .find_iter(text)
            .map(|m| m.start())
            .filter(|&start| start > 0)
            .collect();
        bounds.insert(0, 0);
        bounds.push(text.len());

        for window in bounds.windows(2) {
            let mut piece = &text[window[0]..window[1]];

            if let Some((operator, len)) = self.leading_operator(piece) {
                operators.push(operator);
                piece = &piece[len..];
            }

            if let Some(condition) = Condition::new(&masked.restore(piece)) {
                conditions.push(Entry::Leaf(condition));
            }
        }
    }

    fn leading_operator(&self, piece: &str) -> Option<(Operator, usize)> {
        [
            (&self.patterns.leading_and, Operator::And),
            (&self.patterns.leading_or, Operator::Or),
            (&self.patterns.leading_xor, Operator::Xor),
        ]
        .into_iter()
        .find_map(|(pattern, operator)| pattern.find(piece).map(|m| (operator, m.end())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ast::EntryKind;
    use crate::expression::normalizer::normalize;

    fn texts(expr: &Expression) -> Vec<String> {
        expr.conditions().iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_trim_parenthesis_pairs() {
        assert_eq!(trim_parenthesis_pairs("  ((a || b))  "), "a || b");
        assert_eq!(trim_parenthesis_pairs("( ( a ) )"), "a");
        assert_eq!(trim_parenthesis_pairs("(a) || (b)"), "(a) || (b)");
        assert_eq!(trim_parenthesis_pairs("(f(x))"), "f(x)");
        assert_eq!(trim_parenthesis_pairs("()"), "");
        assert_eq!(trim_parenthesis_pairs("(a"), "(a");
    }

    #[test]
    fn test_parse_or() {
        let expr = parse("a || b");
        assert_eq!(texts(&expr), vec!["a", "b"]);
        assert_eq!(expr.operators(), &[Operator::Or]);
        assert!(!expr.has_mixed_operators());
    }

    #[test]
    fn test_parse_word_operators() {
        let expr = parse("a AND b and c");
        assert_eq!(texts(&expr), vec!["a", "b", "c"]);
        assert_eq!(expr.operators(), &[Operator::And, Operator::And]);

        let expr = parse("a OR b");
        assert_eq!(expr.operators(), &[Operator::Or]);

        let expr = parse("a XOR b ^ c");
        assert_eq!(expr.operators(), &[Operator::Xor, Operator::Xor]);
    }

    #[test]
    fn test_parse_without_spaces() {
        let expr = parse("a&&b&&c");
        assert_eq!(texts(&expr), vec!["a", "b", "c"]);
        assert_eq!(expr.operators().len(), 2);
    }

    #[test]
    fn test_parse_nested() {
        let expr = parse(&normalize("if (a || (b && c) )"));
        assert_eq!(expr.conditions().len(), 2);
        assert_eq!(expr.conditions()[0].kind(), EntryKind::Condition);
        assert_eq!(expr.conditions()[1].kind(), EntryKind::SubExpression);
        assert_eq!(expr.operators(), &[Operator::Or]);

        let inner = expr.conditions()[1].as_expression().unwrap();
        assert_eq!(texts(inner), vec!["b", "c"]);
        assert_eq!(inner.operators(), &[Operator::And]);
    }

    #[test]
    fn test_parse_function_calls_and_literals() {
        let expr = parse(
            r#"A || ( B && C("true && false") && ( D(this.isOpen() && this.isFree) || E ))"#,
        );
        assert_eq!(expr.operators(), &[Operator::Or]);
        assert_eq!(expr.conditions()[0].to_string(), "A");

        let inner = expr.conditions()[1].as_expression().unwrap();
        assert_eq!(inner.operators(), &[Operator::And, Operator::And]);
        assert_eq!(
            inner.conditions()[1].as_condition().unwrap().text(),
            r#"C("true && false")"#
        );

        let innermost = inner.conditions()[2].as_expression().unwrap();
        assert_eq!(texts(innermost), vec!["D(this.isOpen() && this.isFree)", "E"]);
        assert_eq!(innermost.operators(), &[Operator::Or]);
        assert!(!expr.has_mixed_operators_deep());
    }

    #[test]
    fn test_parse_quoted_operator_text() {
        let expr = parse(r#"PayPalAccountType != "CannotValidate || x" && b"#);
        assert_eq!(
            texts(&expr),
            vec![r#"PayPalAccountType != "CannotValidate || x""#, "b"]
        );
    }

    #[test]
    fn test_if_prefix_without_normalizing_is_a_call() {
        // `if (` is not preceded by an operator, so it reads as a call
        let expr = parse("if (a || b)");
        assert_eq!(texts(&expr), vec!["if (a || b)"]);
    }

    #[test]
    fn test_parse_mixed_operators() {
        let expr = parse("a && b || c");
        assert!(expr.has_mixed_operators());
        assert!(expr.true_paths().is_empty());
        assert!(expr.false_paths().is_empty());
    }

    #[test]
    fn test_parse_single_condition() {
        let expr = parse("(isValid())");
        assert_eq!(texts(&expr), vec!["isValid()"]);
        assert!(expr.operators().is_empty());
        assert_eq!(expr.true_paths().len(), 1);
        assert_eq!(expr.false_paths().len(), 1);
    }

    #[test]
    fn test_parse_empty() {
        for text in ["", "   ", "()", "&&"] {
            let expr = parse(text);
            assert!(expr.is_empty(), "expected no conditions for {:?}", text);
            assert!(expr.true_paths().is_empty());
        }
    }

    #[test]
    fn test_parse_unbalanced_quote() {
        let expr = parse(r#"a || "b && c"#);
        assert_eq!(texts(&expr), vec!["a", r#""b && c"#]);
    }

    #[test]
    fn test_parse_trailing_single_character() {
        let expr = parse("(a || b) && c");
        assert_eq!(expr.conditions().len(), 2);
        assert_eq!(expr.conditions()[1].to_string(), "c");
    }

    #[test]
    fn test_try_parse_nesting_limit() {
        let config = ParserConfig {
            limits: Limits {
                max_nesting_depth: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let parser = Parser::with_config(&config).unwrap();
        assert!(parser.try_parse("a || (b && c)").is_ok());
        assert!(matches!(
            parser.try_parse("a || (b && (c || d))"),
            Err(AnalysisError::NestingTooDeep { max: 1, actual: 2 })
        ));
        // Unbounded parse still succeeds
        assert_eq!(parser.parse("a || (b && (c || d))").leaf_count(), 4);
    }

    #[test]
    fn test_try_parse_xor_limit() {
        let config = ParserConfig {
            limits: Limits {
                max_xor_operands: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        let parser = Parser::with_config(&config).unwrap();
        assert!(parser.try_parse("a ^ b ^ c").is_ok());
        assert!(matches!(
            parser.try_parse("a ^ b ^ c ^ d"),
            Err(AnalysisError::TooManyXorOperands { max: 3, actual: 4 })
        ));
    }

    #[test]
    fn test_custom_tokens() {
        let config = ParserConfig {
            and: vec![r"&&".into(), r"\sAND\s".into(), r"\s&\s".into()],
            ..Default::default()
        };
        let parser = Parser::with_config(&config).unwrap();
        let expr = parser.parse("a & b");
        assert_eq!(texts(&expr), vec!["a", "b"]);
        assert_eq!(expr.operators(), &[Operator::And]);
    }
}
