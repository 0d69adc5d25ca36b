//! Analyzer - limits, gating and truth-table construction

use crate::config::{Limits, ParserConfig};
use crate::error::{AnalysisError, Result};
use crate::expression::{row_values, Entry, ExpandedPath, Expression, ParseCache, Parser};
use serde::Serialize;
use std::sync::Arc;

/// What a heading column stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingKind {
    Condition,
    Operator,
}

/// One column of the truth table, in pre-order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub text: String,
    pub kind: HeadingKind,
    /// Nesting depth of the level the column belongs to (0 = top level)
    pub depth: usize,
}

/// Result of a strict analysis
///
/// Rows hold one `Option<bool>` per leaf condition; `None` is don't-care.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub normalized: String,
    pub expression: String,
    pub headings: Vec<Heading>,
    pub true_rows: Vec<Vec<Option<bool>>>,
    pub false_rows: Vec<Vec<Option<bool>>>,
    pub leaf_count: usize,
    #[serde(skip)]
    tree: Arc<Expression>,
}

impl Analysis {
    fn new(normalized: String, tree: Arc<Expression>) -> Self {
        let true_rows = rows(&tree.expand_true_paths());
        let false_rows = rows(&tree.expand_false_paths());

        Self {
            normalized,
            expression: tree.to_string(),
            headings: headings(&tree),
            true_rows,
            false_rows,
            leaf_count: tree.leaf_count(),
            tree,
        }
    }

    /// The parsed tree the table was built from
    pub fn tree(&self) -> &Arc<Expression> {
        &self.tree
    }

    /// Leaf condition texts, the condition columns of every row
    pub fn leaf_texts(&self) -> Vec<&str> {
        self.headings
            .iter()
            .filter(|h| h.kind == HeadingKind::Condition)
            .map(|h| h.text.as_str())
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.true_rows.len() + self.false_rows.len()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| AnalysisError::Serialization(e.to_string()))
    }
}

fn rows(paths: &[ExpandedPath<'_>]) -> Vec<Vec<Option<bool>>> {
    paths.iter().map(|path| row_values(path)).collect()
}

/// Condition and operator columns in pre-order
pub fn headings(expression: &Expression) -> Vec<Heading> {
    let mut out = Vec::with_capacity(expression.leaf_count() * 2);
    push_headings(expression, 0, &mut out);
    out
}

fn push_headings(expression: &Expression, depth: usize, out: &mut Vec<Heading>) {
    for (i, entry) in expression.conditions().iter().enumerate() {
        if i > 0 {
            if let Some(operator) = expression.operators().get(i - 1) {
                out.push(Heading {
                    text: operator.to_string(),
                    kind: HeadingKind::Operator,
                    depth,
                });
            }
        }
        match entry {
            Entry::Leaf(condition) => out.push(Heading {
                text: condition.text().to_string(),
                kind: HeadingKind::Condition,
                depth,
            }),
            Entry::Node(sub) => push_headings(sub, depth + 1, out),
        }
    }
}

/// Strict analyzer over one configuration
///
/// Parsed trees are cached by normalized text, so repeated submissions share
/// one tree.
#[derive(Debug)]
pub struct Analyzer {
    parser: Parser,
    cache: ParseCache,
}

impl Default for Analyzer {
    fn default() -> Self {
        let parser = Parser::default();
        let cache = ParseCache::new(parser.limits().max_cache_entries);
        Self { parser, cache }
    }
}

impl Analyzer {
    pub fn new(config: &ParserConfig) -> Result<Self> {
        let parser = Parser::with_config(config)?;
        let cache = ParseCache::new(config.limits.max_cache_entries);
        Ok(Self { parser, cache })
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    pub fn limits(&self) -> &Limits {
        self.parser.limits()
    }

    pub fn cache(&self) -> &ParseCache {
        &self.cache
    }

    pub fn normalize(&self, raw: &str) -> String {
        self.parser.normalize(raw)
    }

    /// Normalize, parse and expand `raw`
    ///
    /// # Errors
    /// - `InputTooLarge` when `raw` exceeds the input limit
    /// - `NestingTooDeep` / `TooManyXorOperands` from the parser limits
    /// - `EmptyExpression` when no condition is found
    /// - `MixedOperators` when any level mixes operator kinds
    /// - `TooManyRows` when the expanded table would exceed the row limit
    pub fn analyze(&self, raw: &str) -> Result<Analysis> {
        let limits = self.limits();
        if raw.len() > limits.max_input_len {
            tracing::warn!(len = raw.len(), max = limits.max_input_len, "rejecting oversized input");
            return Err(AnalysisError::InputTooLarge {
                max: limits.max_input_len,
                actual: raw.len(),
            });
        }

        let normalized = self.parser.normalize(raw);
        let tree = self
            .cache
            .get_or_try_insert(&normalized, |text| self.parser.try_parse(text))
            .inspect_err(|err| tracing::warn!(%err, "rejecting expression"))?;

        if tree.is_empty() {
            tracing::warn!(%normalized, "rejecting empty expression");
            return Err(AnalysisError::EmptyExpression);
        }
        if tree.has_mixed_operators_deep() {
            tracing::warn!(%normalized, "rejecting mixed operators");
            return Err(AnalysisError::MixedOperators);
        }

        let rows = tree
            .expanded_row_count(true)
            .zip(tree.expanded_row_count(false))
            .and_then(|(true_rows, false_rows)| true_rows.checked_add(false_rows))
            .unwrap_or(usize::MAX);
        if rows > limits.max_rows {
            tracing::warn!(rows, max = limits.max_rows, "rejecting oversized truth table");
            return Err(AnalysisError::TooManyRows {
                max: limits.max_rows,
                actual: rows,
            });
        }

        let analysis = Analysis::new(normalized, tree);
        tracing::debug!(
            expression = %analysis.expression,
            leaves = analysis.leaf_count,
            true_rows = analysis.true_rows.len(),
            false_rows = analysis.false_rows.len(),
            "analyzed expression"
        );
        Ok(analysis)
    }
}
