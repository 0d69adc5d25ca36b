//! Expression tree: atomic conditions and nested sub-expressions

use crate::expression::operator::Operator;
use crate::expression::paths::{self, EvalPath};
use serde::Serialize;
use std::fmt;

/// Opaque atomic test, e.g. `PayPalAccountType != "CannotValidate"`
///
/// Conditions are never deduplicated: two leaves with the same text are two
/// entries, and evaluation paths refer to them by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Condition {
    text: String,
}

impl Condition {
    /// Trim `text`; `None` when nothing is left
    pub fn new(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(Self {
                text: text.to_string(),
            })
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Type tag of an [`Entry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    Condition,
    SubExpression,
}

/// One operand of an [`Expression`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Entry {
    Leaf(Condition),
    Node(Expression),
}

impl Entry {
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Leaf(_) => EntryKind::Condition,
            Entry::Node(_) => EntryKind::SubExpression,
        }
    }

    pub fn as_condition(&self) -> Option<&Condition> {
        match self {
            Entry::Leaf(condition) => Some(condition),
            Entry::Node(_) => None,
        }
    }

    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            Entry::Leaf(_) => None,
            Entry::Node(expression) => Some(expression),
        }
    }

    /// Number of leaf conditions at or below this entry
    pub fn leaf_count(&self) -> usize {
        match self {
            Entry::Leaf(_) => 1,
            Entry::Node(expression) => expression.leaf_count(),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Leaf(condition) => write!(f, "{}", condition),
            Entry::Node(expression) => write!(f, "({})", expression),
        }
    }
}

/// A level of the expression tree
///
/// `operators[i]` joins `conditions[i]` and `conditions[i + 1]`. Paths are
/// derived once at construction and are empty when the operators are mixed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Expression {
    operators: Vec<Operator>,
    conditions: Vec<Entry>,
    has_mixed_operators: bool,
    true_paths: Vec<EvalPath>,
    false_paths: Vec<EvalPath>,
}

impl Expression {
    pub fn new(operators: Vec<Operator>, conditions: Vec<Entry>) -> Self {
        let has_mixed_operators = has_mixed_operators(&operators);
        let (true_paths, false_paths) = if has_mixed_operators {
            (Vec::new(), Vec::new())
        } else {
            paths::paths_for_both(&operators, conditions.len())
        };

        Self {
            operators,
            conditions,
            has_mixed_operators,
            true_paths,
            false_paths,
        }
    }

    /// An expression with no conditions and no paths
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn conditions(&self) -> &[Entry] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The operator shared by every position, when there is one
    pub fn operator(&self) -> Option<Operator> {
        if self.has_mixed_operators {
            None
        } else {
            self.operators.first().copied()
        }
    }

    /// Whether this level alone mixes operator kinds
    pub fn has_mixed_operators(&self) -> bool {
        self.has_mixed_operators
    }

    /// Whether this level or any nested level mixes operator kinds
    pub fn has_mixed_operators_deep(&self) -> bool {
        self.has_mixed_operators
            || self
                .conditions
                .iter()
                .filter_map(Entry::as_expression)
                .any(Expression::has_mixed_operators_deep)
    }

    pub fn true_paths(&self) -> &[EvalPath] {
        &self.true_paths
    }

    pub fn false_paths(&self) -> &[EvalPath] {
        &self.false_paths
    }

    /// Paths for the requested outcome
    pub fn paths(&self, outcome: bool) -> &[EvalPath] {
        if outcome {
            &self.true_paths
        } else {
            &self.false_paths
        }
    }

    /// Leaf conditions in pre-order
    pub fn leaves(&self) -> Vec<&Condition> {
        let mut leaves = Vec::with_capacity(self.conditions.len());
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        for entry in &self.conditions {
            match entry {
                Entry::Leaf(condition) => out.push(condition),
                Entry::Node(expression) => expression.collect_leaves(out),
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.conditions.iter().map(Entry::leaf_count).sum()
    }

    /// Deepest sub-expression nesting below this level
    pub fn depth(&self) -> usize {
        self.conditions
            .iter()
            .filter_map(Entry::as_expression)
            .map(|e| e.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.conditions.iter().enumerate() {
            if i > 0 {
                match self.operators.get(i - 1) {
                    Some(op) => write!(f, " {} ", op)?,
                    None => f.write_str(" ")?,
                }
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

/// True iff more than one operator exists and two adjacent ones differ
pub fn has_mixed_operators(operators: &[Operator]) -> bool {
    operators.len() > 1 && operators.windows(2).any(|pair| pair[0] != pair[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(text: &str) -> Entry {
        Entry::Leaf(Condition::new(text).unwrap())
    }

    #[test]
    fn test_condition_trims_and_rejects_empty() {
        assert_eq!(Condition::new("  a == 1 ").unwrap().text(), "a == 1");
        assert!(Condition::new("   ").is_none());
    }

    #[test]
    fn test_mixed_operator_detection() {
        assert!(!has_mixed_operators(&[]));
        assert!(!has_mixed_operators(&[Operator::And]));
        assert!(!has_mixed_operators(&[Operator::Or, Operator::Or]));
        assert!(has_mixed_operators(&[Operator::And, Operator::Or]));
        assert!(has_mixed_operators(&[Operator::Xor, Operator::Xor, Operator::And]));
    }

    #[test]
    fn test_mixed_expression_has_no_paths() {
        let expr = Expression::new(
            vec![Operator::And, Operator::Or],
            vec![leaf("a"), leaf("b"), leaf("c")],
        );
        assert!(expr.has_mixed_operators());
        assert!(expr.true_paths().is_empty());
        assert!(expr.false_paths().is_empty());
        assert_eq!(expr.operator(), None);
    }

    #[test]
    fn test_deep_mixed_detection() {
        let inner = Expression::new(vec![Operator::And, Operator::Or], vec![leaf("b"), leaf("c"), leaf("d")]);
        let outer = Expression::new(vec![Operator::Or], vec![leaf("a"), Entry::Node(inner)]);
        assert!(!outer.has_mixed_operators());
        assert!(outer.has_mixed_operators_deep());
        assert!(!outer.true_paths().is_empty());
    }

    #[test]
    fn test_leaves_and_display() {
        let inner = Expression::new(vec![Operator::And], vec![leaf("b"), leaf("c")]);
        let outer = Expression::new(vec![Operator::Or], vec![leaf("a"), Entry::Node(inner)]);

        let leaves: Vec<&str> = outer.leaves().iter().map(|c| c.text()).collect();
        assert_eq!(leaves, vec!["a", "b", "c"]);
        assert_eq!(outer.leaf_count(), 3);
        assert_eq!(outer.depth(), 1);
        assert_eq!(outer.to_string(), "a OR (b AND c)");
        assert_eq!(outer.conditions()[1].kind(), EntryKind::SubExpression);
    }

    #[test]
    fn test_empty_expression() {
        let expr = Expression::empty();
        assert!(expr.is_empty());
        assert!(expr.true_paths().is_empty());
        assert!(expr.false_paths().is_empty());
        assert_eq!(expr.leaf_count(), 0);
        assert_eq!(expr.to_string(), "");
    }
}
