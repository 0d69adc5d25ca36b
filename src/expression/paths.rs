//! Evaluation path generation
//!
//! An evaluation path assigns a [`TriState`] to every entry of one
//! expression level, positionally: entry `i` of the path describes
//! `conditions()[i]` of the owning [`Expression`].

use crate::expression::ast::{Entry, Expression};
use crate::expression::operator::Operator;
use crate::expression::tristate::TriState;
use serde::Serialize;
use smallvec::SmallVec;
use std::ops::Index;

/// Per-entry results for one level of the tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EvalPath {
    results: SmallVec<[TriState; 8]>,
}

/// An entry of the owning expression paired with its result on a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathEntry<'a> {
    pub condition: &'a Entry,
    pub result: TriState,
}

impl EvalPath {
    pub fn new(results: impl IntoIterator<Item = TriState>) -> Self {
        Self {
            results: results.into_iter().collect(),
        }
    }

    /// Every entry set to `result`
    pub fn uniform(len: usize, result: TriState) -> Self {
        Self {
            results: SmallVec::from_elem(result, len),
        }
    }

    /// Entry `index` set to `result`, every other entry don't-care
    pub fn single(len: usize, index: usize, result: TriState) -> Self {
        let mut path = Self::uniform(len, TriState::DontCare);
        path.results[index] = result;
        path
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[TriState] {
        &self.results
    }

    pub fn get(&self, index: usize) -> Option<TriState> {
        self.results.get(index).copied()
    }

    /// Pair each result with the entry it describes in `owner`
    ///
    /// The yielded entries borrow from `owner` only, so they outlive the path.
    pub fn entries<'s, 'a: 's>(
        &'s self,
        owner: &'a Expression,
    ) -> impl Iterator<Item = PathEntry<'a>> + 's {
        owner
            .conditions()
            .iter()
            .zip(self.results.iter())
            .map(|(condition, &result)| PathEntry { condition, result })
    }

    fn count_true(&self) -> usize {
        self.results.iter().filter(|r| r.is_true()).count()
    }
}

impl Index<usize> for EvalPath {
    type Output = TriState;

    fn index(&self, index: usize) -> &TriState {
        &self.results[index]
    }
}

/// Paths of `node` producing `outcome`; empty when its operators are mixed
pub fn generate_paths(node: &Expression, outcome: bool) -> Vec<EvalPath> {
    if node.has_mixed_operators() {
        return Vec::new();
    }
    paths_for(node.operators(), node.conditions().len(), outcome)
}

/// Paths for `len` entries joined by a uniform operator list
pub(crate) fn paths_for(operators: &[Operator], len: usize, outcome: bool) -> Vec<EvalPath> {
    if len == 0 {
        return Vec::new();
    }
    if len == 1 {
        return vec![EvalPath::uniform(1, outcome.into())];
    }

    let operator = match operators.first() {
        Some(&op) => op,
        None => return Vec::new(),
    };

    match (operator, outcome) {
        // Every factor must hold
        (Operator::And, true) => vec![EvalPath::uniform(len, TriState::True)],
        // One failing factor is enough
        (Operator::And, false) => individual_paths(len, TriState::False),
        (Operator::Or, true) => individual_paths(len, TriState::True),
        (Operator::Or, false) => vec![EvalPath::uniform(len, TriState::False)],
        (Operator::Xor, outcome) => all_assignments(len)
            .into_iter()
            .filter(|path| odd_parity(path) == outcome)
            .collect(),
    }
}

/// True-paths and false-paths together
///
/// XOR splits a single enumeration of the assignment space by parity.
pub(crate) fn paths_for_both(
    operators: &[Operator],
    len: usize,
) -> (Vec<EvalPath>, Vec<EvalPath>) {
    match operators.first() {
        Some(Operator::Xor) if len > 1 => all_assignments(len).into_iter().partition(odd_parity),
        _ => (
            paths_for(operators, len, true),
            paths_for(operators, len, false),
        ),
    }
}

/// Odd number of true operands
fn odd_parity(path: &EvalPath) -> bool {
    path.count_true() % 2 == 1
}

fn individual_paths(len: usize, result: TriState) -> Vec<EvalPath> {
    (0..len).map(|i| EvalPath::single(len, i, result)).collect()
}

/// Every true/false assignment of `len` entries; entry 0 varies slowest and
/// true comes before false
pub fn all_assignments(len: usize) -> Vec<EvalPath> {
    let count = match u32::try_from(len).ok().and_then(|n| 1usize.checked_shl(n)) {
        Some(count) => count,
        None => {
            tracing::warn!(operands = len, "assignment space too large to enumerate");
            return Vec::new();
        }
    };

    (0..count)
        .map(|k| EvalPath::new((0..len).map(|i| TriState::from((k >> (len - 1 - i)) & 1 == 0))))
        .collect()
}
