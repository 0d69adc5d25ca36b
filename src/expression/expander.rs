//! Path expansion
//!
//! Replaces every sub-expression entry of an evaluation path by the leaf
//! conditions beneath it, producing rows at leaf granularity. A sub-expression
//! that must be true (or false) contributes one row per matching expanded
//! sub-path (cross product); a don't-care sub-expression contributes its
//! leaves once, all don't-care.

use crate::expression::ast::{Condition, Entry, Expression};
use crate::expression::paths::EvalPath;
use crate::expression::tristate::TriState;
use ahash::AHashMap;
use serde::Serialize;
use std::rc::Rc;

/// A leaf condition and its result on an expanded path
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeafResult<'a> {
    pub condition: &'a Condition,
    pub result: TriState,
}

/// One row per leaf condition, in pre-order
pub type ExpandedPath<'a> = Vec<LeafResult<'a>>;

/// Entry of a path while expansion is in progress
#[derive(Clone, Copy)]
enum Slot<'a> {
    Leaf(LeafResult<'a>),
    Pending(TriState),
}

impl<'a> Slot<'a> {
    fn new(entry: &'a Entry, result: TriState) -> Self {
        match entry {
            Entry::Leaf(condition) => Slot::Leaf(LeafResult { condition, result }),
            Entry::Node(_) => Slot::Pending(result),
        }
    }
}

/// Expand `paths` of `node` to leaf granularity
///
/// Positions are processed from last to first so splicing never moves a
/// position still to be processed. Paths whose length does not match
/// `node.conditions()` are skipped.
pub fn expand<'a>(paths: &[EvalPath], node: &'a Expression) -> Vec<ExpandedPath<'a>> {
    let expanded = Expander::default().expand_paths(paths, node);
    tracing::debug!(paths = paths.len(), rows = expanded.len(), "expanded paths");
    expanded
}

/// Number of rows `expand(paths, node)` produces, without building them
///
/// Returns `None` when the count overflows `usize`.
pub fn expanded_row_count(paths: &[EvalPath], node: &Expression) -> Option<usize> {
    RowCounter::default().count_paths(paths, node)
}

/// Identity of a sub-expression and the outcome it is expanded for
type NodeKey = (usize, bool);

fn node_key(node: &Expression, outcome: bool) -> NodeKey {
    (node as *const Expression as usize, outcome)
}

fn aligned(path: &EvalPath, width: usize) -> bool {
    let aligned = path.len() == width;
    if !aligned {
        tracing::warn!(expected = width, actual = path.len(), "skipping misaligned path");
    }
    aligned
}

/// Expansion state shared across one tree
///
/// Every sub-expression is expanded at most once per outcome, and only when
/// some row requires that outcome.
#[derive(Default)]
struct Expander<'a> {
    expanded: AHashMap<NodeKey, Rc<[ExpandedPath<'a>]>>,
}

impl<'a> Expander<'a> {
    fn expand_node(&mut self, node: &'a Expression, outcome: bool) -> Rc<[ExpandedPath<'a>]> {
        let key = node_key(node, outcome);
        if let Some(rows) = self.expanded.get(&key) {
            return Rc::clone(rows);
        }
        let rows: Rc<[ExpandedPath<'a>]> = self.expand_paths(node.paths(outcome), node).into();
        self.expanded.insert(key, Rc::clone(&rows));
        rows
    }

    fn expand_paths(
        &mut self,
        paths: &[EvalPath],
        node: &'a Expression,
    ) -> Vec<ExpandedPath<'a>> {
        let width = node.conditions().len();
        let mut rows: Vec<Vec<Slot<'a>>> = paths
            .iter()
            .filter(|path| aligned(path, width))
            .map(|path| {
                node.conditions()
                    .iter()
                    .zip(path.results())
                    .map(|(entry, &result)| Slot::new(entry, result))
                    .collect()
            })
            .collect();

        for (i, entry) in node.conditions().iter().enumerate().rev() {
            let sub = match entry {
                Entry::Node(sub) => sub,
                Entry::Leaf(_) => continue,
            };

            let mut unconstrained: Option<Vec<Slot<'a>>> = None;
            let mut next = Vec::with_capacity(rows.len());
            for row in rows {
                let slot = row[i];
                let result = match slot {
                    Slot::Pending(result) => result,
                    Slot::Leaf(_) => {
                        next.push(row);
                        continue;
                    }
                };
                match result.as_option() {
                    None => {
                        let fill = unconstrained.get_or_insert_with(|| dont_care_leaves(sub));
                        next.push(splice(&row, i, fill.iter().copied()));
                    }
                    Some(outcome) => {
                        for sub_row in self.expand_node(sub, outcome).iter() {
                            next.push(splice(&row, i, sub_row.iter().copied().map(Slot::Leaf)));
                        }
                    }
                }
            }
            rows = next;
        }

        rows.into_iter()
            .map(|row| {
                row.into_iter()
                    .filter_map(|slot| match slot {
                        Slot::Leaf(leaf) => Some(leaf),
                        Slot::Pending(_) => None,
                    })
                    .collect()
            })
            .collect()
    }
}

/// `row` with position `i` replaced by `with`
fn splice<'a>(
    row: &[Slot<'a>],
    i: usize,
    with: impl IntoIterator<Item = Slot<'a>>,
) -> Vec<Slot<'a>> {
    let mut spliced = Vec::with_capacity(row.len());
    spliced.extend_from_slice(&row[..i]);
    spliced.extend(with);
    spliced.extend_from_slice(&row[i + 1..]);
    spliced
}

fn dont_care_leaves(sub: &Expression) -> Vec<Slot<'_>> {
    sub.leaves()
        .into_iter()
        .map(|condition| {
            Slot::Leaf(LeafResult {
                condition,
                result: TriState::DontCare,
            })
        })
        .collect()
}

/// Row counts memoized per sub-expression and outcome
#[derive(Default)]
struct RowCounter {
    counts: AHashMap<NodeKey, Option<usize>>,
}

impl RowCounter {
    fn count_node(&mut self, node: &Expression, outcome: bool) -> Option<usize> {
        let key = node_key(node, outcome);
        if let Some(&count) = self.counts.get(&key) {
            return count;
        }
        let count = self.count_paths(node.paths(outcome), node);
        self.counts.insert(key, count);
        count
    }

    fn count_paths(&mut self, paths: &[EvalPath], node: &Expression) -> Option<usize> {
        let width = node.conditions().len();
        let mut total: usize = 0;
        for path in paths.iter().filter(|path| aligned(path, width)) {
            let mut product: usize = 1;
            for (entry, result) in node.conditions().iter().zip(path.results()) {
                if let (Entry::Node(sub), Some(outcome)) = (entry, result.as_option()) {
                    product = product.checked_mul(self.count_node(sub, outcome)?)?;
                }
            }
            total = total.checked_add(product)?;
        }
        Some(total)
    }
}

impl Expression {
    /// Expanded true-paths of this expression
    pub fn expand_true_paths(&self) -> Vec<ExpandedPath<'_>> {
        expand(self.true_paths(), self)
    }

    /// Expanded false-paths of this expression
    pub fn expand_false_paths(&self) -> Vec<ExpandedPath<'_>> {
        expand(self.false_paths(), self)
    }

    /// Number of expanded rows for `outcome`, `None` on overflow
    pub fn expanded_row_count(&self, outcome: bool) -> Option<usize> {
        expanded_row_count(self.paths(outcome), self)
    }
}

/// Results of an expanded path as `Option<bool>` per leaf
pub fn row_values(path: &[LeafResult<'_>]) -> Vec<Option<bool>> {
    path.iter().map(|leaf| leaf.result.as_option()).collect()
}
