//! Distance tables over generalized-node windows.
//!
//! For every analyzed node, all valid pairs of equal-width, adjacent sibling
//! windows over its children are scored with the similarity metric and
//! recorded in a [`DistanceTable`]. Windows of width `w` are compared in a
//! chain per starting phase: once a pair is scored, its right window becomes
//! the left window of the next comparison, so the table holds the adjacent
//! pairs the region scan later walks — not all O(n²) combinations.

use crate::trace;
use core::fmt;
use std::collections::BTreeMap;

use indextree::NodeId;
use rapidhash::RapidHashMap;

use crate::index::NodeIndex;
use crate::similarity::Similarity;
use crate::tree::MineTree;
use crate::{MineError, MiningConfig};

/// A generalized node: a contiguous half-open range `start..end` of sibling
/// indices under `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GNode {
    /// Parent node owning the sibling list.
    pub parent: NodeId,
    /// First covered sibling index.
    pub start: usize,
    /// One past the last covered sibling index.
    pub end: usize,
}

impl GNode {
    /// Create a generalized node. `end` must be greater than `start`.
    pub fn new(parent: NodeId, start: usize, end: usize) -> Self {
        debug_assert!(end > start, "generalized node must cover at least one sibling");
        Self { parent, start, end }
    }

    /// Number of siblings covered.
    pub fn size(&self) -> usize {
        self.end - self.start
    }

    /// Resolve to the concrete node ids this window covers.
    ///
    /// Fails with [`MineError::ChildOutOfBounds`] if the range runs past the
    /// parent's children, which means the window and tree don't belong to the
    /// same run.
    pub fn nodes<T: MineTree>(&self, tree: &T) -> Result<Vec<NodeId>, MineError> {
        (self.start..self.end)
            .map(|i| {
                tree.child(self.parent, i)
                    .ok_or(MineError::ChildOutOfBounds {
                        parent: usize::from(self.parent),
                        index: i,
                    })
            })
            .collect()
    }
}

impl fmt::Display for GNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GN({}, {})", self.start, self.end)
    }
}

/// An ordered pair of equal-size, adjacent generalized nodes under the same
/// parent, the unit a similarity score is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GNodePair {
    /// The earlier window.
    pub left: GNode,
    /// The later window, starting where `left` ends.
    pub right: GNode,
}

impl GNodePair {
    /// Pair two adjacent windows.
    pub fn new(left: GNode, right: GNode) -> Self {
        debug_assert_eq!(left.end, right.start, "windows must be adjacent");
        Self { left, right }
    }
}

impl fmt::Display for GNodePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.left, self.right)
    }
}

/// Scores for one parent's children, keyed by window size and the left
/// window's starting index.
///
/// Because scored pairs are chained and equal-width, `(size, left_start)`
/// determines the pair completely: the right window is
/// `left_start + size .. left_start + 2 * size`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceTable {
    by_size: BTreeMap<usize, RapidHashMap<usize, f64>>,
}

impl DistanceTable {
    pub(crate) fn insert(&mut self, size: usize, left_start: usize, score: f64) {
        self.by_size.entry(size).or_default().insert(left_start, score);
    }

    /// The score recorded for the pair of `size`-wide windows whose left
    /// window starts at `left_start`.
    pub fn score(&self, size: usize, left_start: usize) -> Option<f64> {
        self.by_size.get(&size)?.get(&left_start).copied()
    }

    /// All scores recorded for windows of `size`, keyed by left start.
    /// `None` when no pair of that size was ever comparable.
    pub fn size_entries(&self, size: usize) -> Option<&RapidHashMap<usize, f64>> {
        self.by_size.get(&size)
    }

    /// Window sizes with at least one recorded pair, ascending.
    pub fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.by_size.keys().copied()
    }

    /// Whether no pair was recorded at any size.
    pub fn is_empty(&self) -> bool {
        self.by_size.is_empty()
    }
}

/// Per-node distance tables for a whole run.
///
/// A node gated out by the minimum depth is present with `None` — "not
/// analyzed" stays distinct from "analyzed, zero pairs".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceMap {
    tables: RapidHashMap<NodeId, Option<DistanceTable>>,
}

impl DistanceMap {
    pub(crate) fn insert(&mut self, id: NodeId, table: Option<DistanceTable>) {
        self.tables.insert(id, table);
    }

    /// The table computed for a node, if the node was analyzed.
    pub fn table(&self, id: NodeId) -> Option<&DistanceTable> {
        self.tables.get(&id).and_then(|t| t.as_ref())
    }

    /// Whether a node was analyzed (depth at or above the gate), regardless
    /// of how many pairs its table holds.
    pub fn is_analyzed(&self, id: NodeId) -> bool {
        matches!(self.tables.get(&id), Some(Some(_)))
    }

    /// Number of visited nodes.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no node was visited.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Phase 1: walk the tree pre-order and score every comparable window pair
/// among each analyzed node's children.
///
/// Nodes shallower than `config.minimum_depth` get no table but are still
/// descended into; every visited node is named in `index` in visit order.
pub fn compute_distances<T, S>(
    tree: &T,
    metric: &S,
    config: &MiningConfig,
    index: &mut NodeIndex,
) -> DistanceMap
where
    T: MineTree,
    S: Similarity,
{
    let mut map = DistanceMap::default();
    let mut stack = vec![(tree.root(), 0usize)];

    while let Some((id, depth)) = stack.pop() {
        index.identify(id, tree.tag(id));

        let children: Vec<NodeId> = tree.children(id).collect();
        let table = if depth >= config.minimum_depth {
            Some(compare_combinations(
                tree,
                id,
                children.len(),
                metric,
                config.max_window,
            ))
        } else {
            None
        };
        map.insert(id, table);

        // Reversed push keeps the visit (and naming) order left-to-right.
        for &child in children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    map
}

fn compare_combinations<T, S>(
    tree: &T,
    parent: NodeId,
    n_children: usize,
    metric: &S,
    max_window: usize,
) -> DistanceTable
where
    T: MineTree,
    S: Similarity,
{
    let mut table = DistanceTable::default();
    if n_children == 0 {
        return table;
    }

    for starting_tag in 1..=max_window {
        for gnode_size in starting_tag..=max_window {
            // A first pair at this width/phase must fit entirely.
            if starting_tag + 2 * gnode_size - 1 > n_children {
                continue;
            }

            let mut left_start = starting_tag - 1;
            let mut right_start = starting_tag + gnode_size - 1;
            while right_start < n_children {
                if right_start + gnode_size <= n_children {
                    let left = GNode::new(parent, left_start, right_start);
                    let right = GNode::new(parent, right_start, right_start + gnode_size);
                    let a = tree.span_markup(parent, left.start..left.end);
                    let b = tree.span_markup(parent, right.start..right.end);
                    let score = metric.ratio(&a, &b);
                    trace!(pair = %GNodePair::new(left, right), score, "scored pair");
                    table.insert(gnode_size, left_start, score);
                    // The right window becomes the next comparison's left.
                    left_start = right_start;
                }
                right_start += gnode_size;
            }
        }
    }

    table
}
