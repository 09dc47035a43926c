//! Data-region detection.
//!
//! A data region is a maximal run of adjacent, equal-size generalized nodes
//! under one parent whose chained pair scores all pass the region threshold.
//! Detection scans every window size and starting phase in a fixed order and
//! keeps the best run under a deliberate tie-break: a candidate only replaces
//! the current best when it covers strictly more nodes *and* starts at or
//! before the best's start. A later-starting larger run loses. This mirrors
//! the published heuristic the scan is taken from; don't "fix" it.

use crate::{debug, trace};
use core::fmt;

use indextree::NodeId;
use rapidhash::RapidHashMap;

use crate::distance::{DistanceMap, DistanceTable, GNode};
use crate::tree::MineTree;
use crate::{MineError, MiningConfig};

/// A maximal run of similar adjacent windows under one parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataRegion {
    /// Parent node owning the covered sibling range.
    pub parent: NodeId,
    /// Width of each generalized node in the run.
    pub gnode_size: usize,
    /// Sibling index where the first generalized node starts.
    pub first_gnode_start_index: usize,
    /// Total number of siblings covered; always a multiple of `gnode_size`.
    pub n_nodes_covered: usize,
}

impl DataRegion {
    /// The two-window region ending with `last`: its covered range is
    /// `last`'s window plus the window immediately before it.
    pub fn binary_from_last_gnode(last: GNode) -> Self {
        let gnode_size = last.size();
        Self {
            parent: last.parent,
            gnode_size,
            first_gnode_start_index: last.start - gnode_size,
            n_nodes_covered: 2 * gnode_size,
        }
    }

    /// This region grown by one more window on the right.
    pub fn extend_one_gnode(self) -> Self {
        Self {
            n_nodes_covered: self.n_nodes_covered + self.gnode_size,
            ..self
        }
    }

    /// Number of generalized nodes in the run.
    pub fn n_gnodes(&self) -> usize {
        self.n_nodes_covered / self.gnode_size
    }

    /// The last sibling index the run covers.
    pub fn last_covered_index(&self) -> usize {
        self.first_gnode_start_index + self.n_nodes_covered - 1
    }

    /// Whether a sibling index falls inside the covered range.
    pub fn contains_index(&self, child_index: usize) -> bool {
        self.first_gnode_start_index <= child_index && child_index <= self.last_covered_index()
    }

    /// The constituent generalized nodes, left to right.
    pub fn gnodes(&self) -> impl Iterator<Item = GNode> + '_ {
        let Self {
            parent,
            gnode_size,
            first_gnode_start_index,
            ..
        } = *self;
        (0..self.n_gnodes()).map(move |k| {
            let start = first_gnode_start_index + k * gnode_size;
            GNode::new(parent, start, start + gnode_size)
        })
    }
}

impl fmt::Display for DataRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DR({}, {}, {})",
            self.gnode_size, self.first_gnode_start_index, self.n_nodes_covered
        )
    }
}

/// The regions discovered at every analyzed node: the node's own maximal
/// runs plus the contributions of children not already covered by them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionMap {
    by_node: RapidHashMap<NodeId, Vec<DataRegion>>,
}

impl RegionMap {
    pub(crate) fn insert(&mut self, id: NodeId, regions: Vec<DataRegion>) {
        self.by_node.insert(id, regions);
    }

    /// The final region set attached to a node (empty for nodes below the
    /// depth gate).
    pub fn of(&self, id: NodeId) -> &[DataRegion] {
        self.by_node.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of nodes carrying a region set.
    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    /// Whether no node carries a region set.
    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }

    /// Every distinct region discovered anywhere in the tree, ordered by
    /// (parent arena index, first covered index, window size). The same
    /// region can sit in several nodes' sets; the flattened view keeps one
    /// copy, so downstream passes are deterministic.
    pub fn all_sorted(&self) -> Vec<DataRegion> {
        let mut all: Vec<DataRegion> = self.by_node.values().flatten().copied().collect();
        all.sort_unstable_by_key(|dr| {
            (
                usize::from(dr.parent),
                dr.first_gnode_start_index,
                dr.gnode_size,
                dr.n_nodes_covered,
            )
        });
        all.dedup();
        all
    }
}

/// Scan one width/phase combination: walk the chained pair scores and grow a
/// run while they pass the threshold. A failing score closes an open run for
/// good; failing scores before the first hit just keep the scan moving.
fn scan_phase(
    table: &DistanceTable,
    parent: NodeId,
    gnode_size: usize,
    first: usize,
    n_children: usize,
    threshold: f64,
) -> Result<Option<DataRegion>, MineError> {
    let mut current: Option<DataRegion> = None;
    let mut last = first + gnode_size;

    while last + gnode_size <= n_children {
        let left_start = last - gnode_size;
        let score =
            table
                .score(gnode_size, left_start)
                .ok_or(MineError::MissingDistance {
                    parent: usize::from(parent),
                    size: gnode_size,
                    left_start,
                })?;

        if score <= threshold {
            current = Some(match current {
                None => DataRegion::binary_from_last_gnode(GNode::new(
                    parent,
                    last,
                    last + gnode_size,
                )),
                Some(open) => open.extend_one_gnode(),
            });
        } else if current.is_some() {
            // An open run never re-opens after a break.
            break;
        }

        last += gnode_size;
    }

    Ok(current)
}

/// Identify the maximal data regions among `parent`'s children at or after
/// `start_index`, given the parent's distance table.
///
/// Pure in its inputs: the same `(table, threshold, start_index)` always
/// yields the same regions. Returns them left to right, non-overlapping.
pub fn identify_data_regions(
    start_index: usize,
    parent: NodeId,
    n_children: usize,
    table: Option<&DistanceTable>,
    config: &MiningConfig,
) -> Result<Vec<DataRegion>, MineError> {
    let Some(table) = table.filter(|t| !t.is_empty()) else {
        return Ok(Vec::new());
    };

    let mut regions = Vec::new();
    let mut start = start_index;

    loop {
        let mut best: Option<DataRegion> = None;

        for gnode_size in 1..=config.max_window {
            for first in start..start + gnode_size {
                let Some(candidate) = scan_phase(
                    table,
                    parent,
                    gnode_size,
                    first,
                    n_children,
                    config.region_threshold,
                )?
                else {
                    continue;
                };

                let covers_more =
                    best.map_or(0, |b| b.n_nodes_covered) < candidate.n_nodes_covered;
                let starts_at_or_before = best.is_none_or(|b| {
                    candidate.first_gnode_start_index <= b.first_gnode_start_index
                });
                if covers_more && starts_at_or_before {
                    trace!(%candidate, "new best region candidate");
                    best = Some(candidate);
                }
            }
        }

        let Some(found) = best else { break };
        let last_covered = found.last_covered_index();
        regions.push(found);

        // Keep scanning after the run unless it already reaches the last child.
        if last_covered + 1 < n_children {
            start = last_covered + 1;
        } else {
            break;
        }
    }

    Ok(regions)
}

/// Phase 2: compute every node's own regions, then compose bottom-up.
///
/// A child whose sibling index falls inside one of its parent's own regions
/// is already represented at the parent level and contributes nothing there;
/// every other child hands its final region set up. Nodes below the depth
/// gate are descended through but never aggregate.
pub fn find_data_regions<T: MineTree>(
    tree: &T,
    distances: &DistanceMap,
    config: &MiningConfig,
) -> Result<RegionMap, MineError> {
    // Pre-order visit list with depths; its reverse is a valid bottom-up order.
    let mut order: Vec<(NodeId, usize)> = Vec::with_capacity(tree.node_count());
    let mut stack = vec![(tree.root(), 0usize)];
    while let Some((id, depth)) = stack.pop() {
        order.push((id, depth));
        let children: Vec<NodeId> = tree.children(id).collect();
        for &child in children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    let mut own: RapidHashMap<NodeId, Vec<DataRegion>> = RapidHashMap::default();
    for &(id, depth) in &order {
        if depth < config.minimum_depth {
            continue;
        }
        let regions = identify_data_regions(
            0,
            id,
            tree.child_count(id),
            distances.table(id),
            config,
        )?;
        debug!(node = usize::from(id), n_regions = regions.len(), "own regions");
        own.insert(id, regions);
    }

    let mut map = RegionMap::default();
    for &(id, depth) in order.iter().rev() {
        if depth < config.minimum_depth {
            continue;
        }
        let own_regions = own.remove(&id).unwrap_or_default();
        let mut composed = own_regions.clone();
        for (pos, child) in tree.children(id).enumerate() {
            if own_regions.iter().any(|dr| dr.contains_index(pos)) {
                continue;
            }
            composed.extend_from_slice(map.of(child));
        }
        map.insert(id, composed);
    }

    Ok(map)
}
