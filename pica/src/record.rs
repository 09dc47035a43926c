//! Data-record synthesis from discovered regions.
//!
//! Every generalized node inside a region becomes one or more records. A
//! width-1 window whose single node has uniformly similar children is split
//! into one record per child (unless the node is a table row); a wider window
//! whose member nodes all have the same child count and uniformly similar
//! children is split column-wise into records spanning disjoint subtrees.
//! Everything else is emitted as a single whole-window record.
//!
//! "Uniformly similar" is judged from the stored adjacent-pair scores only —
//! the chained approximation, not all pairwise combinations.

use crate::debug;
use core::fmt;

use indextree::NodeId;
use smallvec::SmallVec;

use crate::distance::{DistanceMap, GNode};
use crate::region::DataRegion;
use crate::tree::MineTree;
use crate::{MineError, MiningConfig};

/// Windows of this tag are never exploded into per-child records: a table
/// row's cells are fields of one record, not records themselves.
const TABLE_ROW_TAG: &str = "tr";

/// One mined record: an ordered, non-empty sequence of generalized nodes,
/// possibly spanning different parents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataRecord {
    gnodes: SmallVec<[GNode; 2]>,
}

impl DataRecord {
    /// A record made of a single window.
    pub fn single(gnode: GNode) -> Self {
        Self::from_gnodes([gnode])
    }

    /// A record made of the given windows, in order.
    pub fn from_gnodes(gnodes: impl IntoIterator<Item = GNode>) -> Self {
        let gnodes: SmallVec<[GNode; 2]> = gnodes.into_iter().collect();
        debug_assert!(!gnodes.is_empty(), "a record covers at least one window");
        Self { gnodes }
    }

    /// The constituent windows.
    pub fn gnodes(&self) -> &[GNode] {
        &self.gnodes
    }

    /// Number of windows in the record.
    pub fn len(&self) -> usize {
        self.gnodes.len()
    }

    /// Whether the record covers no windows. Records the engine emits always
    /// cover at least one.
    pub fn is_empty(&self) -> bool {
        self.gnodes.is_empty()
    }

    /// Resolve every window to its concrete subtree node list.
    pub fn node_lists<T: MineTree>(&self, tree: &T) -> Result<Vec<Vec<NodeId>>, MineError> {
        self.gnodes.iter().map(|g| g.nodes(tree)).collect()
    }
}

impl fmt::Display for DataRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataRecord(")?;
        for (i, gnode) in self.gnodes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{gnode}")?;
        }
        write!(f, ")")
    }
}

/// Phase 3: turn the flattened region list into the final ordered record
/// collection.
pub fn extract_records<T: MineTree>(
    tree: &T,
    distances: &DistanceMap,
    regions: &[DataRegion],
    config: &MiningConfig,
) -> Result<Vec<DataRecord>, MineError> {
    let mut records = Vec::new();

    for region in regions {
        for gnode in region.gnodes() {
            if region.gnode_size == 1 {
                find_records_1(tree, distances, gnode, config, &mut records)?;
            } else {
                find_records_n(tree, distances, gnode, config, &mut records)?;
            }
        }
    }

    debug!(n_records = records.len(), "records extracted");
    Ok(records)
}

/// Whether every stored size-1 score of `node`'s children passes `threshold`.
/// `None` when no size-1 pair was ever recorded for the node.
fn children_all_similar(
    distances: &DistanceMap,
    node: NodeId,
    threshold: f64,
) -> Option<bool> {
    let entries = distances.table(node)?.size_entries(1)?;
    Some(entries.values().all(|&score| score <= threshold))
}

/// A one-component window: split into per-child records when the node's
/// children are uniformly similar and the node is not a table row.
fn find_records_1<T: MineTree>(
    tree: &T,
    distances: &DistanceMap,
    gnode: GNode,
    config: &MiningConfig,
    out: &mut Vec<DataRecord>,
) -> Result<(), MineError> {
    let node = tree
        .child(gnode.parent, gnode.start)
        .ok_or(MineError::ChildOutOfBounds {
            parent: usize::from(gnode.parent),
            index: gnode.start,
        })?;

    let Some(all_similar) = children_all_similar(distances, node, config.record_threshold_1)
    else {
        // No child distances recorded for this node: nothing to emit.
        return Ok(());
    };

    if all_similar && tree.tag(node) != TABLE_ROW_TAG {
        for i in 0..tree.child_count(node) {
            out.push(DataRecord::single(GNode::new(node, i, i + 1)));
        }
    } else {
        out.push(DataRecord::single(gnode));
    }
    Ok(())
}

/// An m-component window: split column-wise into records spanning the m
/// subtrees when every member has the same child count and uniformly similar
/// children; otherwise the whole window is one record.
fn find_records_n<T: MineTree>(
    tree: &T,
    distances: &DistanceMap,
    gnode: GNode,
    config: &MiningConfig,
    out: &mut Vec<DataRecord>,
) -> Result<(), MineError> {
    let nodes = gnode.nodes(tree)?;
    let counts: Vec<usize> = nodes.iter().map(|&n| tree.child_count(n)).collect();

    let all_same_count = counts.windows(2).all(|w| w[0] == w[1]);
    let children_similar = nodes.iter().all(|&n| {
        children_all_similar(distances, n, config.record_threshold_n).unwrap_or(false)
    });

    if all_same_count && children_similar {
        for i in 0..counts[0] {
            out.push(DataRecord::from_gnodes(
                nodes.iter().map(|&n| GNode::new(n, i, i + 1)),
            ));
        }
    } else {
        out.push(DataRecord::single(gnode));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceTable;
    use crate::tree::{NodeData, Tree};

    /// A list node with `rows` children, each child getting the given tag and
    /// number of its own children.
    fn list_tree(rows: &[(&str, usize)]) -> (Tree, Vec<NodeId>) {
        let mut tree = Tree::new(NodeData::new("ul", ""));
        let root = tree.root;
        let mut ids = Vec::new();
        for &(tag, n_children) in rows {
            let row = tree.add_child(root, NodeData::new(tag, format!("<{tag}></{tag}>")));
            for i in 0..n_children {
                tree.add_child(row, NodeData::new("em", format!("<em>{i}</em>")));
            }
            ids.push(row);
        }
        (tree, ids)
    }

    fn size1_table(scores: &[f64]) -> DistanceTable {
        let mut table = DistanceTable::default();
        for (left, &score) in scores.iter().enumerate() {
            table.insert(1, left, score);
        }
        table
    }

    fn region(parent: NodeId, size: usize, first: usize, covered: usize) -> DataRegion {
        DataRegion {
            parent,
            gnode_size: size,
            first_gnode_start_index: first,
            n_nodes_covered: covered,
        }
    }

    #[test]
    fn test_similar_children_become_their_own_records() {
        let (tree, rows) = list_tree(&[("li", 3), ("li", 2)]);
        let mut distances = DistanceMap::default();
        distances.insert(rows[0], Some(size1_table(&[0.1, 0.2])));
        distances.insert(rows[1], Some(size1_table(&[0.9])));

        let regions = [region(tree.root, 1, 0, 2)];
        let config = MiningConfig::default();
        let records = extract_records(&tree, &distances, &regions, &config).unwrap();

        // First row explodes into its three children; second stays whole.
        assert_eq!(records.len(), 4);
        for (i, record) in records[..3].iter().enumerate() {
            assert_eq!(record.gnodes(), &[GNode::new(rows[0], i, i + 1)]);
        }
        assert_eq!(records[3].gnodes(), &[GNode::new(tree.root, 1, 2)]);
    }

    #[test]
    fn test_table_rows_are_never_exploded() {
        let (tree, rows) = list_tree(&[("tr", 3), ("tr", 3)]);
        let mut distances = DistanceMap::default();
        distances.insert(rows[0], Some(size1_table(&[0.1, 0.1])));
        distances.insert(rows[1], Some(size1_table(&[0.1, 0.1])));

        let regions = [region(tree.root, 1, 0, 2)];
        let config = MiningConfig::default();
        let records = extract_records(&tree, &distances, &regions, &config).unwrap();

        assert_eq!(records.len(), 2);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.gnodes(), &[GNode::new(tree.root, i, i + 1)]);
        }
    }

    #[test]
    fn test_missing_child_distances_contribute_nothing() {
        // A row with a single child never has a size-1 pair recorded.
        let (tree, rows) = list_tree(&[("li", 1), ("li", 1)]);
        let mut distances = DistanceMap::default();
        distances.insert(rows[0], Some(DistanceTable::default()));
        distances.insert(rows[1], Some(DistanceTable::default()));

        let regions = [region(tree.root, 1, 0, 2)];
        let config = MiningConfig::default();
        let records = extract_records(&tree, &distances, &regions, &config).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_wide_window_splits_column_wise() {
        let (tree, rows) = list_tree(&[("li", 2), ("li", 2), ("li", 2), ("li", 3)]);
        let mut distances = DistanceMap::default();
        distances.insert(rows[0], Some(size1_table(&[0.1])));
        distances.insert(rows[1], Some(size1_table(&[0.2])));
        distances.insert(rows[2], Some(size1_table(&[0.9])));
        distances.insert(rows[3], Some(size1_table(&[0.1, 0.1])));

        let regions = [region(tree.root, 2, 0, 4)];
        let config = MiningConfig::default();
        let records = extract_records(&tree, &distances, &regions, &config).unwrap();

        // First window (rows 0 and 1): equal counts, similar children — two
        // column records spanning both subtrees. Second window (rows 2 and
        // 3): unequal counts — one whole-window record.
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0].gnodes(),
            &[GNode::new(rows[0], 0, 1), GNode::new(rows[1], 0, 1)]
        );
        assert_eq!(
            records[1].gnodes(),
            &[GNode::new(rows[0], 1, 2), GNode::new(rows[1], 1, 2)]
        );
        assert_eq!(records[2].gnodes(), &[GNode::new(tree.root, 2, 4)]);
    }

    #[test]
    fn test_wide_window_with_dissimilar_children_stays_whole() {
        let (tree, rows) = list_tree(&[("li", 2), ("li", 2), ("li", 2), ("li", 2)]);
        let mut distances = DistanceMap::default();
        distances.insert(rows[0], Some(size1_table(&[0.1])));
        distances.insert(rows[1], Some(size1_table(&[0.8])));
        distances.insert(rows[2], Some(size1_table(&[0.1])));
        distances.insert(rows[3], Some(size1_table(&[0.8])));

        let regions = [region(tree.root, 2, 0, 4)];
        let config = MiningConfig::default();
        let records = extract_records(&tree, &distances, &regions, &config).unwrap();

        // One member of each window fails the similarity check, so both
        // windows stay whole records.
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].gnodes(), &[GNode::new(tree.root, 0, 2)]);
        assert_eq!(records[1].gnodes(), &[GNode::new(tree.root, 2, 4)]);
    }

    #[test]
    fn test_record_display_and_resolution() {
        let (tree, rows) = list_tree(&[("li", 2), ("li", 2)]);
        let record = DataRecord::from_gnodes([
            GNode::new(rows[0], 0, 1),
            GNode::new(rows[1], 0, 1),
        ]);
        assert_eq!(record.len(), 2);
        assert_eq!(format!("{record}"), "DataRecord(GN(0, 1), GN(0, 1))");

        let lists = record.node_lists(&tree).unwrap();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0], vec![tree.child(rows[0], 0).unwrap()]);
        assert_eq!(lists[1], vec![tree.child(rows[1], 0).unwrap()]);
    }
}
