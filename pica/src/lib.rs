//! # Pica
//!
//! Mining of repeated data records in markup trees.
//!
//! Named after *Pica pica* (the Eurasian magpie), a committed collector of
//! repeated shiny things.
//!
//! ## Algorithm Overview
//!
//! Pica finds list-like repeated structures (product cards, search-result
//! rows, table rows) in an already-parsed tree using only structural and
//! textual repetition: no schema, no template, no prior knowledge of the
//! document's semantics. A run has three phases:
//!
//! 1. **Distance computation**: for every node at or below the depth gate,
//!    score all valid pairs of equal-width, adjacent sibling windows
//!    ("generalized nodes") over its children, using a pluggable string
//!    metric on canonical markup.
//! 2. **Region finding**: per node, derive the maximal contiguous runs of
//!    windows whose chained pair scores pass the region threshold ("data
//!    regions"), then compose discoveries bottom-up across tree levels.
//! 3. **Record extraction**: split every region's windows into the final
//!    ordered collection of data records via two splitting heuristics.
//!
//! Runs are pure functions of `(tree, config)` — there is no engine object
//! to reuse, and identical inputs always produce identical output.
//!
//! ## Usage
//!
//! ```
//! use pica::{MiningConfig, NodeData, Tree, mine_with_metric};
//!
//! // Scaffolding deep enough for the default depth gate.
//! let mut tree = Tree::new(NodeData::new("html", ""));
//! let body = tree.add_child(tree.root, NodeData::new("body", ""));
//! let div = tree.add_child(body, NodeData::new("div", ""));
//! let list = tree.add_child(div, NodeData::new("ul", ""));
//! for i in 0..4 {
//!     let li = tree.add_child(list, NodeData::new("li", "<li><b>n</b><i>v</i></li>"));
//!     tree.add_child(li, NodeData::new("b", "<b>n</b>"));
//!     tree.add_child(li, NodeData::new("i", format!("<i>{i}</i>")));
//! }
//!
//! // A distance-shaped metric: 0.0 means identical markup.
//! let metric = |a: &str, b: &str| if a == b { 0.0 } else { 1.0 };
//! let harvest = mine_with_metric(&tree, &metric, &MiningConfig::default()).unwrap();
//! assert_eq!(harvest.records.len(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]

pub use indextree;

mod tracing_macros;

/// Distance tables over generalized-node windows
pub mod distance;
/// Stable node identities
pub mod index;
/// Record synthesis
pub mod record;
/// Data-region detection
pub mod region;
/// String-similarity collaborator
pub mod similarity;
/// Tree abstraction and concrete arena tree
pub mod tree;

pub use distance::{DistanceMap, DistanceTable, GNode, GNodePair, compute_distances};
pub use index::NodeIndex;
pub use record::{DataRecord, extract_records};
pub use region::{DataRegion, RegionMap, find_data_regions, identify_data_regions};
pub use similarity::{NormalizedLevenshtein, Similarity};
pub use tree::{MineTree, NodeData, Tree};

/// Configuration for a mining run.
///
/// Every entry point validates the configuration before any traversal; see
/// [`MiningConfig::validate`].
#[derive(Debug, Clone)]
pub struct MiningConfig {
    /// Largest generalized-node width considered.
    pub max_window: usize,
    /// Maximum score for adjacent windows to count as similar during region
    /// detection.
    pub region_threshold: f64,
    /// Threshold for splitting a one-component window into per-child records.
    pub record_threshold_1: f64,
    /// Threshold for splitting an m-component window into column records.
    pub record_threshold_n: f64,
    /// Shallowest depth at which a node's children are analyzed, counting the
    /// root as depth 0.
    pub minimum_depth: usize,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            max_window: 10,
            region_threshold: 0.3,
            record_threshold_1: 0.3,
            record_threshold_n: 0.3,
            minimum_depth: 3,
        }
    }
}

impl MiningConfig {
    /// Reject non-positive windows and thresholds outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), MineError> {
        if self.max_window == 0 {
            return Err(MineError::WindowTooSmall);
        }
        for (name, value) in [
            ("region_threshold", self.region_threshold),
            ("record_threshold_1", self.record_threshold_1),
            ("record_threshold_n", self.record_threshold_n),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MineError::ThresholdOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

/// Errors a mining run can surface.
///
/// Configuration errors are rejected before any traversal; the lookup
/// variants indicate an internal invariant violation (a table, window, or
/// name that doesn't belong to the tree being mined) and are never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MineError {
    /// `max_window` was zero.
    #[error("max_window must be at least 1")]
    WindowTooSmall,

    /// A threshold fell outside `[0, 1]`.
    #[error("{name} must be within [0, 1], got {value}")]
    ThresholdOutOfRange {
        /// Name of the offending option.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A node name was never assigned by the index resolving it.
    #[error("unknown node name `{name}`")]
    UnknownName {
        /// The unresolvable name.
        name: String,
    },

    /// A window referenced a child index past its parent's children.
    #[error("node {parent} has no child at index {index}")]
    ChildOutOfBounds {
        /// Arena index of the parent node.
        parent: usize,
        /// The out-of-bounds child index.
        index: usize,
    },

    /// The region scan asked for a pair the distance table never recorded.
    #[error("no distance recorded for parent {parent}, window size {size}, left start {left_start}")]
    MissingDistance {
        /// Arena index of the parent node.
        parent: usize,
        /// Window size of the missing pair.
        size: usize,
        /// Left window start of the missing pair.
        left_start: usize,
    },
}

/// Everything a mining run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Harvest {
    /// The mined records, in deterministic document order.
    pub records: Vec<DataRecord>,
    /// Every distinct data region discovered anywhere in the tree, ordered
    /// by (parent arena index, first covered index, window size).
    pub regions: Vec<DataRegion>,
    /// Names assigned to the visited nodes, for reporting and lookup.
    pub index: NodeIndex,
}

/// Mine a tree with the default [`NormalizedLevenshtein`] metric.
pub fn mine<T: MineTree>(tree: &T, config: &MiningConfig) -> Result<Harvest, MineError> {
    mine_with_metric(tree, &NormalizedLevenshtein, config)
}

/// Mine a tree with a caller-supplied similarity metric.
///
/// Validates the configuration, then runs the three phases in order. The
/// whole run is deterministic: window sizes ascend, phases ascend, scans go
/// left to right, and the flattened region view has a fixed order.
pub fn mine_with_metric<T, S>(
    tree: &T,
    metric: &S,
    config: &MiningConfig,
) -> Result<Harvest, MineError>
where
    T: MineTree,
    S: Similarity,
{
    config.validate()?;

    let mut index = NodeIndex::new();
    debug!(phase = "compute_distances", "phase start");
    let distances = compute_distances(tree, metric, config, &mut index);

    debug!(phase = "find_data_regions", "phase start");
    let region_map = find_data_regions(tree, &distances, config)?;
    let regions = region_map.all_sorted();

    debug!(phase = "extract_records", n_regions = regions.len(), "phase start");
    let records = extract_records(tree, &distances, &regions, config)?;

    Ok(Harvest {
        records,
        regions,
        index,
    })
}
