//! Stable, human-readable node identities.
//!
//! Every node visited during a run gets a name of the form `{tag}-{seq:05}`
//! (`div-00000`, `div-00001`, ...), with one counter per tag. Names are
//! assigned lazily in visit order, so numbering is deterministic for a given
//! traversal, and they live in a side table — node content is never touched.

use compact_str::{CompactString, format_compact};
use indextree::NodeId;
use rapidhash::RapidHashMap;

use crate::MineError;

/// Bidirectional map between [`NodeId`]s and formatted node names.
///
/// The id-to-name direction is an arena-indexed `Vec` (O(1), same trick as
/// indexing match tables by id); the name-to-id direction is a hash map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeIndex {
    tag_counts: RapidHashMap<CompactString, usize>,
    names: Vec<Option<CompactString>>,
    by_name: RapidHashMap<CompactString, NodeId>,
}

impl NodeIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the name of `id`, assigning the next `{tag}-{seq:05}` name if
    /// the node has not been seen before. Idempotent: a second call with the
    /// same id returns the same name.
    pub fn identify(&mut self, id: NodeId, tag: &str) -> CompactString {
        let idx = usize::from(id);
        if let Some(Some(name)) = self.names.get(idx) {
            return name.clone();
        }

        let seq = self.tag_counts.entry(CompactString::from(tag)).or_insert(0);
        let name = format_compact!("{tag}-{:05}", *seq);
        *seq += 1;

        if idx >= self.names.len() {
            self.names.resize(idx + 1, None);
        }
        self.names[idx] = Some(name.clone());
        self.by_name.insert(name.clone(), id);
        name
    }

    /// The name previously assigned to `id`, if any.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.names
            .get(usize::from(id))
            .and_then(|n| n.as_deref())
    }

    /// Resolve a name back to its node id.
    ///
    /// Fails with [`MineError::UnknownName`] for names this index never
    /// assigned.
    pub fn resolve(&self, name: &str) -> Result<NodeId, MineError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| MineError::UnknownName {
                name: name.to_string(),
            })
    }

    /// Number of nodes named so far.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether no node has been named yet.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
