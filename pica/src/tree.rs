//! The tree abstraction the miner runs over, plus a concrete arena tree.
//!
//! The engine never parses markup itself: it consumes anything implementing
//! [`MineTree`], which exposes a node's tag, its ordered children, and the
//! canonical serialized text of a contiguous span of sibling subtrees (the
//! input to the similarity metric). [`Tree`] is the bundled implementation,
//! an `indextree` arena whose nodes carry their tag and pre-computed markup.

use compact_str::CompactString;
use core::ops::Range;
use indextree::{Arena, NodeId};

/// Read-only view of a parsed document tree.
///
/// Implementations must report children in document order and keep ids stable
/// for the lifetime of the tree; the miner indexes all of its tables by
/// [`NodeId`].
pub trait MineTree {
    /// The root node of the tree.
    fn root(&self) -> NodeId;

    /// Total number of nodes in the tree.
    fn node_count(&self) -> usize;

    /// The tag (label) of a node.
    fn tag(&self, id: NodeId) -> &str;

    /// The children of a node, in document order.
    fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_;

    /// The number of children of a node.
    fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// The `index`-th child of a node, if it exists.
    fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).nth(index)
    }

    /// Canonical serialized text of the sibling subtrees
    /// `children(parent)[span]`, with the members' markup joined by a single
    /// space. This string is what the similarity metric sees.
    fn span_markup(&self, parent: NodeId, span: Range<usize>) -> String;
}

/// Payload of one [`Tree`] node: a tag plus the canonical markup of the whole
/// subtree rooted at that node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Tag (label) of the node.
    pub tag: CompactString,
    /// Canonical serialized markup of the node's entire subtree.
    pub markup: String,
}

impl NodeData {
    /// Create a node payload from a tag and its subtree markup.
    pub fn new(tag: impl Into<CompactString>, markup: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            markup: markup.into(),
        }
    }
}

/// A concrete arena-backed tree.
///
/// Build it root-first with [`Tree::new`] and [`Tree::add_child`]; sibling
/// order is insertion order.
#[derive(Debug)]
pub struct Tree {
    arena: Arena<NodeData>,
    /// The root node id.
    pub root: NodeId,
}

impl Tree {
    /// Create a tree containing only a root node.
    pub fn new(data: NodeData) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(data);
        Self { arena, root }
    }

    /// Append a child under `parent` and return its id.
    pub fn add_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.arena.new_node(data);
        parent.append(id, &mut self.arena);
        id
    }

    /// The payload of a node.
    pub fn data(&self, id: NodeId) -> &NodeData {
        self.arena[id].get()
    }

    /// The canonical markup of a node's subtree.
    pub fn markup(&self, id: NodeId) -> &str {
        &self.data(id).markup
    }
}

impl MineTree for Tree {
    fn root(&self) -> NodeId {
        self.root
    }

    fn node_count(&self) -> usize {
        self.arena.count()
    }

    fn tag(&self, id: NodeId) -> &str {
        &self.data(id).tag
    }

    fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    fn span_markup(&self, parent: NodeId, span: Range<usize>) -> String {
        let mut out = String::new();
        let mut first = true;
        for (i, child) in self.children(parent).enumerate() {
            if i < span.start {
                continue;
            }
            if i >= span.end {
                break;
            }
            if !first {
                out.push(' ');
            }
            out.push_str(self.markup(child));
            first = false;
        }
        out
    }
}
