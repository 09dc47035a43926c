//! Mining glue.
//!
//! [`DocTree`] adapts a DOM [`Element`] to the engine: element children
//! become arena nodes (text and comments only contribute to markup), every
//! node's canonical markup is serialized once up front, and mined windows
//! resolve back to `&Element` subtree lists.

use pica::indextree::NodeId;
use pica::{
    DataRecord, GNode, Harvest, MineError, MiningConfig, NodeData, Similarity, Tree,
};

use crate::dom::{Document, Element};
use crate::serialize::serialize_element;

/// A mineable view of an element tree.
#[derive(Debug)]
pub struct DocTree<'a> {
    tree: Tree,
    elements: Vec<Option<&'a Element>>,
}

impl<'a> DocTree<'a> {
    /// Build the arena for `root`'s element tree, serializing each subtree's
    /// canonical markup once.
    pub fn build(root: &'a Element) -> Self {
        let mut tree = Tree::new(NodeData::new(root.tag.clone(), serialize_element(root)));
        let mut elements: Vec<Option<&'a Element>> = Vec::new();
        Self::remember(&mut elements, tree.root, root);

        let mut stack: Vec<(&'a Element, NodeId)> = vec![(root, tree.root)];
        while let Some((elem, id)) = stack.pop() {
            for child in elem.element_children() {
                let child_id = tree.add_child(
                    id,
                    NodeData::new(child.tag.clone(), serialize_element(child)),
                );
                Self::remember(&mut elements, child_id, child);
                stack.push((child, child_id));
            }
        }

        Self { tree, elements }
    }

    fn remember(elements: &mut Vec<Option<&'a Element>>, id: NodeId, elem: &'a Element) {
        let idx = usize::from(id);
        if idx >= elements.len() {
            elements.resize(idx + 1, None);
        }
        elements[idx] = Some(elem);
    }

    /// The arena tree the engine runs over.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The element behind an arena node.
    pub fn element(&self, id: NodeId) -> Option<&'a Element> {
        self.elements.get(usize::from(id)).copied().flatten()
    }

    /// Resolve a mined window to the elements it covers.
    pub fn gnode_elements(&self, gnode: &GNode) -> Result<Vec<&'a Element>, MineError> {
        gnode
            .nodes(&self.tree)?
            .into_iter()
            .map(|id| {
                self.element(id).ok_or(MineError::ChildOutOfBounds {
                    parent: usize::from(gnode.parent),
                    index: gnode.start,
                })
            })
            .collect()
    }

    /// Resolve a record to one element list per window.
    pub fn record_elements(&self, record: &DataRecord) -> Result<Vec<Vec<&'a Element>>, MineError> {
        record
            .gnodes()
            .iter()
            .map(|gnode| self.gnode_elements(gnode))
            .collect()
    }
}

/// Mine an element tree with the default metric.
pub fn mine_element<'a>(
    root: &'a Element,
    config: &MiningConfig,
) -> Result<(DocTree<'a>, Harvest), MineError> {
    let doc = DocTree::build(root);
    let harvest = pica::mine(doc.tree(), config)?;
    Ok((doc, harvest))
}

/// Mine an element tree with a caller-supplied metric.
pub fn mine_element_with_metric<'a, S: Similarity>(
    root: &'a Element,
    metric: &S,
    config: &MiningConfig,
) -> Result<(DocTree<'a>, Harvest), MineError> {
    let doc = DocTree::build(root);
    let harvest = pica::mine_with_metric(doc.tree(), metric, config)?;
    Ok((doc, harvest))
}

/// Mine a whole document with the default metric.
pub fn mine_document<'a>(
    doc: &'a Document,
    config: &MiningConfig,
) -> Result<(DocTree<'a>, Harvest), MineError> {
    mine_element(&doc.root, config)
}
