//! Page nodes laid out as an `ego_tree` tree.
//!
//! Every rendered card gets a node bound to its [`CardId`], and every control
//! inside the card hangs below it. Event targets are resolved by walking
//! ancestors from the triggering node. Nodes are only ever appended, so the
//! walk always ends at the root.
use ego_tree::{NodeRef, Tree};

use crate::{CardId, PromptType};

/// Opaque handle of a node in a [`PageTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(ego_tree::NodeId);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum NodeData {
    #[default]
    Plain,
    Card(CardId),
    Field(PromptType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTree {
    tree: Tree<NodeData>,
}

impl Default for PageTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PageTree {
    pub fn new() -> Self {
        Self {
            tree: Tree::new(NodeData::Plain),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(self.tree.root().id())
    }

    /// Appends a plain node. `None` when `parent` is not in this tree.
    pub fn add_child(&mut self, parent: NodeId) -> Option<NodeId> {
        self.append(parent, NodeData::Plain)
    }

    /// Appends a node that marks a card boundary.
    pub fn add_card(&mut self, parent: NodeId, card: CardId) -> Option<NodeId> {
        self.append(parent, NodeData::Card(card))
    }

    /// Appends a node that marks the control group of one field.
    pub fn add_field(&mut self, parent: NodeId, field: PromptType) -> Option<NodeId> {
        self.append(parent, NodeData::Field(field))
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree
            .get(node.0)?
            .parent()
            .map(|parent| NodeId(parent.id()))
    }

    pub fn len(&self) -> usize {
        self.tree.nodes().count()
    }

    /// Always false: a page has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Nearest card boundary at or above `node`.
    pub fn resolve_card(&self, node: NodeId) -> Option<&CardId> {
        self.upwards(node)?.find_map(|entry| match entry.value() {
            NodeData::Card(card) => Some(card),
            _ => None,
        })
    }

    /// Nearest field marker at or above `node`, stopping at the card boundary.
    pub fn resolve_field(&self, node: NodeId) -> Option<PromptType> {
        for entry in self.upwards(node)? {
            match entry.value() {
                NodeData::Field(field) => return Some(*field),
                NodeData::Card(_) => return None,
                NodeData::Plain => {}
            }
        }
        None
    }

    fn append(&mut self, parent: NodeId, data: NodeData) -> Option<NodeId> {
        let mut parent = self.tree.get_mut(parent.0)?;
        Some(NodeId(parent.append(data).id()))
    }

    /// `node` itself followed by its ancestors up to the root.
    fn upwards(&self, node: NodeId) -> Option<impl Iterator<Item = NodeRef<'_, NodeData>>> {
        let start = self.tree.get(node.0)?;
        Some(std::iter::once(start).chain(start.ancestors()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_descendants_resolve_to_their_card() {
        let mut tree = PageTree::new();
        let card = tree.add_card(tree.root(), CardId::new("p-1")).unwrap();
        let field = tree.add_field(card, PromptType::Description).unwrap();
        let mut leaf = tree.add_child(field).unwrap();
        for _ in 0..50 {
            leaf = tree.add_child(leaf).unwrap();
        }

        assert_eq!(tree.resolve_card(leaf), Some(&CardId::new("p-1")));
        assert_eq!(tree.resolve_field(leaf), Some(PromptType::Description));
        assert_eq!(tree.resolve_card(card), Some(&CardId::new("p-1")));
        assert_eq!(tree.parent(field), Some(card));
        assert_eq!(tree.len(), 54);
    }

    #[test]
    fn nodes_outside_any_card_resolve_to_none() {
        let mut tree = PageTree::new();
        let root = tree.root();
        let header = tree.add_child(root).unwrap();
        let orphan_field = tree.add_field(header, PromptType::Title).unwrap();

        assert_eq!(tree.resolve_card(header), None);
        assert_eq!(tree.resolve_card(orphan_field), None);
        assert_eq!(tree.resolve_card(root), None);
        assert_eq!(tree.parent(root), None);
    }

    #[test]
    fn field_lookup_stops_at_card_boundary() {
        let mut tree = PageTree::new();
        let outer = tree.add_field(tree.root(), PromptType::Title).unwrap();
        let card = tree.add_card(outer, CardId::new("p-2")).unwrap();
        let keywords = tree.add_child(card).unwrap();

        assert_eq!(tree.resolve_field(keywords), None);
        assert_eq!(tree.resolve_card(keywords), Some(&CardId::new("p-2")));
    }

    #[test]
    fn node_from_another_page_resolves_to_none() {
        let mut larger = PageTree::new();
        let mut foreign = larger.root();
        for _ in 0..4 {
            foreign = larger.add_child(foreign).unwrap();
        }
        let mut small = PageTree::new();

        assert_eq!(small.resolve_card(foreign), None);
        assert_eq!(small.resolve_field(foreign), None);
        assert_eq!(small.add_child(foreign), None);
    }
}
