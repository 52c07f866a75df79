#![forbid(unsafe_code)]

use crate::ids::NodeId;
use crate::node::{ProofNodeType, ProofNodeX, Sequent};
use crate::tree::{NodeKey, ProofTree};

/// Display name of the ghost in active-node queries and addressing.
pub const GHOST_NAME: &str = "ghost";
/// Label of the ghost in rendered snapshots.
pub const GHOST_LABEL: &str = "...";

/// Floating cursor marking where the next command will be appended.
/// It is never part of any node's children.
#[derive(Clone, Debug)]
pub struct GhostNode {
    node_id: NodeId,
    anchor: Option<NodeKey>,
    active: bool,
    sequent: Option<Sequent>,
}

impl GhostNode {
    pub fn new(node_id: NodeId, anchor: NodeKey) -> Self {
        Self {
            node_id,
            anchor: Some(anchor),
            active: false,
            sequent: None,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn anchor(&self) -> Option<NodeKey> {
        self.anchor
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn sequent(&self) -> Option<&Sequent> {
        self.sequent.as_ref()
    }

    pub fn set_sequent(&mut self, sequent: Option<Sequent>) {
        self.sequent = sequent;
    }

    pub fn activate(&mut self, anchor: NodeKey) {
        self.anchor = Some(anchor);
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.anchor = None;
    }

    /// Clears the flag like any node's `not-visited` transition; the anchor is kept.
    pub fn not_visited(&mut self) {
        self.active = false;
    }

    /// Whether `id` addresses the ghost, by its id or its reserved name.
    pub fn matches(&self, id: &str) -> bool {
        id == self.node_id.as_str() || id == GHOST_NAME
    }

    pub fn to_node_x(&self, tree: &ProofTree) -> ProofNodeX {
        let anchor = self.anchor.and_then(|key| tree.get(key));
        ProofNodeX {
            id: self.node_id.clone(),
            branch: anchor
                .map(|item| item.branch_id().to_string())
                .unwrap_or_default(),
            name: GHOST_NAME.to_string(),
            node_type: ProofNodeType::Ghost,
            rules: Vec::new(),
            parent: anchor.map(|item| item.id().clone()),
        }
    }

    /// Drops the anchor if it no longer exists in `tree`.
    pub(crate) fn forget_missing_anchor(&mut self, tree: &ProofTree) {
        if self.anchor.is_some_and(|key| tree.get(key).is_none()) {
            self.deactivate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdGenerator;
    use crate::node::ProofStatus;

    fn tree() -> ProofTree {
        ProofTree::new(
            NodeId::try_new("root").unwrap(),
            "foo1",
            ProofStatus::Untried,
            IdGenerator::new("t"),
        )
    }

    #[test]
    fn deactivate_detaches_anchor() {
        let tree = tree();
        let mut ghost = GhostNode::new(NodeId::try_new("g").unwrap(), tree.root());
        ghost.activate(tree.root());
        assert!(ghost.is_active());
        ghost.deactivate();
        assert!(!ghost.is_active());
        assert!(ghost.anchor().is_none());
        assert!(ghost.matches("ghost"));
        assert!(ghost.matches("g"));
        assert_eq!(ghost.to_node_x(&tree).node_type, ProofNodeType::Ghost);
    }
}
