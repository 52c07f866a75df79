#![forbid(unsafe_code)]

use super::requests::RunTarget;
use super::{ProofExplorer, logged};
use crate::error::{Applied, ExplorerError};
use crate::ghost::GHOST_NAME;
use crate::ids::NodeId;
use crate::node::{
    FormulaDescriptor, NodeRef, ProofNode, ProofNodeType, ProofNodeX, ProofStatus, Sequent,
};
use crate::snapshot::{TreeStructure, tree_structure};
use crate::status::StatusFlags;
use crate::tree::{Expansion, NodeKey, ProofItem};
use serde::Serialize;

/// Flat view of one node, as a tree-view renderer lists it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: ProofNodeType,
    pub branch: String,
    pub status: StatusFlags,
    pub collapsible: bool,
    pub collapsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerState {
    pub loaded: bool,
    pub proof_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<FormulaDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_status: Option<ProofStatus>,
    /// Status the proof had when it was loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_proof_status: Option<ProofStatus>,
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<RunTarget>,
    pub dirty: bool,
    pub ghost_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_node: Option<NodeRef>,
    pub node_count: usize,
    pub sketchpad_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clipboard: Option<String>,
}

impl ProofExplorer {
    pub fn proof_name(&self) -> String {
        self.tree
            .as_ref()
            .map(|tree| tree.root_item().name().to_string())
            .unwrap_or_default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn proof_is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn ghost_is_active(&self) -> bool {
        self.ghost.as_ref().is_some_and(|ghost| ghost.is_active())
    }

    pub fn run_target(&self) -> Option<&RunTarget> {
        self.target.as_ref()
    }

    pub fn proof_status(&self) -> Option<ProofStatus> {
        self.tree.as_ref().map(|tree| tree.root_info().proof_status)
    }

    pub fn initial_proof_status(&self) -> Option<ProofStatus> {
        self.tree
            .as_ref()
            .map(|tree| tree.root_info().initial_proof_status)
    }

    /// The active real node, else the active ghost reported by name `"ghost"`.
    pub fn active_node(&self) -> Option<ProofNodeX> {
        let tree = self.tree.as_ref()?;
        if let Some(key) = self.active {
            return tree.node_x_structure(key);
        }
        self.ghost
            .as_ref()
            .filter(|ghost| ghost.is_active())
            .map(|ghost| ghost.to_node_x(tree))
    }

    pub fn is_active(&self, id: &NodeId) -> bool {
        if let Some(ghost) = self.ghost.as_ref()
            && ghost.matches(id.as_str())
        {
            return ghost.is_active();
        }
        self.status_of(id).is_some_and(|status| status.active)
    }

    pub fn is_pending(&self, id: &NodeId) -> bool {
        self.status_of(id).is_some_and(|status| status.pending)
    }

    pub fn is_visited(&self, id: &NodeId) -> bool {
        self.status_of(id).is_some_and(|status| status.visited)
    }

    pub fn is_complete(&self, id: &NodeId) -> bool {
        self.status_of(id).is_some_and(|status| status.complete)
    }

    fn status_of(&self, id: &NodeId) -> Option<StatusFlags> {
        self.tree.as_ref()?.item(id).map(ProofItem::status)
    }

    pub fn proof_x(&self) -> Option<ProofNodeX> {
        let tree = self.tree.as_ref()?;
        tree.node_x_structure(tree.root())
    }

    pub fn proof(&self) -> Option<ProofNode> {
        let tree = self.tree.as_ref()?;
        tree.node_structure(tree.root())
    }

    pub fn tree_structure(&self) -> Option<TreeStructure> {
        let tree = self.tree.as_ref()?;
        Some(tree_structure(tree, self.ghost.as_ref()))
    }

    /// Command script of the subtree at `id`, or of the whole proof.
    pub fn proof_script(&self, id: Option<&NodeId>) -> Result<String, ExplorerError> {
        const OP: &str = "getProofScript";
        let tree = self.tree_ref(OP)?;
        let key = match id {
            Some(id) => tree.find(id).ok_or_else(|| {
                logged(ExplorerError::NotFound {
                    op: OP,
                    id: id.clone(),
                })
            })?,
            None => tree.root(),
        };
        Ok(tree.print_proof_commands(key))
    }

    /// Children as a tree view lists them. With an active ghost, the ghost follows its
    /// anchor. Top level is `[root]`, or `[root, ghost]` for an empty proof.
    pub fn children_of(&self, id: Option<&NodeId>) -> Result<Vec<ItemView>, ExplorerError> {
        const OP: &str = "getChildren";
        let tree = self.tree_ref(OP)?;
        let Some(id) = id else {
            let mut out = vec![self.view(tree.root())];
            if tree.root_item().children().is_empty()
                && let Some(ghost) = self.ghost.as_ref()
            {
                out.push(self.ghost_view(ghost.anchor()));
            }
            return Ok(out.into_iter().flatten().collect());
        };
        let key = tree.find(id).ok_or_else(|| {
            logged(ExplorerError::NotFound {
                op: OP,
                id: id.clone(),
            })
        })?;
        let mut out = Vec::new();
        for child in tree.get(key).map(ProofItem::children).unwrap_or_default() {
            out.extend(self.view(*child));
            if let Some(ghost) = self.ghost.as_ref()
                && ghost.is_active()
                && ghost.anchor() == Some(*child)
            {
                out.extend(self.ghost_view(Some(*child)));
            }
        }
        Ok(out)
    }

    pub fn parent_of(&self, id: &NodeId) -> Option<ItemView> {
        let tree = self.tree.as_ref()?;
        if let Some(ghost) = self.ghost.as_ref()
            && ghost.matches(id.as_str())
        {
            return ghost.anchor().and_then(|anchor| self.view(anchor));
        }
        let parent = tree.item(id)?.parent()?;
        self.view(parent)
    }

    pub fn sequent_of(&self, id: &NodeId) -> Option<&Sequent> {
        if let Some(ghost) = self.ghost.as_ref()
            && ghost.matches(id.as_str())
        {
            return ghost.sequent();
        }
        self.tree.as_ref()?.item(id)?.sequent()
    }

    /// The node to reveal for `id`: the node itself, or the ghost's anchor when the id is
    /// unknown and the ghost is active.
    pub fn resolve_focus(&self, id: &NodeId) -> Option<NodeRef> {
        let tree = self.tree.as_ref()?;
        if let Some(item) = tree.item(id) {
            return Some(NodeRef::new(item.id().clone(), item.name()));
        }
        let ghost = self.ghost.as_ref().filter(|ghost| ghost.is_active())?;
        let anchor = tree.get(ghost.anchor()?)?;
        Some(NodeRef::new(anchor.id().clone(), anchor.name()))
    }

    /// Node to focus after a run. With no active node but an active ghost the proof
    /// frontier is open, so any run in progress is over.
    pub fn focus_active_node(&mut self) -> Option<NodeRef> {
        let tree = self.tree.as_ref()?;
        if let Some(item) = self.active.and_then(|key| tree.get(key)) {
            return Some(NodeRef::new(item.id().clone(), item.name()));
        }
        let ghost = self.ghost.as_ref().filter(|ghost| ghost.is_active())?;
        let focus = NodeRef::new(ghost.id().clone(), GHOST_NAME);
        self.stop_execution();
        Some(focus)
    }

    /// Collapses every complete node that has children, without descending into it.
    pub fn fold_proved_branches(&mut self) -> Vec<NodeId> {
        let Some(tree) = self.tree.as_mut() else {
            return Vec::new();
        };
        let mut folded = Vec::new();
        let mut stack = vec![tree.root()];
        while let Some(key) = stack.pop() {
            let Some(item) = tree.get(key) else {
                continue;
            };
            if item.status().complete && !item.children().is_empty() {
                folded.push(item.id().clone());
                tree.collapse(key);
                continue;
            }
            stack.extend(item.children().iter().rev().copied());
        }
        if !folded.is_empty() {
            tracing::debug!(folded = folded.len(), "folded proved branches");
            self.changed("did-fold-branches");
        }
        folded
    }

    pub fn collapse_node(&mut self, id: &NodeId) -> Result<Applied, ExplorerError> {
        let key = self.locate("collapseNode", id)?;
        let changed = self.tree_mut("collapseNode")?.collapse(key);
        Ok(self.expansion_result(changed))
    }

    pub fn expand_node(&mut self, id: &NodeId) -> Result<Applied, ExplorerError> {
        let key = self.locate("expandNode", id)?;
        let changed = self.tree_mut("expandNode")?.expand(key);
        Ok(self.expansion_result(changed))
    }

    fn expansion_result(&mut self, changed: bool) -> Applied {
        if changed {
            self.changed("did-change-expansion")
        } else {
            Applied::Unchanged
        }
    }

    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    pub fn sketchpad(&self) -> &[ProofNodeX] {
        &self.sketchpad
    }

    pub fn state(&self) -> ExplorerState {
        let active_node = self.active_node().map(|node| NodeRef::new(node.id, node.name));
        ExplorerState {
            loaded: self.tree.is_some(),
            proof_name: self.proof_name(),
            formula: self.formula.clone(),
            proof_status: self.proof_status(),
            initial_proof_status: self.initial_proof_status(),
            running: self.running,
            target: self.target.clone(),
            dirty: self.dirty,
            ghost_active: self.ghost_is_active(),
            active_node,
            node_count: self.tree.as_ref().map_or(0, |tree| tree.len()),
            sketchpad_len: self.sketchpad.len(),
            clipboard: self.clipboard.clone(),
        }
    }

    fn view(&self, key: NodeKey) -> Option<ItemView> {
        let tree = self.tree.as_ref()?;
        let item = tree.get(key)?;
        let parent = match item.parent() {
            Some(parent) => tree.get(parent).map(|p| p.id().clone()),
            None => Some(item.id().clone()),
        };
        Some(ItemView {
            id: item.id().clone(),
            name: item.name().to_string(),
            node_type: item.node_type(),
            branch: item.branch_id().to_string(),
            status: item.status(),
            collapsible: item.expansion() != Expansion::None,
            collapsed: item.expansion() == Expansion::Collapsed,
            parent,
        })
    }

    fn ghost_view(&self, anchor: Option<NodeKey>) -> Option<ItemView> {
        let tree = self.tree.as_ref()?;
        let ghost = self.ghost.as_ref()?;
        let node = ghost.to_node_x(tree);
        Some(ItemView {
            id: node.id,
            name: GHOST_NAME.to_string(),
            node_type: ProofNodeType::Ghost,
            branch: node.branch,
            status: StatusFlags {
                active: ghost.is_active(),
                ..StatusFlags::default()
            },
            collapsible: false,
            collapsed: false,
            parent: anchor
                .and_then(|key| tree.get(key))
                .map(|item| item.id().clone()),
        })
    }
}
