#![forbid(unsafe_code)]

//! Parent-linked, ordered proof tree stored in an arena and kept in sync with its node index.

mod index;
mod item;

pub use index::NodeIndex;
pub use item::{Expansion, NodeKey, NodeKind, ProofItem, RootInfo};

use crate::ids::{IdGenerator, NodeId};
use crate::naming::{branch_label, branch_sort_key, normalize_command};
use crate::node::{NodeStatus, ProofNode, ProofNodeType, ProofNodeX, ProofStatus, Sequent};
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct ProofTree {
    nodes: HashMap<NodeKey, ProofItem>,
    index: NodeIndex,
    root: NodeKey,
    next_key: u64,
    ids: IdGenerator,
}

impl ProofTree {
    pub fn new(
        root_id: NodeId,
        name: impl Into<String>,
        proof_status: ProofStatus,
        ids: IdGenerator,
    ) -> Self {
        let mut tree = Self {
            nodes: HashMap::new(),
            index: NodeIndex::default(),
            root: NodeKey(0),
            next_key: 0,
            ids,
        };
        let info = RootInfo {
            proof_status,
            initial_proof_status: proof_status,
        };
        let mut root = ProofItem::new(root_id, name.into(), String::new(), NodeKind::Root(info));
        root.expansion = Expansion::Expanded;
        tree.root = tree.alloc(root);
        tree
    }

    /// Builds a tree from a `ProofNodeX`. A root-typed value becomes the root (keeping its id);
    /// anything else is grafted under a fresh root named `formula`.
    pub fn from_proof_x(
        formula: &str,
        proof: &ProofNodeX,
        proof_status: ProofStatus,
        mut ids: IdGenerator,
    ) -> Self {
        if proof.node_type == ProofNodeType::Root {
            let name = if proof.name.trim().is_empty() {
                formula
            } else {
                proof.name.as_str()
            };
            let mut tree = Self::new(proof.id.clone(), name, proof_status, ids);
            let root = tree.root;
            tree.graft_x(root, proof);
            return tree;
        }
        let root_id = ids.fresh();
        let mut tree = Self::new(root_id, formula, proof_status, ids);
        let root = tree.root;
        tree.graft_x(root, proof);
        tree
    }

    /// Builds a tree from a stored `ProofNode`, assigning fresh ids to every node.
    pub fn from_proof_node(
        formula: &str,
        proof: Option<&ProofNode>,
        proof_status: ProofStatus,
        mut ids: IdGenerator,
    ) -> Self {
        let root_id = ids.fresh();
        let mut tree = Self::new(root_id, formula, proof_status, ids);
        if let Some(proof) = proof {
            let root = tree.root;
            tree.graft_node(root, proof);
        }
        tree
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn root_item(&self) -> &ProofItem {
        // The root is allocated in `new` and never removed.
        &self.nodes[&self.root]
    }

    pub fn root_info(&self) -> RootInfo {
        match self.root_item().kind {
            NodeKind::Root(info) => info,
            _ => RootInfo {
                proof_status: ProofStatus::Untried,
                initial_proof_status: ProofStatus::Untried,
            },
        }
    }

    pub fn get(&self, key: NodeKey) -> Option<&ProofItem> {
        self.nodes.get(&key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index(&self) -> &NodeIndex {
        &self.index
    }

    /// Cache first; a stale or missing entry falls back to a walk from the root.
    pub fn find(&self, id: &NodeId) -> Option<NodeKey> {
        if let Some(key) = self.index.get(id)
            && self.nodes.get(&key).is_some_and(|item| &item.id == id)
        {
            return Some(key);
        }
        self.walk()
            .into_iter()
            .find(|key| self.nodes.get(key).is_some_and(|item| &item.id == id))
    }

    /// Like `find`, but memoizes a walk hit in the index.
    pub fn resolve(&mut self, id: &NodeId) -> Option<NodeKey> {
        let key = self.find(id)?;
        if self.index.get(id) != Some(key) {
            self.index.insert(id.clone(), key);
        }
        Some(key)
    }

    pub fn item(&self, id: &NodeId) -> Option<&ProofItem> {
        self.find(id).and_then(|key| self.nodes.get(&key))
    }

    /// Index-only membership; `alloc` and `purge` keep the index exact.
    pub fn contains_id(&self, id: &NodeId) -> bool {
        self.index
            .get(id)
            .is_some_and(|key| self.nodes.get(&key).is_some_and(|item| &item.id == id))
    }

    pub fn rebuild_index(&mut self) {
        self.index.clear();
        for key in self.walk() {
            if let Some(item) = self.nodes.get(&key) {
                self.index.insert(item.id.clone(), key);
            }
        }
    }

    /// Pre-order keys of the whole tree.
    pub fn walk(&self) -> Vec<NodeKey> {
        self.subtree_keys(self.root)
    }

    /// Pre-order keys of `key` and its descendants.
    pub fn subtree_keys(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack = vec![key];
        while let Some(next) = stack.pop() {
            let Some(item) = self.nodes.get(&next) else {
                continue;
            };
            out.push(next);
            stack.extend(item.children.iter().rev().copied());
        }
        out
    }

    /// An id not present in the tree.
    pub fn fresh_id(&mut self) -> NodeId {
        loop {
            let id = self.ids.fresh();
            if !self.contains_id(&id) {
                return id;
            }
        }
    }

    /// Appends `elem` under `parent`. Root-typed values contribute their children instead.
    /// Elements whose id is already in the tree are skipped.
    pub fn graft_x(&mut self, parent: NodeKey, elem: &ProofNodeX) -> Vec<NodeKey> {
        let at = self.nodes.get(&parent).map_or(0, |item| item.children.len());
        self.insert_x(parent, at, std::slice::from_ref(elem))
    }

    /// Splices `elems` into `parent.children` at `position` (clamped), then re-sorts.
    pub fn insert_x(
        &mut self,
        parent: NodeKey,
        position: usize,
        elems: &[ProofNodeX],
    ) -> Vec<NodeKey> {
        if !self.nodes.contains_key(&parent) {
            return Vec::new();
        }
        let mut added = Vec::new();
        for elem in elems {
            added.extend(self.build_x(parent, elem));
        }
        self.attach(parent, position, &added);
        added
    }

    pub fn graft_node(&mut self, parent: NodeKey, elem: &ProofNode) -> Vec<NodeKey> {
        if !self.nodes.contains_key(&parent) {
            return Vec::new();
        }
        let added = self.build_node(parent, elem);
        let at = self.nodes.get(&parent).map_or(0, |item| item.children.len());
        self.attach(parent, at, &added);
        added
    }

    fn build_x(&mut self, parent: NodeKey, elem: &ProofNodeX) -> Vec<NodeKey> {
        let kind = match elem.node_type {
            ProofNodeType::Root => {
                let mut out = Vec::new();
                for rule in &elem.rules {
                    out.extend(self.build_x(parent, rule));
                }
                return out;
            }
            ProofNodeType::Ghost => return Vec::new(),
            ProofNodeType::ProofBranch => NodeKind::Branch,
            ProofNodeType::ProofCommand => NodeKind::Command,
        };
        if self.contains_id(&elem.id) {
            return Vec::new();
        }
        let key = self.alloc_child(parent, elem.id.clone(), &elem.name, &elem.branch, kind);
        let mut children = Vec::new();
        for rule in &elem.rules {
            children.extend(self.build_x(key, rule));
        }
        self.attach(key, 0, &children);
        vec![key]
    }

    fn build_node(&mut self, parent: NodeKey, elem: &ProofNode) -> Vec<NodeKey> {
        let kind = match elem.node_type {
            ProofNodeType::Root => {
                let mut out = Vec::new();
                for rule in &elem.rules {
                    out.extend(self.build_node(parent, rule));
                }
                return out;
            }
            ProofNodeType::Ghost => return Vec::new(),
            ProofNodeType::ProofBranch => NodeKind::Branch,
            ProofNodeType::ProofCommand => NodeKind::Command,
        };
        let id = self.fresh_id();
        let key = self.alloc_child(parent, id, &elem.name, &elem.branch, kind);
        let mut children = Vec::new();
        for rule in &elem.rules {
            children.extend(self.build_node(key, rule));
        }
        self.attach(key, 0, &children);
        vec![key]
    }

    fn alloc_child(
        &mut self,
        parent: NodeKey,
        id: NodeId,
        name: &str,
        branch: &str,
        kind: NodeKind,
    ) -> NodeKey {
        let inherited = || {
            self.nodes
                .get(&parent)
                .map(|item| item.branch_id.clone())
                .unwrap_or_default()
        };
        let (name, branch_id) = match kind {
            NodeKind::Branch => {
                let branch_id = if branch.trim().is_empty() {
                    name.trim()
                        .trim_start_matches('(')
                        .trim_end_matches(')')
                        .to_string()
                } else {
                    branch.trim().to_string()
                };
                (branch_label(&branch_id), branch_id)
            }
            _ => {
                let branch_id = if branch.trim().is_empty() {
                    inherited()
                } else {
                    branch.trim().to_string()
                };
                (normalize_command(name), branch_id)
            }
        };
        let mut item = ProofItem::new(id, name, branch_id, kind);
        item.parent = Some(parent);
        self.alloc(item)
    }

    fn alloc(&mut self, item: ProofItem) -> NodeKey {
        let key = NodeKey(self.next_key);
        self.next_key += 1;
        self.index.insert(item.id.clone(), key);
        self.nodes.insert(key, item);
        key
    }

    fn attach(&mut self, parent: NodeKey, position: usize, added: &[NodeKey]) {
        if added.is_empty() {
            return;
        }
        let Some(item) = self.nodes.get_mut(&parent) else {
            return;
        };
        let at = position.min(item.children.len());
        item.children.splice(at..at, added.iter().copied());
        if item.expansion == Expansion::None {
            item.expansion = Expansion::Expanded;
        }
        for child in added {
            if let Some(child) = self.nodes.get_mut(child) {
                child.parent = Some(parent);
            }
        }
        self.sort_children(parent);
    }

    /// Stable sort by the numeric last component of each child's branch address.
    fn sort_children(&mut self, parent: NodeKey) {
        let Some(children) = self.nodes.get(&parent).map(|item| item.children.clone()) else {
            return;
        };
        let mut keyed: Vec<(u64, NodeKey)> = children
            .into_iter()
            .map(|key| {
                let order = self
                    .nodes
                    .get(&key)
                    .map_or(0, |child| branch_sort_key(&child.branch_id));
                (order, key)
            })
            .collect();
        keyed.sort_by_key(|(order, _)| *order);
        if let Some(item) = self.nodes.get_mut(&parent) {
            item.children = keyed.into_iter().map(|(_, key)| key).collect();
        }
    }

    /// Detaches `key` from its parent and purges its subtree. Returns the removed structure.
    /// The root cannot be removed this way; see `clear_children`.
    pub fn remove(&mut self, key: NodeKey) -> Option<ProofNodeX> {
        let item = self.nodes.get(&key)?;
        let parent = item.parent?;
        let removed = self.node_x_structure(key)?;
        let root = self.root;
        if let Some(parent_item) = self.nodes.get_mut(&parent) {
            parent_item.children.retain(|child| *child != key);
            if parent != root && parent_item.children.is_empty() {
                parent_item.expansion = Expansion::None;
            }
        }
        self.purge(key);
        Some(removed)
    }

    pub fn clear_children(&mut self, key: NodeKey) -> Vec<ProofNodeX> {
        self.trim_tail(key, 0)
    }

    /// Removes `children[from..]` of `key`.
    pub fn trim_tail(&mut self, key: NodeKey, from: usize) -> Vec<ProofNodeX> {
        let Some(children) = self.nodes.get(&key).map(|item| item.children.clone()) else {
            return Vec::new();
        };
        children
            .into_iter()
            .skip(from)
            .filter_map(|child| self.remove(child))
            .collect()
    }

    fn purge(&mut self, key: NodeKey) {
        for doomed in self.subtree_keys(key) {
            if let Some(item) = self.nodes.remove(&doomed)
                && self.index.get(&item.id) == Some(doomed)
            {
                self.index.remove(&item.id);
            }
        }
    }

    pub fn rename(&mut self, key: NodeKey, name: &str) -> bool {
        let Some(item) = self.nodes.get_mut(&key) else {
            return false;
        };
        item.name = match item.kind {
            NodeKind::Command => normalize_command(name),
            _ => name.trim().to_string(),
        };
        true
    }

    /// Applies a status transition. On the root `visited` is ignored and `pending`
    /// promotes an untried proof to unfinished.
    pub fn update_status(&mut self, key: NodeKey, status: NodeStatus) -> bool {
        let Some(ProofItem {
            kind, status: flags, ..
        }) = self.nodes.get_mut(&key)
        else {
            return false;
        };
        if let NodeKind::Root(info) = kind {
            match status {
                NodeStatus::Visited => return false,
                NodeStatus::Pending if info.proof_status == ProofStatus::Untried => {
                    info.proof_status = ProofStatus::Unfinished;
                }
                _ => {}
            }
        }
        flags.apply(status);
        true
    }

    /// Marks the proof as proved; the only path by which the root becomes visited.
    pub fn qed(&mut self) {
        let root = self.root;
        if let Some(item) = self.nodes.get_mut(&root) {
            item.status.set_visited();
            if let NodeKind::Root(info) = &mut item.kind {
                info.proof_status = ProofStatus::Proved;
            }
        }
    }

    pub fn set_proof_status(&mut self, status: ProofStatus) {
        let root = self.root;
        if let Some(ProofItem {
            kind: NodeKind::Root(info),
            ..
        }) = self.nodes.get_mut(&root)
        {
            info.proof_status = status;
        }
    }

    pub fn set_sequent(&mut self, key: NodeKey, sequent: Option<Sequent>) -> bool {
        let Some(item) = self.nodes.get_mut(&key) else {
            return false;
        };
        item.sequent = sequent;
        true
    }

    pub(crate) fn clear_active(&mut self, key: NodeKey) {
        if let Some(item) = self.nodes.get_mut(&key) {
            item.status.active = false;
        }
    }

    pub fn collapse(&mut self, key: NodeKey) -> bool {
        self.set_expansion(key, Expansion::Collapsed)
    }

    pub fn expand(&mut self, key: NodeKey) -> bool {
        self.set_expansion(key, Expansion::Expanded)
    }

    fn set_expansion(&mut self, key: NodeKey, expansion: Expansion) -> bool {
        let Some(item) = self.nodes.get_mut(&key) else {
            return false;
        };
        if item.expansion == Expansion::None || item.expansion == expansion {
            return false;
        }
        item.expansion = expansion;
        true
    }

    /// Pre-order flattening of `key` and its descendants.
    pub fn proof_commands(&self, key: NodeKey) -> Vec<&ProofItem> {
        self.subtree_keys(key)
            .into_iter()
            .filter_map(|key| self.nodes.get(&key))
            .collect()
    }

    /// The command script under `key`: command names concatenated in pre-order.
    pub fn print_proof_commands(&self, key: NodeKey) -> String {
        self.proof_commands(key)
            .into_iter()
            .filter(|item| matches!(item.kind, NodeKind::Command))
            .map(|item| item.name.as_str())
            .collect()
    }

    pub fn node_structure(&self, key: NodeKey) -> Option<ProofNode> {
        let item = self.nodes.get(&key)?;
        Some(ProofNode {
            branch: item.branch_id.clone(),
            name: item.name.clone(),
            node_type: item.node_type(),
            rules: item
                .children
                .iter()
                .filter_map(|child| self.node_structure(*child))
                .collect(),
        })
    }

    /// Serialized subtree with ids. The root reports itself as its parent.
    pub fn node_x_structure(&self, key: NodeKey) -> Option<ProofNodeX> {
        let item = self.nodes.get(&key)?;
        let parent = match item.parent {
            Some(parent) => self.nodes.get(&parent).map(|p| p.id.clone()),
            None => Some(item.id.clone()),
        };
        Some(ProofNodeX {
            id: item.id.clone(),
            branch: item.branch_id.clone(),
            name: item.name.clone(),
            node_type: item.node_type(),
            rules: item
                .children
                .iter()
                .filter_map(|child| self.node_x_structure(*child))
                .collect(),
            parent,
        })
    }
}

#[cfg(test)]
mod tests;
