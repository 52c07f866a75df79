#![forbid(unsafe_code)]

//! Read-only, renderer-facing view of the tree.

use crate::ghost::{GHOST_LABEL, GhostNode};
use crate::ids::NodeId;
use crate::node::ProofNodeType;
use crate::status::StatusFlags;
use crate::tree::{NodeKey, NodeKind, ProofItem, ProofTree};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStructure {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: ProofNodeType,
    pub status: StatusFlags,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeStructure>,
}

impl TreeStructure {
    /// Number of entries in this structure, including the ghost.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeStructure::count).sum::<usize>()
    }
}

/// Snapshot of the whole tree. Sequential commands are nested: every child after the first
/// that is not a branch hangs under the previously placed child, so a proof reads as a path.
pub fn tree_structure(tree: &ProofTree, ghost: Option<&GhostNode>) -> TreeStructure {
    structure_of(tree, ghost, tree.root(), tree.root_item())
}

fn structure_of(
    tree: &ProofTree,
    ghost: Option<&GhostNode>,
    key: NodeKey,
    item: &ProofItem,
) -> TreeStructure {
    let mut out = TreeStructure {
        id: item.id().clone(),
        name: item.name().to_string(),
        node_type: item.node_type(),
        status: item.status(),
        children: Vec::new(),
    };
    let children = item
        .children()
        .iter()
        .filter_map(|child| tree.get(*child).map(|c| (*child, c)));
    let mut cursor: Vec<usize> = Vec::new();
    for (i, (child_key, child)) in children.enumerate() {
        if i > 0 && !matches!(child.kind(), NodeKind::Branch) {
            let last = node_at(&out, &cursor).children.len().saturating_sub(1);
            cursor.push(last);
        }
        let entry = structure_of(tree, ghost, child_key, child);
        node_at_mut(&mut out, &cursor).children.push(entry);
    }
    if let Some(ghost) = ghost
        && ghost.is_active()
        && ghost.anchor() == Some(key)
    {
        node_at_mut(&mut out, &cursor).children.push(TreeStructure {
            id: ghost.id().clone(),
            name: GHOST_LABEL.to_string(),
            node_type: ProofNodeType::Ghost,
            status: StatusFlags {
                active: true,
                ..StatusFlags::default()
            },
            children: Vec::new(),
        });
    }
    out
}

fn node_at<'a>(root: &'a TreeStructure, path: &[usize]) -> &'a TreeStructure {
    path.iter()
        .fold(root, |node, &i| node.children.get(i).unwrap_or(node))
}

fn node_at_mut<'a>(root: &'a mut TreeStructure, path: &[usize]) -> &'a mut TreeStructure {
    let mut node = root;
    for &i in path {
        if i >= node.children.len() {
            break;
        }
        node = &mut node.children[i];
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdGenerator;
    use crate::node::{ProofNodeX, ProofStatus};

    fn x(id: &str, name: &str, node_type: ProofNodeType, rules: Vec<ProofNodeX>) -> ProofNodeX {
        ProofNodeX {
            id: NodeId::try_new(id).unwrap(),
            branch: String::new(),
            name: name.to_string(),
            node_type,
            rules,
            parent: None,
        }
    }

    #[test]
    fn sequential_commands_nest_and_branches_fan_out() {
        let proof = x(
            "r",
            "foo1",
            ProofNodeType::Root,
            vec![
                x("s", "(skosimp*)", ProofNodeType::ProofCommand, vec![]),
                x("a", "(assert)", ProofNodeType::ProofCommand, vec![]),
                x(
                    "c",
                    "(case)",
                    ProofNodeType::ProofCommand,
                    vec![
                        ProofNodeX {
                            branch: "1".into(),
                            ..x("b1", "(1)", ProofNodeType::ProofBranch, vec![])
                        },
                        ProofNodeX {
                            branch: "2".into(),
                            ..x("b2", "(2)", ProofNodeType::ProofBranch, vec![])
                        },
                    ],
                ),
            ],
        );
        let tree =
            ProofTree::from_proof_x("foo1", &proof, ProofStatus::Untried, IdGenerator::new("t"));
        let snap = tree_structure(&tree, None);
        assert_eq!(snap.children.len(), 1);
        let skosimp = &snap.children[0];
        assert_eq!(skosimp.name, "(skosimp*)");
        let assert = &skosimp.children[0];
        let case = &assert.children[0];
        assert_eq!(case.name, "(case)");
        assert_eq!(case.children.len(), 2);
        assert_eq!(snap.count(), tree.len());
    }

    #[test]
    fn active_ghost_is_placed_at_the_cursor() {
        let proof = x(
            "r",
            "foo1",
            ProofNodeType::Root,
            vec![
                x("a", "(assert)", ProofNodeType::ProofCommand, vec![]),
                x("g", "(grind)", ProofNodeType::ProofCommand, vec![]),
            ],
        );
        let tree =
            ProofTree::from_proof_x("foo1", &proof, ProofStatus::Untried, IdGenerator::new("t"));
        let mut ghost = GhostNode::new(NodeId::try_new("ghost-1").unwrap(), tree.root());
        ghost.activate(tree.root());
        let snap = tree_structure(&tree, Some(&ghost));
        let grind = &snap.children[0].children[0];
        assert_eq!(grind.name, "(grind)");
        assert_eq!(grind.children[0].name, GHOST_LABEL);
        assert!(grind.children[0].status.active);
    }
}
