#![forbid(unsafe_code)]

//! Interchange types shared with the prover, persistence and rendering layers.

use crate::ids::NodeId;
use serde::{Deserialize, Serialize};

/// Opaque prover state captured before a step. Stored and returned, never inspected.
pub type Sequent = serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProofNodeType {
    Root,
    ProofBranch,
    ProofCommand,
    Ghost,
}

impl ProofNodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::ProofBranch => "proof-branch",
            Self::ProofCommand => "proof-command",
            Self::Ghost => "ghost",
        }
    }
}

/// Serialized proof step without ids. `rules` is the ordered children list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNode {
    pub branch: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: ProofNodeType,
    #[serde(default)]
    pub rules: Vec<ProofNode>,
}

/// Serialized proof step carrying external ids and the parent id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNodeX {
    pub id: NodeId,
    #[serde(default)]
    pub branch: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: ProofNodeType,
    #[serde(default)]
    pub rules: Vec<ProofNodeX>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
}

impl ProofNodeX {
    /// Ids of this node and every descendant, pre-order.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut out = vec![self.id.clone()];
        for rule in &self.rules {
            out.extend(rule.ids());
        }
        out
    }

    pub fn branch_count(&self) -> usize {
        self.rules
            .iter()
            .filter(|rule| rule.node_type == ProofNodeType::ProofBranch)
            .count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeStatus {
    Active,
    Visited,
    NotVisited,
    Pending,
    Complete,
    NotComplete,
}

impl NodeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Visited => "visited",
            Self::NotVisited => "not-visited",
            Self::Pending => "pending",
            Self::Complete => "complete",
            Self::NotComplete => "not-complete",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofStatus {
    #[default]
    Untried,
    Unfinished,
    Unchecked,
    Unproved,
    Proved,
    Subsumed,
    Simplified,
}

impl ProofStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Untried => "untried",
            Self::Unfinished => "unfinished",
            Self::Unchecked => "unchecked",
            Self::Unproved => "unproved",
            Self::Proved => "proved",
            Self::Subsumed => "subsumed",
            Self::Simplified => "simplified",
        }
    }
}

/// `{ id, name }` pair naming the node an edit or run request refers to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
}

impl NodeRef {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The formula a proof belongs to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theory_name: Option<String>,
    pub formula_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofInfo {
    pub formula: String,
    #[serde(default)]
    pub status: ProofStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// A stored proof: metadata plus the recorded proof tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofDescriptor {
    pub info: ProofInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_tree: Option<ProofNode>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn proof_node_x_uses_wire_names() {
        let raw = json!({
            "id": "r",
            "branch": "",
            "name": "foo1",
            "type": "root",
            "rules": [
                { "id": "c1", "branch": "", "name": "(grind)", "type": "proof-command", "rules": [], "parent": "r" }
            ],
            "parent": "r"
        });
        let node: ProofNodeX = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(node.node_type, ProofNodeType::Root);
        assert_eq!(node.rules[0].node_type, ProofNodeType::ProofCommand);
        assert_eq!(serde_json::to_value(&node).unwrap(), raw);
        assert_eq!(node.ids().len(), 2);
    }

    #[test]
    fn statuses_parse_from_kebab_case() {
        let status: NodeStatus = serde_json::from_value(json!("not-visited")).unwrap();
        assert_eq!(status, NodeStatus::NotVisited);
        let proof: ProofStatus = serde_json::from_value(json!("unfinished")).unwrap();
        assert_eq!(proof.as_str(), "unfinished");
    }

    #[test]
    fn descriptor_defaults_missing_status_to_untried() {
        let desc: ProofDescriptor =
            serde_json::from_value(json!({ "info": { "formula": "foo1" } })).unwrap();
        assert_eq!(desc.info.status, ProofStatus::Untried);
        assert!(desc.proof_tree.is_none());
    }
}
