#![forbid(unsafe_code)]

use crate::ids::NodeId;
use crate::node::{ProofNodeType, ProofStatus, Sequent};
use crate::status::StatusFlags;

/// Arena key of a tree node. Keys are never reused within a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub(crate) u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RootInfo {
    pub proof_status: ProofStatus,
    pub initial_proof_status: ProofStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Root(RootInfo),
    Branch,
    Command,
}

impl NodeKind {
    pub fn node_type(&self) -> ProofNodeType {
        match self {
            Self::Root(_) => ProofNodeType::Root,
            Self::Branch => ProofNodeType::ProofBranch,
            Self::Command => ProofNodeType::ProofCommand,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Expansion {
    /// Leaf: nothing to expand.
    #[default]
    None,
    Expanded,
    Collapsed,
}

#[derive(Clone, Debug)]
pub struct ProofItem {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) branch_id: String,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) status: StatusFlags,
    pub(crate) expansion: Expansion,
    pub(crate) sequent: Option<Sequent>,
}

impl ProofItem {
    pub(crate) fn new(id: NodeId, name: String, branch_id: String, kind: NodeKind) -> Self {
        Self {
            id,
            name,
            branch_id,
            kind,
            parent: None,
            children: Vec::new(),
            status: StatusFlags::default(),
            expansion: Expansion::None,
            sequent: None,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn branch_id(&self) -> &str {
        &self.branch_id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn node_type(&self) -> ProofNodeType {
        self.kind.node_type()
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root(_))
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub fn status(&self) -> StatusFlags {
        self.status
    }

    pub fn expansion(&self) -> Expansion {
        self.expansion
    }

    pub fn sequent(&self) -> Option<&Sequent> {
        self.sequent.as_ref()
    }

    pub fn root_info(&self) -> Option<&RootInfo> {
        match &self.kind {
            NodeKind::Root(info) => Some(info),
            _ => None,
        }
    }
}
