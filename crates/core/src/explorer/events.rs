#![forbid(unsafe_code)]

//! Inbound notifications from the prover and the handlers that apply them.

use super::{ProofExplorer, logged};
use crate::error::{Applied, ExplorerError};
use crate::ids::NodeId;
use crate::node::{NodeRef, NodeStatus, ProofNodeX, ProofStatus, Sequent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditAction {
    AppendNode,
    AppendBranch,
    DeleteNode,
    DeleteTree,
    TrimNode,
    TrimUnused,
    CutNode,
    CutTree,
    CopyNode,
    CopyTree,
    PasteNode,
    PasteTree,
    RenameNode,
    SliceTree,
    ActivateCursor,
    DeactivateCursor,
    UpdateProofStatus,
    UpdateDirtyFlag,
}

impl EditAction {
    pub const ALL: &'static [EditAction] = &[
        Self::AppendNode,
        Self::AppendBranch,
        Self::DeleteNode,
        Self::DeleteTree,
        Self::TrimNode,
        Self::TrimUnused,
        Self::CutNode,
        Self::CutTree,
        Self::CopyNode,
        Self::CopyTree,
        Self::PasteNode,
        Self::PasteTree,
        Self::RenameNode,
        Self::SliceTree,
        Self::ActivateCursor,
        Self::DeactivateCursor,
        Self::UpdateProofStatus,
        Self::UpdateDirtyFlag,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AppendNode => "append-node",
            Self::AppendBranch => "append-branch",
            Self::DeleteNode => "delete-node",
            Self::DeleteTree => "delete-tree",
            Self::TrimNode => "trim-node",
            Self::TrimUnused => "trim-unused",
            Self::CutNode => "cut-node",
            Self::CutTree => "cut-tree",
            Self::CopyNode => "copy-node",
            Self::CopyTree => "copy-tree",
            Self::PasteNode => "paste-node",
            Self::PasteTree => "paste-tree",
            Self::RenameNode => "rename-node",
            Self::SliceTree => "slice-tree",
            Self::ActivateCursor => "activate-cursor",
            Self::DeactivateCursor => "deactivate-cursor",
            Self::UpdateProofStatus => "update-proof-status",
            Self::UpdateDirtyFlag => "update-dirty-flag",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == value)
    }

    /// Confirmation method suffix on the wire, e.g. `didAppendNode`.
    pub fn confirmation_name(self) -> String {
        let mut out = String::from("did");
        for part in self.as_str().split('-') {
            let mut chars = part.chars();
            if let Some(first) = chars.next() {
                out.push(first.to_ascii_uppercase());
                out.push_str(chars.as_str());
            }
        }
        out
    }

    pub fn from_confirmation_name(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|action| action.confirmation_name() == value)
    }

    pub(crate) fn needs_selection(self) -> bool {
        !matches!(
            self,
            Self::DeactivateCursor | Self::UpdateProofStatus | Self::UpdateDirtyFlag
        )
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StatusUpdate {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    pub status: NodeStatus,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SequentUpdate {
    pub selected: NodeRef,
    #[serde(default)]
    pub sequent: Sequent,
}

/// The prover ran `elem` at child slot `position` under `parent`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StepResult {
    pub parent: NodeId,
    #[serde(default)]
    pub position: Option<usize>,
    pub elem: ProofNodeX,
    #[serde(default)]
    pub goals: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AppendDescriptor {
    #[serde(default)]
    pub selected: Option<NodeRef>,
    #[serde(default)]
    pub elem: Option<ProofNodeX>,
    #[serde(default)]
    pub position: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SelectedDescriptor {
    pub selected: NodeRef,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RemovedDescriptor {
    #[serde(default)]
    pub selected: Option<NodeRef>,
    #[serde(default)]
    pub elems: Vec<ProofNodeX>,
    #[serde(default)]
    pub clipboard: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CutNodeDescriptor {
    pub selected: NodeRef,
    pub elem: ProofNodeX,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CopyDescriptor {
    pub selected: NodeRef,
    #[serde(default)]
    pub clipboard: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameDescriptor {
    pub selected: NodeRef,
    pub new_name: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Cursor {
    #[serde(default)]
    pub id: Option<NodeId>,
    pub parent: NodeId,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CursorDescriptor {
    pub cursor: Cursor,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofStatusDescriptor {
    pub proof_status: ProofStatus,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DirtyFlagDescriptor {
    pub flag: bool,
}

/// A prover-confirmed edit. The tree only changes when one of these arrives.
#[derive(Clone, Debug, PartialEq)]
pub enum EditConfirmation {
    AppendNode(AppendDescriptor),
    AppendBranch(AppendDescriptor),
    DeleteNode(SelectedDescriptor),
    DeleteTree(SelectedDescriptor),
    TrimNode(RemovedDescriptor),
    TrimUnused(RemovedDescriptor),
    CutNode(CutNodeDescriptor),
    CutTree(RemovedDescriptor),
    CopyNode(CopyDescriptor),
    CopyTree(CopyDescriptor),
    PasteNode(AppendDescriptor),
    PasteTree(AppendDescriptor),
    RenameNode(RenameDescriptor),
    SliceTree(RemovedDescriptor),
    ActivateCursor(CursorDescriptor),
    DeactivateCursor,
    UpdateProofStatus(ProofStatusDescriptor),
    UpdateDirtyFlag(DirtyFlagDescriptor),
}

impl EditConfirmation {
    /// Decodes the descriptor of `action` from its JSON payload.
    pub fn parse(action: EditAction, params: Value) -> Result<Self, ExplorerError> {
        fn decode<T: serde::de::DeserializeOwned>(
            action: EditAction,
            params: Value,
        ) -> Result<T, ExplorerError> {
            serde_json::from_value(params).map_err(|err| {
                logged(ExplorerError::malformed(action.as_str(), err.to_string()))
            })
        }
        Ok(match action {
            EditAction::AppendNode => Self::AppendNode(decode(action, params)?),
            EditAction::AppendBranch => Self::AppendBranch(decode(action, params)?),
            EditAction::DeleteNode => Self::DeleteNode(decode(action, params)?),
            EditAction::DeleteTree => Self::DeleteTree(decode(action, params)?),
            EditAction::TrimNode => Self::TrimNode(decode(action, params)?),
            EditAction::TrimUnused => Self::TrimUnused(decode(action, params)?),
            EditAction::CutNode => Self::CutNode(decode(action, params)?),
            EditAction::CutTree => Self::CutTree(decode(action, params)?),
            EditAction::CopyNode => Self::CopyNode(decode(action, params)?),
            EditAction::CopyTree => Self::CopyTree(decode(action, params)?),
            EditAction::PasteNode => Self::PasteNode(decode(action, params)?),
            EditAction::PasteTree => Self::PasteTree(decode(action, params)?),
            EditAction::RenameNode => Self::RenameNode(decode(action, params)?),
            EditAction::SliceTree => Self::SliceTree(decode(action, params)?),
            EditAction::ActivateCursor => Self::ActivateCursor(decode(action, params)?),
            EditAction::DeactivateCursor => Self::DeactivateCursor,
            EditAction::UpdateProofStatus => Self::UpdateProofStatus(decode(action, params)?),
            EditAction::UpdateDirtyFlag => Self::UpdateDirtyFlag(decode(action, params)?),
        })
    }

    pub fn action(&self) -> EditAction {
        match self {
            Self::AppendNode(_) => EditAction::AppendNode,
            Self::AppendBranch(_) => EditAction::AppendBranch,
            Self::DeleteNode(_) => EditAction::DeleteNode,
            Self::DeleteTree(_) => EditAction::DeleteTree,
            Self::TrimNode(_) => EditAction::TrimNode,
            Self::TrimUnused(_) => EditAction::TrimUnused,
            Self::CutNode(_) => EditAction::CutNode,
            Self::CutTree(_) => EditAction::CutTree,
            Self::CopyNode(_) => EditAction::CopyNode,
            Self::CopyTree(_) => EditAction::CopyTree,
            Self::PasteNode(_) => EditAction::PasteNode,
            Self::PasteTree(_) => EditAction::PasteTree,
            Self::RenameNode(_) => EditAction::RenameNode,
            Self::SliceTree(_) => EditAction::SliceTree,
            Self::ActivateCursor(_) => EditAction::ActivateCursor,
            Self::DeactivateCursor => EditAction::DeactivateCursor,
            Self::UpdateProofStatus(_) => EditAction::UpdateProofStatus,
            Self::UpdateDirtyFlag(_) => EditAction::UpdateDirtyFlag,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExplorerEvent {
    NodeStatus(StatusUpdate),
    SequentUpdated(SequentUpdate),
    SequentLoaded(Sequent),
    ProofStarted,
    StoppedRunning,
    StepExecuted(StepResult),
    Edit(EditConfirmation),
}

impl ProofExplorer {
    /// Applies one inbound notification. Errors are informational: the controller has
    /// already logged them and its state is unchanged.
    pub fn apply(&mut self, event: ExplorerEvent) -> Result<Applied, ExplorerError> {
        match event {
            ExplorerEvent::NodeStatus(update) => self.did_update_node_status(update),
            ExplorerEvent::SequentUpdated(update) => self.did_update_sequent(update),
            ExplorerEvent::SequentLoaded(sequent) => self.did_load_sequent(sequent),
            ExplorerEvent::ProofStarted => Ok(self.did_start_proof()),
            ExplorerEvent::StoppedRunning => Ok(self.did_stop_running()),
            ExplorerEvent::StepExecuted(step) => self.did_execute_step(step),
            ExplorerEvent::Edit(confirmation) => self.apply_edit(confirmation),
        }
    }

    fn did_update_node_status(&mut self, update: StatusUpdate) -> Result<Applied, ExplorerError> {
        const OP: &str = "didUpdateStatus";
        self.tree_ref(OP)?;
        if self
            .ghost
            .as_ref()
            .is_some_and(|ghost| ghost.matches(update.id.as_str()))
        {
            return Ok(self.did_update_ghost_status(update.status));
        }

        let key = self.locate(OP, &update.id)?;
        let Some(tree) = self.tree.as_mut() else {
            return Err(logged(ExplorerError::NoProofLoaded { op: OP }));
        };
        if update.status == NodeStatus::Active {
            if let Some(previous) = self.active
                && previous != key
            {
                tree.clear_active(previous);
            }
            tree.update_status(key, NodeStatus::Active);
            self.active = Some(key);
            if let Some(ghost) = self.ghost.as_mut()
                && ghost.is_active()
            {
                ghost.deactivate();
            }
            let reached = self
                .target
                .as_ref()
                .and_then(|target| target.target.as_ref())
                .is_some_and(|target| target.id == update.id);
            if reached {
                tracing::debug!(id = %update.id, "run target reached");
                self.stop_execution();
            }
        } else {
            tree.update_status(key, update.status);
            let still_active = tree.get(key).is_some_and(|item| item.status().active);
            if self.active == Some(key) && !still_active {
                self.active = None;
            }
        }
        Ok(self.changed("did-update-node-status"))
    }

    fn did_update_ghost_status(&mut self, status: NodeStatus) -> Applied {
        match status {
            NodeStatus::NotVisited => {
                if let Some(ghost) = self.ghost.as_mut() {
                    ghost.not_visited();
                }
            }
            NodeStatus::Active => match self.ghost.as_ref().and_then(|ghost| ghost.anchor()) {
                Some(anchor) => self.activate_ghost(anchor),
                None => return Applied::Unchanged,
            },
            _ => return Applied::Unchanged,
        }
        self.changed("did-update-node-status")
    }

    fn did_update_sequent(&mut self, update: SequentUpdate) -> Result<Applied, ExplorerError> {
        const OP: &str = "didUpdateSequent";
        self.tree_ref(OP)?;
        if let Some(ghost) = self.ghost.as_mut()
            && (update.selected.name == crate::ghost::GHOST_NAME
                || ghost.matches(update.selected.id.as_str()))
        {
            ghost.set_sequent(Some(update.sequent));
            return Ok(self.changed("did-update-tooltip"));
        }
        let key = self.locate(OP, &update.selected.id)?;
        self.tree_mut(OP)?.set_sequent(key, Some(update.sequent));
        Ok(self.changed("did-update-tooltip"))
    }

    /// Attaches the initial sequent to the active node, or to the root when none is active.
    pub fn did_load_sequent(&mut self, sequent: Sequent) -> Result<Applied, ExplorerError> {
        const OP: &str = "didLoadSequent";
        let active = self.active;
        let tree = self.tree_mut(OP)?;
        let key = active.unwrap_or_else(|| tree.root());
        tree.set_sequent(key, Some(sequent));
        Ok(Applied::Changed)
    }

    /// Clears `running` and rebuilds the node index.
    pub fn did_start_proof(&mut self) -> Applied {
        self.running = false;
        self.target = None;
        if let Some(tree) = self.tree.as_mut() {
            tree.rebuild_index();
        }
        tracing::info!(proof = %self.proof_name(), "proof started");
        self.changed("did-start-proof")
    }

    pub fn did_stop_running(&mut self) -> Applied {
        if !self.running && self.target.is_none() {
            return Applied::Unchanged;
        }
        self.stop_execution();
        Applied::Changed
    }
}
