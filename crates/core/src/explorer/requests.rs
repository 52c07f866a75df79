#![forbid(unsafe_code)]

//! Outbound traffic: prover requests issued by user actions, and the controller outbox.

use super::events::EditAction;
use super::{ProofExplorer, logged};
use crate::error::{Applied, ExplorerError};
use crate::node::NodeRef;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecAction {
    Run,
    FastForward,
    Rewind,
    Forward,
    Back,
    InterruptProver,
    QuitProof,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProverAction {
    Exec(ExecAction),
    Edit(EditAction),
}

/// Request sent to the prover. The tree is not touched until the prover confirms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProverRequest {
    pub action: ProverAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<NodeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ProverRequest {
    pub fn exec(action: ExecAction, selected: Option<NodeRef>) -> Self {
        Self {
            action: ProverAction::Exec(action),
            selected,
            new_name: None,
            name: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExplorerOutput {
    Request(ProverRequest),
    TreeChanged { source: &'static str },
    DidStopExecution,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    Run,
    FastForward,
    Rewind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunTarget {
    pub mode: RunMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<NodeRef>,
}

impl ProofExplorer {
    /// Replays the whole proof from the current position.
    pub fn run(&mut self) -> Result<Applied, ExplorerError> {
        self.tree_ref("run")?;
        self.start_execution(RunMode::Run, None);
        self.request(ProverRequest::exec(ExecAction::Run, None));
        Ok(Applied::Unchanged)
    }

    pub fn fast_forward_to(&mut self, target: NodeRef) -> Result<Applied, ExplorerError> {
        self.seek("fast-forward", RunMode::FastForward, ExecAction::FastForward, target)
    }

    pub fn rewind_to(&mut self, target: NodeRef) -> Result<Applied, ExplorerError> {
        self.seek("rewind", RunMode::Rewind, ExecAction::Rewind, target)
    }

    fn seek(
        &mut self,
        op: &'static str,
        mode: RunMode,
        action: ExecAction,
        target: NodeRef,
    ) -> Result<Applied, ExplorerError> {
        self.tree_ref(op)?;
        tracing::debug!(op, id = %target.id, name = %target.name, "seeking");
        self.start_execution(mode, Some(target.clone()));
        self.request(ProverRequest::exec(action, Some(target)));
        Ok(Applied::Unchanged)
    }

    /// Stops a run immediately and asks the prover to interrupt. Nothing is rolled back.
    pub fn pause(&mut self) -> Applied {
        self.running = false;
        self.target = None;
        self.request(ProverRequest::exec(ExecAction::InterruptProver, None));
        Applied::Unchanged
    }

    pub fn forward(&mut self) -> Result<Applied, ExplorerError> {
        self.tree_ref("forward")?;
        self.request(ProverRequest::exec(ExecAction::Forward, None));
        Ok(Applied::Unchanged)
    }

    pub fn back(&mut self) -> Result<Applied, ExplorerError> {
        self.tree_ref("back")?;
        self.request(ProverRequest::exec(ExecAction::Back, None));
        Ok(Applied::Unchanged)
    }

    pub fn quit(&mut self) -> Applied {
        self.running = false;
        self.target = None;
        self.request(ProverRequest::exec(ExecAction::QuitProof, None));
        Applied::Unchanged
    }

    /// Forwards an edit request to the prover. `slice-tree` is refused locally when the
    /// selected node was already visited or is active.
    pub fn request_edit(
        &mut self,
        action: EditAction,
        selected: Option<NodeRef>,
        new_name: Option<String>,
        name: Option<String>,
    ) -> Result<Applied, ExplorerError> {
        let op = action.as_str();
        self.tree_ref(op)?;
        if action.needs_selection() && selected.is_none() {
            return Err(logged(ExplorerError::malformed(op, "missing selected node")));
        }
        if action == EditAction::RenameNode
            && new_name.as_deref().is_none_or(|name| name.trim().is_empty())
        {
            return Err(logged(ExplorerError::malformed(op, "missing new name")));
        }
        if action == EditAction::SliceTree
            && let Some(selected) = selected.as_ref()
        {
            let status = self
                .tree_ref(op)?
                .item(&selected.id)
                .map(|item| item.status())
                .ok_or_else(|| {
                    logged(ExplorerError::NotFound {
                        op,
                        id: selected.id.clone(),
                    })
                })?;
            if status.visited || status.active {
                return Err(logged(ExplorerError::Refused {
                    op,
                    reason: format!("{} was already executed", selected.name),
                }));
            }
        }
        tracing::debug!(op, "edit requested");
        self.request(ProverRequest {
            action: ProverAction::Edit(action),
            selected,
            new_name,
            name,
        });
        Ok(Applied::Unchanged)
    }

    fn start_execution(&mut self, mode: RunMode, target: Option<NodeRef>) {
        self.running = true;
        self.target = Some(RunTarget { mode, target });
    }

    pub(super) fn request(&mut self, request: ProverRequest) {
        self.outbox.push(ExplorerOutput::Request(request));
    }
}
