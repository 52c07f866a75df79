#![forbid(unsafe_code)]

use super::events::{
    AppendDescriptor, CopyDescriptor, CursorDescriptor, CutNodeDescriptor, EditAction,
    EditConfirmation, RemovedDescriptor, RenameDescriptor, SelectedDescriptor,
};
use super::{ProofExplorer, logged};
use crate::error::{Applied, ExplorerError};
use crate::node::{NodeStatus, ProofNodeX, ProofStatus};

impl ProofExplorer {
    pub(super) fn apply_edit(
        &mut self,
        confirmation: EditConfirmation,
    ) -> Result<Applied, ExplorerError> {
        let action = confirmation.action();
        match confirmation {
            EditConfirmation::AppendNode(desc) | EditConfirmation::AppendBranch(desc) => {
                self.did_append(action, desc)
            }
            EditConfirmation::PasteNode(desc) | EditConfirmation::PasteTree(desc) => {
                if desc.elem.is_none() {
                    return Ok(self.changed("did-paste-tree"));
                }
                self.did_append(action, desc)
            }
            EditConfirmation::DeleteNode(desc) | EditConfirmation::DeleteTree(desc) => {
                self.did_delete(action, desc)
            }
            EditConfirmation::TrimNode(desc)
            | EditConfirmation::TrimUnused(desc)
            | EditConfirmation::SliceTree(desc)
            | EditConfirmation::CutTree(desc) => self.did_remove(action, desc),
            EditConfirmation::CutNode(desc) => self.did_cut_node(desc),
            EditConfirmation::CopyNode(desc) => Ok(self.did_copy(action, desc, false)),
            EditConfirmation::CopyTree(desc) => Ok(self.did_copy(action, desc, true)),
            EditConfirmation::RenameNode(desc) => self.did_rename(desc),
            EditConfirmation::ActivateCursor(desc) => self.did_activate_cursor(desc),
            EditConfirmation::DeactivateCursor => Ok(self.did_deactivate_cursor()),
            EditConfirmation::UpdateProofStatus(desc) => {
                self.did_update_proof_status(desc.proof_status)
            }
            EditConfirmation::UpdateDirtyFlag(desc) => {
                self.dirty = desc.flag;
                Ok(Applied::Unchanged)
            }
        }
    }

    fn did_append(
        &mut self,
        action: EditAction,
        desc: AppendDescriptor,
    ) -> Result<Applied, ExplorerError> {
        let op = action.as_str();
        let Some(elem) = desc.elem else {
            return Err(logged(ExplorerError::malformed(op, "missing elem")));
        };
        let Some(parent_id) = elem
            .parent
            .clone()
            .or_else(|| desc.selected.as_ref().map(|selected| selected.id.clone()))
        else {
            return Err(logged(ExplorerError::malformed(op, "missing parent")));
        };
        let parent = self.locate_parent(op, &parent_id)?;
        let tree = self.tree_mut(op)?;
        let position = desc
            .position
            .unwrap_or_else(|| tree.get(parent).map_or(0, |item| item.children().len()));
        let added = tree.insert_x(parent, position, std::slice::from_ref(&elem));
        if added.is_empty() {
            tracing::debug!(op, id = %elem.id, "already present");
            return Ok(Applied::Unchanged);
        }
        tracing::debug!(op, id = %elem.id, name = %elem.name, position, "appended");
        Ok(self.changed(source_of(action)))
    }

    fn did_delete(
        &mut self,
        action: EditAction,
        desc: SelectedDescriptor,
    ) -> Result<Applied, ExplorerError> {
        let op = action.as_str();
        let key = self.locate(op, &desc.selected.id)?;
        let tree = self.tree_mut(op)?;
        if key == tree.root() {
            tree.clear_children(key);
        } else {
            tree.remove(key);
        }
        self.forget_dangling();
        tracing::debug!(op, id = %desc.selected.id, "deleted");
        Ok(self.changed(source_of(action)))
    }

    /// Removes the subtrees listed in `elems`, moving them to the sketch-pad.
    /// Elements already gone are skipped, so a repeated confirmation is a no-op.
    fn did_remove(
        &mut self,
        action: EditAction,
        desc: RemovedDescriptor,
    ) -> Result<Applied, ExplorerError> {
        let op = action.as_str();
        if desc.elems.is_empty() && action != EditAction::TrimUnused {
            return Err(logged(ExplorerError::malformed(op, "no elems")));
        }
        if let Some(clipboard) = desc.clipboard {
            self.clipboard = Some(clipboard);
        }
        let removed = self.remove_elems(op, &desc.elems)?;
        if removed.is_empty() {
            return Ok(Applied::Unchanged);
        }
        tracing::debug!(op, removed = removed.len(), "trimmed");
        self.sketchpad.extend(removed);
        self.forget_dangling();
        Ok(self.changed(source_of(action)))
    }

    fn did_cut_node(&mut self, desc: CutNodeDescriptor) -> Result<Applied, ExplorerError> {
        let op = EditAction::CutNode.as_str();
        self.clipboard = Some(desc.selected.name.clone());
        let removed = self.remove_elems(op, std::slice::from_ref(&desc.elem))?;
        if removed.is_empty() {
            return Ok(Applied::Unchanged);
        }
        self.sketchpad.extend(removed);
        self.forget_dangling();
        Ok(self.changed(source_of(EditAction::CutNode)))
    }

    fn remove_elems(
        &mut self,
        op: &'static str,
        elems: &[ProofNodeX],
    ) -> Result<Vec<ProofNodeX>, ExplorerError> {
        let tree = self.tree_mut(op)?;
        let mut removed = Vec::new();
        for elem in elems {
            let Some(key) = tree.resolve(&elem.id) else {
                continue;
            };
            if key == tree.root() {
                removed.extend(tree.clear_children(key));
            } else {
                removed.extend(tree.remove(key));
            }
        }
        Ok(removed)
    }

    fn did_copy(&mut self, action: EditAction, desc: CopyDescriptor, subtree: bool) -> Applied {
        let text = match desc.clipboard {
            Some(text) => text,
            None if subtree => self
                .tree
                .as_ref()
                .and_then(|tree| {
                    tree.find(&desc.selected.id)
                        .map(|key| tree.print_proof_commands(key))
                })
                .unwrap_or_else(|| desc.selected.name.clone()),
            None => desc.selected.name.clone(),
        };
        tracing::debug!(op = action.as_str(), id = %desc.selected.id, "copied");
        self.clipboard = Some(text);
        Applied::Unchanged
    }

    fn did_rename(&mut self, desc: RenameDescriptor) -> Result<Applied, ExplorerError> {
        let op = EditAction::RenameNode.as_str();
        if desc.new_name.trim().is_empty() {
            return Err(logged(ExplorerError::malformed(op, "empty new name")));
        }
        let key = self.locate(op, &desc.selected.id)?;
        self.tree_mut(op)?.rename(key, &desc.new_name);
        Ok(self.changed(source_of(EditAction::RenameNode)))
    }

    fn did_activate_cursor(&mut self, desc: CursorDescriptor) -> Result<Applied, ExplorerError> {
        let op = EditAction::ActivateCursor.as_str();
        let anchor = self.locate(op, &desc.cursor.parent)?;
        if self.ghost.is_none() {
            return Err(logged(ExplorerError::NoProofLoaded { op }));
        }
        self.activate_ghost(anchor);
        if self.running || self.target.is_some() {
            self.stop_execution();
        }
        Ok(self.changed(source_of(EditAction::ActivateCursor)))
    }

    fn did_deactivate_cursor(&mut self) -> Applied {
        match self.ghost.as_mut() {
            Some(ghost) => {
                ghost.deactivate();
                self.changed(source_of(EditAction::DeactivateCursor))
            }
            None => Applied::Unchanged,
        }
    }

    fn did_update_proof_status(&mut self, status: ProofStatus) -> Result<Applied, ExplorerError> {
        let op = EditAction::UpdateProofStatus.as_str();
        let tree = self.tree_mut(op)?;
        if status == ProofStatus::Proved {
            tree.qed();
            self.sketchpad.clear();
            if self.running || self.target.is_some() {
                self.stop_execution();
            }
        } else {
            let root = tree.root();
            tree.update_status(root, NodeStatus::Pending);
            tree.set_proof_status(status);
        }
        tracing::debug!(status = status.as_str(), "proof status updated");
        Ok(self.changed(source_of(EditAction::UpdateProofStatus)))
    }
}

fn source_of(action: EditAction) -> &'static str {
    match action {
        EditAction::AppendNode | EditAction::AppendBranch => "did-append-node",
        EditAction::DeleteNode | EditAction::DeleteTree => "did-delete-node",
        EditAction::TrimNode | EditAction::TrimUnused => "did-trim-node",
        EditAction::CutNode => "did-cut-node",
        EditAction::CutTree => "did-cut-tree",
        EditAction::CopyNode | EditAction::CopyTree => "did-copy-node",
        EditAction::PasteNode | EditAction::PasteTree => "did-paste-tree",
        EditAction::RenameNode => "did-rename-node",
        EditAction::SliceTree => "did-slice-tree",
        EditAction::ActivateCursor => "did-activate-cursor",
        EditAction::DeactivateCursor => "did-deactivate-cursor",
        EditAction::UpdateProofStatus => "did-update-proof-status",
        EditAction::UpdateDirtyFlag => "did-update-dirty-flag",
    }
}
