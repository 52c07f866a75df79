#![forbid(unsafe_code)]

//! Keeps the recorded tree in line with what the prover actually executed.

use super::ProofExplorer;
use super::events::StepResult;
use crate::error::{Applied, ExplorerError};
use crate::naming::{is_postpone_command, is_undo_command, same_command};
use crate::tree::NodeKind;

impl ProofExplorer {
    /// Reconciles one executed step against the recorded child at `position`:
    ///
    /// - undo and postpone are never recorded;
    /// - same command with the same branching: nothing to do;
    /// - same command with different branching: its branches are replaced;
    /// - a different single-goal command is inserted before the recorded tail;
    /// - a different command that closes or splits the goal makes the tail stale, so the
    ///   tail is trimmed before the new command is grafted.
    pub(super) fn did_execute_step(&mut self, step: StepResult) -> Result<Applied, ExplorerError> {
        const OP: &str = "didExecuteStep";
        if is_undo_command(&step.elem.name) || is_postpone_command(&step.elem.name) {
            tracing::debug!(name = %step.elem.name, "step not recorded");
            return Ok(Applied::Unchanged);
        }
        let parent = self.locate_parent(OP, &step.parent)?;
        let tree = self.tree_mut(OP)?;
        let children = tree
            .get(parent)
            .map(|item| item.children().to_vec())
            .unwrap_or_default();
        let position = step.position.unwrap_or(children.len()).min(children.len());
        let reported = step.goals.unwrap_or_else(|| step.elem.branch_count());

        let recorded = children.get(position).copied().and_then(|key| {
            let item = tree.get(key)?;
            same_command(item.name(), &step.elem.name).then_some(key)
        });

        let trimmed = match recorded {
            Some(key) => {
                let branches = tree
                    .get(key)
                    .map(|item| {
                        item.children()
                            .iter()
                            .filter_map(|child| tree.get(*child))
                            .filter(|child| matches!(child.kind(), NodeKind::Branch))
                            .count()
                    })
                    .unwrap_or_default();
                if branches == reported || (reported <= 1 && branches == 0) {
                    return Ok(Applied::Unchanged);
                }
                let trimmed = tree.clear_children(key);
                for rule in &step.elem.rules {
                    tree.graft_x(key, rule);
                }
                trimmed
            }
            None => {
                let linear = reported == 1 && step.elem.branch_count() == 0;
                let trimmed = if linear {
                    Vec::new()
                } else {
                    tree.trim_tail(parent, position)
                };
                let added = tree.insert_x(parent, position, std::slice::from_ref(&step.elem));
                if added.is_empty() && trimmed.is_empty() {
                    return Ok(Applied::Unchanged);
                }
                trimmed
            }
        };

        tracing::debug!(
            name = %step.elem.name,
            position,
            goals = reported,
            trimmed = trimmed.len(),
            "step reconciled"
        );
        let source = if trimmed.is_empty() {
            "did-append-node"
        } else {
            "did-trim-node"
        };
        self.sketchpad.extend(trimmed);
        self.forget_dangling();
        Ok(self.changed(source))
    }
}
