#![forbid(unsafe_code)]

//! Proof explorer controller: applies prover notifications to the tree and tracks the
//! active node, the ghost cursor and run state.

mod edits;
mod events;
mod queries;
mod reconcile;
mod requests;

pub use events::{
    AppendDescriptor, CopyDescriptor, Cursor, CursorDescriptor, CutNodeDescriptor,
    DirtyFlagDescriptor, EditAction, EditConfirmation, ExplorerEvent, ProofStatusDescriptor,
    RemovedDescriptor, RenameDescriptor, SelectedDescriptor, SequentUpdate, StatusUpdate,
    StepResult,
};
pub use queries::{ExplorerState, ItemView};
pub use requests::{
    ExecAction, ExplorerOutput, ProverAction, ProverRequest, RunMode, RunTarget,
};

use crate::error::{Applied, ExplorerError};
use crate::ghost::GhostNode;
use crate::ids::{IdGenerator, NodeId};
use crate::naming::is_postpone_command;
use crate::node::{FormulaDescriptor, ProofDescriptor, ProofNodeX, ProofStatus};
use crate::tree::{NodeKey, ProofTree};

#[derive(Debug)]
pub struct ProofExplorer {
    tree: Option<ProofTree>,
    ghost: Option<GhostNode>,
    active: Option<NodeKey>,
    running: bool,
    target: Option<RunTarget>,
    dirty: bool,
    formula: Option<FormulaDescriptor>,
    descriptor: Option<ProofDescriptor>,
    clipboard: Option<String>,
    sketchpad: Vec<ProofNodeX>,
    outbox: Vec<ExplorerOutput>,
    id_prefix: String,
    loads: u64,
}

impl Default for ProofExplorer {
    fn default() -> Self {
        Self::new()
    }
}

impl ProofExplorer {
    pub fn new() -> Self {
        let prefix = IdGenerator::for_session().fresh().into_string();
        Self::with_id_prefix(prefix)
    }

    /// Controller whose generated ids start with `prefix`.
    pub fn with_id_prefix(prefix: impl Into<String>) -> Self {
        Self {
            tree: None,
            ghost: None,
            active: None,
            running: false,
            target: None,
            dirty: false,
            formula: None,
            descriptor: None,
            clipboard: None,
            sketchpad: Vec::new(),
            outbox: Vec::new(),
            id_prefix: prefix.into(),
            loads: 0,
        }
    }

    /// Creates the root and the ghost from a prover-supplied structure.
    /// Without a descriptor the proof status defaults to `unfinished`.
    pub fn load_proof_structure(
        &mut self,
        formula: FormulaDescriptor,
        descriptor: Option<ProofDescriptor>,
        proof: &ProofNodeX,
    ) -> Applied {
        let status = descriptor
            .as_ref()
            .map_or(ProofStatus::Unfinished, |desc| desc.info.status);
        let ids = self.next_generator();
        let tree = ProofTree::from_proof_x(&formula.formula_name, proof, status, ids);
        tracing::info!(
            formula = %formula.formula_name,
            nodes = tree.len(),
            status = status.as_str(),
            "proof structure loaded"
        );
        self.install(tree);
        self.formula = Some(formula);
        self.descriptor = descriptor;
        self.changed("did-load-proof")
    }

    /// Loads a stored proof. A proof consisting only of `(postpone)` loads as empty.
    pub fn load_proof_descriptor(&mut self, descriptor: ProofDescriptor) -> Applied {
        let proof = descriptor.proof_tree.as_ref().filter(|proof| {
            !(proof.rules.len() == 1 && is_postpone_command(&proof.rules[0].name))
        });
        let ids = self.next_generator();
        let tree = ProofTree::from_proof_node(
            &descriptor.info.formula,
            proof,
            descriptor.info.status,
            ids,
        );
        tracing::info!(
            formula = %descriptor.info.formula,
            nodes = tree.len(),
            "proof descriptor loaded"
        );
        self.install(tree);
        let keep_formula = self
            .formula
            .as_ref()
            .is_some_and(|formula| formula.formula_name == descriptor.info.formula);
        if !keep_formula {
            self.formula = Some(FormulaDescriptor {
                formula_name: descriptor.info.formula.clone(),
                theory_name: descriptor.info.theory.clone(),
                ..FormulaDescriptor::default()
            });
        }
        self.descriptor = Some(descriptor);
        self.changed("did-load-descriptor")
    }

    /// Discards the tree, the ghost and every pointer into them.
    pub fn reset_view(&mut self) -> Applied {
        self.tree = None;
        self.ghost = None;
        self.active = None;
        self.running = false;
        self.target = None;
        tracing::info!("view reset");
        self.changed("did-reset-view")
    }

    /// Queued outbound items, oldest first.
    pub fn drain_output(&mut self) -> Vec<ExplorerOutput> {
        std::mem::take(&mut self.outbox)
    }

    fn install(&mut self, mut tree: ProofTree) {
        let ghost_id = tree.fresh_id();
        self.ghost = Some(GhostNode::new(ghost_id, tree.root()));
        self.tree = Some(tree);
        self.active = None;
        self.running = false;
        self.target = None;
        self.dirty = false;
    }

    fn next_generator(&mut self) -> IdGenerator {
        self.loads += 1;
        IdGenerator::new(format!("{}.{}", self.id_prefix, self.loads))
    }

    fn tree_ref(&self, op: &'static str) -> Result<&ProofTree, ExplorerError> {
        self.tree
            .as_ref()
            .ok_or_else(|| logged(ExplorerError::NoProofLoaded { op }))
    }

    fn tree_mut(&mut self, op: &'static str) -> Result<&mut ProofTree, ExplorerError> {
        self.tree
            .as_mut()
            .ok_or_else(|| logged(ExplorerError::NoProofLoaded { op }))
    }

    /// Arena key of a real node, memoizing the lookup.
    fn locate(&mut self, op: &'static str, id: &NodeId) -> Result<NodeKey, ExplorerError> {
        self.tree_mut(op)?.resolve(id).ok_or_else(|| {
            logged(ExplorerError::NotFound {
                op,
                id: id.clone(),
            })
        })
    }

    /// Resolves a parent address, routing the ghost (by id or by name) to its anchor.
    fn locate_parent(&mut self, op: &'static str, id: &NodeId) -> Result<NodeKey, ExplorerError> {
        if let Some(ghost) = self.ghost.as_ref()
            && ghost.matches(id.as_str())
        {
            return ghost.anchor().ok_or_else(|| {
                logged(ExplorerError::NotFound {
                    op,
                    id: id.clone(),
                })
            });
        }
        self.locate(op, id)
    }

    /// Drops pointers into subtrees that no longer exist.
    fn forget_dangling(&mut self) {
        let Some(tree) = self.tree.as_ref() else {
            return;
        };
        if self.active.is_some_and(|key| tree.get(key).is_none()) {
            self.active = None;
        }
        if let Some(ghost) = self.ghost.as_mut() {
            ghost.forget_missing_anchor(tree);
        }
    }

    /// Moves the active marker to the ghost, demoting any active real node.
    fn activate_ghost(&mut self, anchor: NodeKey) {
        if let Some(previous) = self.active.take()
            && let Some(tree) = self.tree.as_mut()
        {
            tree.clear_active(previous);
        }
        if let Some(ghost) = self.ghost.as_mut() {
            ghost.activate(anchor);
        }
    }

    fn stop_execution(&mut self) {
        self.running = false;
        self.target = None;
        self.outbox.push(ExplorerOutput::DidStopExecution);
    }

    fn changed(&mut self, source: &'static str) -> Applied {
        self.outbox.push(ExplorerOutput::TreeChanged { source });
        Applied::Changed
    }
}

fn logged(err: ExplorerError) -> ExplorerError {
    tracing::warn!(code = err.code(), "{err}");
    err
}
