#![forbid(unsafe_code)]

//! Prover to explorer traffic: status and sequent updates, step results, edit
//! confirmations and proof loading.

use super::params::decode;
use super::{ExplorerServer, RpcError, applied, core_error};
use pm_core::explorer::{SequentUpdate, StatusUpdate, StepResult};
use pm_core::{
    EditAction, EditConfirmation, ExplorerEvent, FormulaDescriptor, ProofDescriptor, ProofNodeX,
    Sequent,
};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
struct LoadSequentParams {
    #[serde(default)]
    sequent: Sequent,
}

#[derive(Debug, Deserialize)]
struct LoadStructureParams {
    formula: FormulaDescriptor,
    #[serde(default)]
    descriptor: Option<ProofDescriptor>,
    proof: ProofNodeX,
}

#[derive(Debug, Deserialize)]
struct LoadDescriptorParams {
    descriptor: ProofDescriptor,
}

impl ExplorerServer {
    pub(super) fn prover_event(
        &mut self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, RpcError> {
        let event = match method {
            "proofNode/didUpdateStatus" => ExplorerEvent::NodeStatus(decode::<StatusUpdate>(params)?),
            "proofExec/didUpdateSequent" => {
                ExplorerEvent::SequentUpdated(decode::<SequentUpdate>(params)?)
            }
            "proofExec/didLoadSequent" => {
                ExplorerEvent::SequentLoaded(decode::<LoadSequentParams>(params)?.sequent)
            }
            "proofExec/didStartProof" => ExplorerEvent::ProofStarted,
            "proofExec/didStopRunning" => ExplorerEvent::StoppedRunning,
            "proofExec/didExecuteStep" => ExplorerEvent::StepExecuted(decode::<StepResult>(params)?),
            "proofExplorer/loadProofStructure" => {
                let load: LoadStructureParams = decode(params)?;
                let outcome =
                    self.explorer
                        .load_proof_structure(load.formula, load.descriptor, &load.proof);
                return Ok(applied(Ok(outcome)));
            }
            "proofExplorer/loadProofDescriptor" => {
                let load: LoadDescriptorParams = decode(params)?;
                return Ok(applied(Ok(self.explorer.load_proof_descriptor(load.descriptor))));
            }
            "proofExplorer/resetView" => return Ok(applied(Ok(self.explorer.reset_view()))),
            _ => return Err(RpcError::method_not_found(method)),
        };
        Ok(applied(self.explorer.apply(event)))
    }

    /// `proofEdit/didAppendNode` and friends. A descriptor that does not fit the action
    /// is reported in the result, like a missing node.
    pub(super) fn edit_confirmation(
        &mut self,
        method: &str,
        name: &str,
        params: Option<Value>,
    ) -> Result<Value, RpcError> {
        let Some(action) = EditAction::from_confirmation_name(name) else {
            return Err(RpcError::method_not_found(method));
        };
        let params = params.unwrap_or_else(|| json!({}));
        match EditConfirmation::parse(action, params) {
            Ok(confirmation) => Ok(applied(self.explorer.apply(ExplorerEvent::Edit(confirmation)))),
            Err(err) => Ok(core_error(&err)),
        }
    }
}
