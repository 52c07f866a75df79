#![forbid(unsafe_code)]

use super::params::{NodeParams, decode};
use super::{ExplorerServer, RpcError, core_error};
use pm_core::TreeStructure;
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::Digest as _;
use std::fmt::Write as _;

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProofParams {
    with_ids: bool,
}

impl Default for ProofParams {
    fn default() -> Self {
        Self { with_ids: true }
    }
}

impl ExplorerServer {
    pub(super) fn query(&self, method: &str, params: Option<Value>) -> Result<Value, RpcError> {
        let explorer = &self.explorer;
        let result = match method {
            "explorer/getTreeStructure" => {
                let tree = explorer.tree_structure();
                let digest = snapshot_digest(tree.as_ref())?;
                json!({ "tree": tree, "digest": digest })
            }
            "explorer/getProof" => {
                let proof: ProofParams = decode(params)?;
                if proof.with_ids {
                    json!({ "proof": explorer.proof_x() })
                } else {
                    json!({ "proof": explorer.proof() })
                }
            }
            "explorer/getActiveNode" => json!({ "node": explorer.active_node() }),
            "explorer/getChildren" => {
                let node: NodeParams = decode(params)?;
                match node
                    .node_id()
                    .and_then(|id| explorer.children_of(id.as_ref()))
                {
                    Ok(children) => json!({ "children": children }),
                    Err(err) => core_error(&err),
                }
            }
            "explorer/getParent" => {
                let node: NodeParams = decode(params)?;
                match node.required("getParent") {
                    Ok(id) => json!({ "parent": explorer.parent_of(&id) }),
                    Err(err) => core_error(&err),
                }
            }
            "explorer/getSequent" => {
                let node: NodeParams = decode(params)?;
                match node.required("getSequent") {
                    Ok(id) => json!({ "sequent": explorer.sequent_of(&id) }),
                    Err(err) => core_error(&err),
                }
            }
            "explorer/resolveFocus" => {
                let node: NodeParams = decode(params)?;
                match node.required("resolveFocus") {
                    Ok(id) => json!({ "focus": explorer.resolve_focus(&id) }),
                    Err(err) => core_error(&err),
                }
            }
            "explorer/getProofScript" => {
                let node: NodeParams = decode(params)?;
                match node
                    .node_id()
                    .and_then(|id| explorer.proof_script(id.as_ref()))
                {
                    Ok(script) => json!({ "script": script }),
                    Err(err) => core_error(&err),
                }
            }
            "explorer/getClipboard" => json!({
                "clipboard": explorer.clipboard(),
                "sketchpad": explorer.sketchpad(),
            }),
            "explorer/getState" => {
                serde_json::to_value(explorer.state()).map_err(RpcError::internal)?
            }
            _ => return Err(RpcError::method_not_found(method)),
        };
        Ok(result)
    }
}

/// Hex sha256 of the serialized snapshot. Renderers compare it to skip redraws.
fn snapshot_digest(tree: Option<&TreeStructure>) -> Result<String, RpcError> {
    let bytes = serde_json::to_vec(&tree).map_err(RpcError::internal)?;
    let digest = sha2::Sha256::digest(&bytes);
    let mut out = String::with_capacity(64);
    for b in digest {
        let _ = write!(&mut out, "{b:02x}");
    }
    Ok(out)
}
