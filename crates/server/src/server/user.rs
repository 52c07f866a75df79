#![forbid(unsafe_code)]

use super::params::{NodeParams, decode};
use super::{ExplorerServer, RpcError, applied, core_error};
use pm_core::{EditAction, NodeRef};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
struct SeekParams {
    selected: NodeRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditRequestParams {
    action: EditAction,
    #[serde(default)]
    selected: Option<NodeRef>,
    #[serde(default)]
    new_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl ExplorerServer {
    /// UI actions. They only emit prover requests; the tree changes once the prover
    /// confirms. Anything else under `explorer/` is a query.
    pub(super) fn user_request(
        &mut self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, RpcError> {
        let explorer = &mut self.explorer;
        let result = match method {
            "explorer/run" => applied(explorer.run()),
            "explorer/fastForward" => {
                applied(explorer.fast_forward_to(decode::<SeekParams>(params)?.selected))
            }
            "explorer/rewind" => applied(explorer.rewind_to(decode::<SeekParams>(params)?.selected)),
            "explorer/pause" => applied(Ok(explorer.pause())),
            "explorer/forward" => applied(explorer.forward()),
            "explorer/back" => applied(explorer.back()),
            "explorer/quit" => applied(Ok(explorer.quit())),
            "explorer/edit" => {
                let edit: EditRequestParams = decode(params)?;
                applied(explorer.request_edit(edit.action, edit.selected, edit.new_name, edit.name))
            }
            "explorer/collapseNode" => {
                let node: NodeParams = decode(params)?;
                match node.required("collapseNode") {
                    Ok(id) => applied(explorer.collapse_node(&id)),
                    Err(err) => core_error(&err),
                }
            }
            "explorer/expandNode" => {
                let node: NodeParams = decode(params)?;
                match node.required("expandNode") {
                    Ok(id) => applied(explorer.expand_node(&id)),
                    Err(err) => core_error(&err),
                }
            }
            "explorer/foldProvedBranches" => {
                json!({ "folded": explorer.fold_proved_branches() })
            }
            "explorer/focusActiveNode" => json!({ "focus": explorer.focus_active_node() }),
            _ => return self.query(method, params),
        };
        Ok(result)
    }
}
