#![forbid(unsafe_code)]

//! JSON-RPC surface over one [`ProofExplorer`].

mod lifecycle;
mod params;
mod prover;
mod queries;
mod user;

use crate::{ServerConfig, json_rpc_notification};
use pm_core::{Applied, ExplorerError, ExplorerOutput, ProofExplorer};
use serde_json::{Value, json};

pub(crate) use params::RpcError;

pub(crate) struct ExplorerServer {
    explorer: ProofExplorer,
    initialized: bool,
    shutting_down: bool,
    exit: bool,
    strict_init: bool,
    tree_notifications: bool,
    notifications: Vec<Value>,
}

impl ExplorerServer {
    pub(crate) fn new(cfg: &ServerConfig) -> Self {
        Self {
            explorer: ProofExplorer::with_id_prefix(cfg.id_prefix.clone()),
            initialized: false,
            shutting_down: false,
            exit: false,
            strict_init: cfg.strict_init,
            tree_notifications: cfg.tree_notifications,
            notifications: Vec::new(),
        }
    }

    pub(crate) fn exit_requested(&self) -> bool {
        self.exit
    }

    /// Notifications produced by the last request, in emission order.
    pub(crate) fn take_notifications(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.notifications)
    }

    /// Turns the controller outbox into outbound notifications.
    fn flush_outbox(&mut self) {
        for output in self.explorer.drain_output() {
            match output {
                ExplorerOutput::Request(request) => match serde_json::to_value(&request) {
                    Ok(params) => self
                        .notifications
                        .push(json_rpc_notification("prover/command", params)),
                    Err(err) => tracing::warn!(%err, "prover request not serializable"),
                },
                ExplorerOutput::TreeChanged { source } => {
                    if self.tree_notifications {
                        self.notifications.push(json_rpc_notification(
                            "explorer/didChangeTree",
                            json!({ "source": source }),
                        ));
                    }
                }
                ExplorerOutput::DidStopExecution => self
                    .notifications
                    .push(json_rpc_notification("explorer/didStopExecution", json!({}))),
            }
        }
    }
}

/// Result body for an event or action. Core errors stay in the result.
fn applied(outcome: Result<Applied, ExplorerError>) -> Value {
    match outcome {
        Ok(applied) => json!({ "applied": true, "changed": applied.changed() }),
        Err(err) => core_error(&err),
    }
}

fn core_error(err: &ExplorerError) -> Value {
    json!({
        "applied": false,
        "error": { "code": err.code(), "message": err.to_string() }
    })
}
