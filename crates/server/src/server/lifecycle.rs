#![forbid(unsafe_code)]

use super::{ExplorerServer, RpcError};
use crate::{JsonRpcRequest, NOT_INITIALIZED, json_rpc_error, json_rpc_response};
use serde_json::{Value, json};

impl ExplorerServer {
    /// Handles one request or notification. Notifications never get a reply, even on error.
    pub(crate) fn handle(&mut self, request: JsonRpcRequest) -> Option<Value> {
        let method = request.method.as_str();
        let expects_response = request.expects_response();

        if method == "initialize" {
            let protocol_version = request
                .params
                .as_ref()
                .and_then(|v| v.get("protocolVersion"))
                .and_then(|v| v.as_str())
                .unwrap_or(crate::PROTOCOL_VERSION);
            return Some(json_rpc_response(
                request.id,
                json!({
                    "protocolVersion": protocol_version,
                    "serverInfo": {
                        "name": crate::SERVER_NAME,
                        "version": crate::build_fingerprint()
                    },
                    "capabilities": {
                        "explorer": {
                            "treeNotifications": self.tree_notifications,
                            "strictInit": self.strict_init
                        }
                    }
                }),
            ));
        }

        if method == "notifications/initialized" || method == "initialized" {
            self.initialized = true;
            return None;
        }

        if method == "exit" {
            tracing::info!(clean = self.shutting_down, "exit requested");
            self.exit = true;
            return None;
        }

        if !self.initialized {
            if self.strict_init {
                tracing::warn!(method, "request before initialization");
                return expects_response.then(|| {
                    json_rpc_error(request.id, NOT_INITIALIZED, "Server not initialized")
                });
            }
            // Clients racing the handshake still get served.
            self.initialized = true;
        }

        let outcome = if self.shutting_down {
            Err(RpcError::shutting_down())
        } else {
            match method {
                "ping" => Ok(json!({})),
                "shutdown" => {
                    self.shutting_down = true;
                    Ok(Value::Null)
                }
                _ => self.dispatch(method, request.params),
            }
        };
        self.flush_outbox();

        if !expects_response {
            if let Err(err) = &outcome {
                tracing::debug!(method, code = err.code, message = %err.message, "notification dropped");
            }
            return None;
        }
        Some(match outcome {
            Ok(result) => json_rpc_response(request.id, result),
            Err(err) => json_rpc_error(request.id, err.code, &err.message),
        })
    }

    fn dispatch(&mut self, method: &str, params: Option<Value>) -> Result<Value, RpcError> {
        if let Some(name) = method.strip_prefix("proofEdit/") {
            return self.edit_confirmation(method, name, params);
        }
        if method.starts_with("explorer/") {
            return self.user_request(method, params);
        }
        self.prover_event(method, params)
    }
}
