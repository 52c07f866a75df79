#![forbid(unsafe_code)]

use crate::{INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND};
use pm_core::{ExplorerError, NodeId};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Transport-level failure of one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RpcError {
    pub(crate) code: i64,
    pub(crate) message: String,
}

impl RpcError {
    pub(crate) fn method_not_found(method: &str) -> Self {
        Self {
            code: METHOD_NOT_FOUND,
            message: format!("Method not found: {method}"),
        }
    }

    pub(crate) fn invalid_params(reason: impl std::fmt::Display) -> Self {
        Self {
            code: INVALID_PARAMS,
            message: format!("Invalid params: {reason}"),
        }
    }

    pub(crate) fn internal(reason: impl std::fmt::Display) -> Self {
        Self {
            code: INTERNAL_ERROR,
            message: format!("Internal error: {reason}"),
        }
    }

    pub(crate) fn shutting_down() -> Self {
        Self {
            code: INVALID_REQUEST,
            message: "Server is shutting down".to_string(),
        }
    }
}

/// Absent params decode as an empty object.
pub(crate) fn decode<T: DeserializeOwned>(params: Option<Value>) -> Result<T, RpcError> {
    let params = match params {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(value) => value,
    };
    serde_json::from_value(params).map_err(RpcError::invalid_params)
}

/// `{ "id": ... }` for queries addressing one node. The id is checked by the core
/// rules so a bad id is reported like any other explorer error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct NodeParams {
    pub(crate) id: Option<String>,
}

impl NodeParams {
    pub(crate) fn node_id(&self) -> Result<Option<NodeId>, ExplorerError> {
        self.id
            .as_deref()
            .map(NodeId::try_new)
            .transpose()
            .map_err(ExplorerError::from)
    }

    pub(crate) fn required(&self, op: &'static str) -> Result<NodeId, ExplorerError> {
        self.node_id()?.ok_or_else(|| ExplorerError::Malformed {
            op,
            reason: "missing id".to_string(),
        })
    }
}
