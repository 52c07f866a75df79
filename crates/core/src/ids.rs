#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable external identifier of a proof node. Assigned once, never reused within a session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, NodeIdError> {
        let value = value.into();
        validate_node_id(&value)?;
        Ok(Self(value.trim().to_string()))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for NodeId {
    type Error = NodeIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl TryFrom<&str> for NodeId {
    type Error = NodeIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<NodeId> for String {
    fn from(value: NodeId) -> Self {
        value.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NodeIdError {
    #[error("node id must not be empty")]
    Empty,
    #[error("node id is too long")]
    TooLong,
    #[error("node id contains control characters")]
    ContainsControl,
}

fn validate_node_id(value: &str) -> Result<(), NodeIdError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(NodeIdError::Empty);
    }
    if trimmed.len() > 256 {
        return Err(NodeIdError::TooLong);
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(NodeIdError::ContainsControl);
    }
    Ok(())
}

/// Hands out fresh node ids for nodes that arrive without one (loaded descriptors, the ghost).
#[derive(Clone, Debug)]
pub struct IdGenerator {
    prefix: String,
    next: u64,
}

impl IdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }

    /// A generator whose prefix is derived from the wall clock, so ids of two sessions differ.
    pub fn for_session() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Self::new(format!("pm{:x}", (nanos as u64) & 0xffff_ffff))
    }

    pub fn fresh(&mut self) -> NodeId {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        // Only a prefix with control characters can fail validation.
        NodeId::try_new(id).unwrap_or_else(|_| NodeId(format!("n-{}", self.next)))
    }
}
