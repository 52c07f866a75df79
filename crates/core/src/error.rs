#![forbid(unsafe_code)]

use crate::ids::{NodeId, NodeIdError};

#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error("{op}: node {id} not found")]
    NotFound { op: &'static str, id: NodeId },
    #[error("{op}: no proof loaded")]
    NoProofLoaded { op: &'static str },
    #[error("{op}: malformed descriptor: {reason}")]
    Malformed { op: &'static str, reason: String },
    #[error("{op}: refused: {reason}")]
    Refused { op: &'static str, reason: String },
    #[error("invalid node id: {0}")]
    InvalidNodeId(#[from] NodeIdError),
}

impl ExplorerError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::NoProofLoaded { .. } => "NO_PROOF",
            Self::Malformed { .. } => "MALFORMED",
            Self::Refused { .. } => "REFUSED",
            Self::InvalidNodeId(_) => "INVALID_ID",
        }
    }

    pub(crate) fn malformed(op: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            op,
            reason: reason.into(),
        }
    }
}

/// Outcome of an event or action that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Changed,
    Unchanged,
}

impl Applied {
    pub fn changed(self) -> bool {
        matches!(self, Self::Changed)
    }
}
