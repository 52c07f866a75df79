#![forbid(unsafe_code)]

//! Proof-tree state machine behind an interactive theorem-proving front end.

pub mod error;
pub mod explorer;
pub mod ghost;
pub mod ids;
pub mod naming;
pub mod node;
pub mod snapshot;
pub mod status;
pub mod tree;

pub use error::{Applied, ExplorerError};
pub use explorer::{
    EditAction, EditConfirmation, ExplorerEvent, ExplorerOutput, ExplorerState, ProofExplorer,
    ProverAction, ProverRequest,
};
pub use ids::{IdGenerator, NodeId, NodeIdError};
pub use node::{
    FormulaDescriptor, NodeRef, NodeStatus, ProofDescriptor, ProofInfo, ProofNode, ProofNodeType,
    ProofNodeX, ProofStatus, Sequent,
};
pub use snapshot::TreeStructure;
