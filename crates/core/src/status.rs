#![forbid(unsafe_code)]

use crate::node::NodeStatus;
use serde::{Deserialize, Serialize};

/// Per-node status. `active`, `visited` and `pending` are pairwise exclusive;
/// `complete` is independent of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFlags {
    pub active: bool,
    pub visited: bool,
    pub pending: bool,
    pub complete: bool,
}

impl StatusFlags {
    pub fn not_visited(&self) -> bool {
        !(self.active || self.visited || self.pending)
    }

    pub fn apply(&mut self, status: NodeStatus) {
        match status {
            NodeStatus::Active => self.set_active(),
            NodeStatus::Visited => self.set_visited(),
            NodeStatus::Pending => self.set_pending(),
            NodeStatus::NotVisited => self.set_not_visited(),
            NodeStatus::Complete => self.complete = true,
            NodeStatus::NotComplete => self.complete = false,
        }
    }

    pub fn set_active(&mut self) {
        self.active = true;
        self.visited = false;
        self.pending = false;
    }

    pub fn set_visited(&mut self) {
        self.visited = true;
        self.active = false;
        self.pending = false;
    }

    pub fn set_pending(&mut self) {
        self.pending = true;
        self.active = false;
        self.visited = false;
    }

    pub fn set_not_visited(&mut self) {
        *self = Self::default();
    }
}
