#![forbid(unsafe_code)]

use super::item::NodeKey;
use crate::ids::NodeId;
use std::collections::HashMap;

/// Search cache from external ids to arena keys.
#[derive(Clone, Debug, Default)]
pub struct NodeIndex {
    entries: HashMap<NodeId, NodeKey>,
}

impl NodeIndex {
    pub fn get(&self, id: &NodeId) -> Option<NodeKey> {
        self.entries.get(id).copied()
    }

    pub fn insert(&mut self, id: NodeId, key: NodeKey) {
        self.entries.insert(id, key);
    }

    pub fn remove(&mut self, id: &NodeId) -> Option<NodeKey> {
        self.entries.remove(id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
