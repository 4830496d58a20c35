//! Graph mutations, applied one at a time by the engine

use super::{NodeRecord, EdgeRecord};
use serde::{Deserialize, Serialize};

/// One graph mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Delta {
    AddNode(NodeRecord),
    MoveNode { id: String, x: f64, y: f64 },
    DeleteNode { id: String },
    UpsertEdge(EdgeRecord),
    DeleteEdge { src: String, dst: String },
    Clear,
}

impl Delta {
    /// Whether this change alters what traversal can see
    pub fn is_structural(&self) -> bool {
        !matches!(self, Delta::MoveNode { .. })
    }
}
