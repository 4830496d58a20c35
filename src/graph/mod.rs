//! Graph API and implementation

pub mod adjacency;
pub mod engine;
pub mod traversal;

pub use adjacency::{AdjacencyIndex, Neighbor};
pub use engine::GraphEngine;
pub use traversal::{compute_path, try_compute_path, PathResult, Strategy};

use crate::storage::{NodeRecord, EdgeRecord, GraphSnapshot};
use crate::error::Result;

/// Outcome of an edge upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeUpsert {
    Inserted,
    /// An existing edge in the same slot was overwritten in place
    Updated,
}

/// Main trait for graph storage
pub trait GraphStore {
    // === NODE OPERATIONS ===

    /// Append a node. Fails if a live node already has this id.
    fn add_node(&mut self, node: NodeRecord) -> Result<()>;

    /// Move a node; returns false if it does not exist
    fn move_node(&mut self, id: &str, x: f64, y: f64) -> bool;

    /// Remove a node and every edge touching it.
    /// Returns the removed node and edges, or None if the id was unknown.
    fn delete_node(&mut self, id: &str) -> Option<(NodeRecord, Vec<EdgeRecord>)>;

    fn get_node(&self, id: &str) -> Option<&NodeRecord>;

    fn node_exists(&self, id: &str) -> bool {
        self.get_node(id).is_some()
    }

    /// All nodes in insertion order
    fn nodes(&self) -> &[NodeRecord];

    // === EDGE OPERATIONS ===

    /// Insert an edge or overwrite the one in the same slot.
    /// Rejects non-positive weights and unknown endpoints.
    fn upsert_edge(&mut self, edge: EdgeRecord) -> Result<EdgeUpsert>;

    /// Remove the edge joining `a` and `b` in either order
    fn delete_edge(&mut self, a: &str, b: &str) -> Option<EdgeRecord>;

    /// All edges in insertion order
    fn edges(&self) -> &[EdgeRecord];

    // === TRAVERSAL ===

    /// Build the directed adjacency index for the current edge set
    fn adjacency(&self, reverse: bool) -> AdjacencyIndex {
        AdjacencyIndex::build(self.nodes(), self.edges(), reverse)
    }

    // === MAINTENANCE ===

    fn clear(&mut self);

    fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes().to_vec(),
            edges: self.edges().to_vec(),
        }
    }

    // === STATS ===

    fn node_count(&self) -> usize {
        self.nodes().len()
    }

    fn edge_count(&self) -> usize {
        self.edges().len()
    }
}
