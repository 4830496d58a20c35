//! In-memory GraphEngine: ordered node/edge lists mutated only through deltas

use std::env;

use crate::storage::{NodeRecord, EdgeRecord};
use crate::storage::delta::Delta;
use crate::error::{GraphError, Result};
use super::{EdgeUpsert, GraphStore};

// Debug logging macro - enabled via PATHTRACE_DEBUG=1
macro_rules! debug_log {
    ($($arg:tt)*) => {
        if env::var("PATHTRACE_DEBUG").is_ok() {
            eprintln!("[PATHTRACE DEBUG] {}", format!($($arg)*));
        }
    };
}

/// Main graph engine.
///
/// Node and edge order is insertion order and is load-bearing: the
/// adjacency index, and therefore every traversal tie-break, follows it.
#[derive(Debug, Default)]
pub struct GraphEngine {
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,

    // Bumped by every structural delta
    revision: usize,
}

impl GraphEngine {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from records, validating them like individual inserts
    pub fn from_records(nodes: Vec<NodeRecord>, edges: Vec<EdgeRecord>) -> Result<Self> {
        let mut engine = Self::new();
        for node in nodes {
            engine.add_node(node)?;
        }
        for edge in edges {
            engine.upsert_edge(edge)?;
        }
        tracing::info!(
            "Loaded graph: {} nodes, {} edges",
            engine.nodes.len(),
            engine.edges.len()
        );
        Ok(engine)
    }

    /// Number of structural mutations applied so far.
    /// Anything computed at an older revision may be stale.
    pub fn revision(&self) -> usize {
        self.revision
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Edge joining `a` and `b`: exact `a -> b` first, then either order
    fn edge_position(&self, a: &str, b: &str) -> Option<usize> {
        self.edges
            .iter()
            .position(|e| e.src == a && e.dst == b)
            .or_else(|| self.edges.iter().position(|e| e.connects(a, b)))
    }

    /// Apply delta to current state
    fn apply_delta(&mut self, delta: &Delta) {
        debug_log!("apply_delta: {:?} ({} nodes, {} edges before)",
            delta, self.nodes.len(), self.edges.len());

        match delta {
            Delta::AddNode(node) => {
                self.nodes.push(node.clone());
            }
            Delta::MoveNode { id, x, y } => {
                if let Some(node) = self.nodes.iter_mut().find(|n| &n.id == id) {
                    node.x = *x;
                    node.y = *y;
                }
            }
            Delta::DeleteNode { id } => {
                self.nodes.retain(|n| &n.id != id);
                self.edges.retain(|e| !e.touches(id));
            }
            Delta::UpsertEdge(edge) => {
                let slots: Vec<usize> = self
                    .edges
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.same_slot(&edge.src, &edge.dst, edge.directed))
                    .map(|(idx, _)| idx)
                    .collect();

                let Some((&first, rest)) = slots.split_first() else {
                    self.edges.push(edge.clone());
                    return;
                };
                // Only an undirected upsert can match more than one edge;
                // the pair collapses into the first
                for &idx in rest.iter().rev() {
                    self.edges.remove(idx);
                }
                let existing = &mut self.edges[first];
                if edge.directed {
                    existing.src = edge.src.clone();
                    existing.dst = edge.dst.clone();
                }
                existing.weight = edge.weight;
                existing.directed = edge.directed;
            }
            Delta::DeleteEdge { src, dst } => {
                if let Some(idx) = self.edge_position(src, dst) {
                    self.edges.remove(idx);
                }
            }
            Delta::Clear => {
                self.nodes.clear();
                self.edges.clear();
            }
        }
    }

    fn record(&mut self, delta: Delta) {
        self.apply_delta(&delta);
        if delta.is_structural() {
            self.revision += 1;
        }
    }
}

impl GraphStore for GraphEngine {
    fn add_node(&mut self, node: NodeRecord) -> Result<()> {
        if self.node_exists(&node.id) {
            tracing::warn!("Rejected duplicate node name: {}", node.id);
            return Err(GraphError::DuplicateNodeName(node.id));
        }
        self.record(Delta::AddNode(node));
        Ok(())
    }

    fn move_node(&mut self, id: &str, x: f64, y: f64) -> bool {
        if !self.node_exists(id) {
            return false;
        }
        self.record(Delta::MoveNode { id: id.to_string(), x, y });
        true
    }

    fn delete_node(&mut self, id: &str) -> Option<(NodeRecord, Vec<EdgeRecord>)> {
        let idx = self.position(id)?;
        let node = self.nodes[idx].clone();
        let removed: Vec<EdgeRecord> = self
            .edges
            .iter()
            .filter(|e| e.touches(id))
            .cloned()
            .collect();

        self.record(Delta::DeleteNode { id: id.to_string() });
        tracing::info!("Deleted node {} and {} incident edges", id, removed.len());
        Some((node, removed))
    }

    fn get_node(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    fn upsert_edge(&mut self, edge: EdgeRecord) -> Result<EdgeUpsert> {
        // NaN fails this comparison too
        if !(edge.weight.is_finite() && edge.weight > 0.0) {
            tracing::warn!("Rejected edge {} -> {} with weight {}", edge.src, edge.dst, edge.weight);
            return Err(GraphError::InvalidEdge {
                src: edge.src,
                dst: edge.dst,
                weight: edge.weight,
            });
        }
        for endpoint in [&edge.src, &edge.dst] {
            if !self.node_exists(endpoint) {
                tracing::warn!("Edge endpoint not found: {}", endpoint);
                return Err(GraphError::NodeNotFound(endpoint.clone()));
            }
        }

        let existed = self
            .edges
            .iter()
            .any(|e| e.same_slot(&edge.src, &edge.dst, edge.directed));
        self.record(Delta::UpsertEdge(edge));

        Ok(if existed { EdgeUpsert::Updated } else { EdgeUpsert::Inserted })
    }

    fn delete_edge(&mut self, a: &str, b: &str) -> Option<EdgeRecord> {
        let edge = self.edges[self.edge_position(a, b)?].clone();
        self.record(Delta::DeleteEdge { src: a.to_string(), dst: b.to_string() });
        Some(edge)
    }

    fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    fn clear(&mut self) {
        self.record(Delta::Clear);
        tracing::info!("Graph cleared");
    }
}
