//! Node and edge records, plus the snapshot format used for import/export

pub mod delta;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Location on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Unique name; also the key used by edges
    pub id: String,

    /// Canvas position. Owned by the renderer, never read by traversal.
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,

    /// Display label, if different from the id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            label: None,
        }
    }
}

/// Weighted connection between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Source node ID
    pub src: String,

    /// Target node ID
    pub dst: String,

    /// Always > 0 once stored
    pub weight: f64,

    /// Directed edges are only traversable src -> dst
    #[serde(default)]
    pub directed: bool,
}

impl EdgeRecord {
    pub fn new(src: impl Into<String>, dst: impl Into<String>, weight: f64, directed: bool) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            weight,
            directed,
        }
    }

    /// Endpoint match ignoring order (used by delete)
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.src == a && self.dst == b) || (self.src == b && self.dst == a)
    }

    /// Whether an upsert of `src -> dst` should overwrite this edge.
    ///
    /// Same order always matches. Opposite order matches unless both the
    /// stored and the incoming edge are directed, so `A -> B` and `B -> A`
    /// can coexist as two one-way roads. A directed upsert that matches
    /// takes its own endpoint order; an undirected one absorbs every edge
    /// of the pair.
    pub fn same_slot(&self, src: &str, dst: &str, directed: bool) -> bool {
        if self.src == src && self.dst == dst {
            return true;
        }
        self.src == dst && self.dst == src && !(directed && self.directed)
    }

    pub fn touches(&self, id: &str) -> bool {
        self.src == id || self.dst == id
    }
}

/// Full copy of the graph, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl GraphSnapshot {
    /// Parse `{ "nodes": [...], "edges": [...] }`
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_slot_rules() {
        let undirected = EdgeRecord::new("A", "B", 5.0, false);
        assert!(undirected.same_slot("A", "B", false));
        assert!(undirected.same_slot("B", "A", false));
        assert!(undirected.same_slot("B", "A", true));

        let one_way = EdgeRecord::new("A", "B", 5.0, true);
        assert!(one_way.same_slot("A", "B", true));
        assert!(one_way.same_slot("B", "A", false));
        // Two opposite one-way roads are distinct edges
        assert!(!one_way.same_slot("B", "A", true));
    }

    #[test]
    fn test_connects_ignores_order() {
        let edge = EdgeRecord::new("A", "B", 1.0, true);
        assert!(edge.connects("A", "B"));
        assert!(edge.connects("B", "A"));
        assert!(!edge.connects("A", "C"));
    }

    #[test]
    fn test_snapshot_from_json_defaults() {
        let json = r#"{
            "nodes": [{ "id": "A", "x": 10, "y": 20 }, { "id": "B" }],
            "edges": [{ "src": "A", "dst": "B", "weight": 4.5 }]
        }"#;
        let snapshot = GraphSnapshot::from_json(json).unwrap();

        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[0].x, 10.0);
        assert_eq!(snapshot.nodes[1].y, 0.0);
        assert!(!snapshot.edges[0].directed);
        assert_eq!(snapshot.edges[0].weight, 4.5);
    }

    #[test]
    fn test_snapshot_from_json_rejects_garbage() {
        assert!(GraphSnapshot::from_json("{ nodes: oops").is_err());
    }
}
