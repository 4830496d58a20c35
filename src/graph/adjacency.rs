//! Directed adjacency index derived from the edge list

use std::collections::HashMap;

use crate::storage::{NodeRecord, EdgeRecord};

/// One outgoing entry in the adjacency index
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub id: String,
    pub weight: f64,
}

/// node id -> ordered outgoing neighbors.
///
/// Entry order is edge insertion order (reversed when built in reverse
/// mode). Traversals rely on it for tie-breaks, so the index is never
/// mutated after `build`.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex {
    entries: HashMap<String, Vec<Neighbor>>,
    // Node ids in insertion order, for deterministic scans
    order: Vec<String>,
    reversed: bool,
}

impl AdjacencyIndex {
    /// Build the index in O(E).
    ///
    /// Each edge contributes `src -> dst`, plus `dst -> src` when undirected.
    /// With `reverse` set the endpoints swap roles first, and every
    /// neighbor list is reversed afterwards.
    pub fn build(nodes: &[NodeRecord], edges: &[EdgeRecord], reverse: bool) -> Self {
        let mut index = Self {
            entries: HashMap::with_capacity(nodes.len()),
            order: Vec::with_capacity(nodes.len()),
            reversed: reverse,
        };
        for node in nodes {
            index.ensure(&node.id);
        }

        for edge in edges {
            let (source, target) = if reverse {
                (&edge.dst, &edge.src)
            } else {
                (&edge.src, &edge.dst)
            };

            index.ensure(target);
            index.ensure(source).push(Neighbor {
                id: target.clone(),
                weight: edge.weight,
            });

            if !edge.directed {
                index.ensure(target).push(Neighbor {
                    id: source.clone(),
                    weight: edge.weight,
                });
            }
        }

        if reverse {
            for list in index.entries.values_mut() {
                list.reverse();
            }
        }

        index
    }

    fn ensure(&mut self, id: &str) -> &mut Vec<Neighbor> {
        if !self.entries.contains_key(id) {
            self.order.push(id.to_string());
        }
        self.entries.entry(id.to_string()).or_default()
    }

    /// Node ids in insertion order
    pub fn node_ids(&self) -> &[String] {
        &self.order
    }

    /// Outgoing neighbors of `id`; empty for unknown ids
    pub fn neighbors(&self, id: &str) -> &[Neighbor] {
        self.entries.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Weight of the `from -> to` entry, if traversable
    pub fn weight(&self, from: &str, to: &str) -> Option<f64> {
        self.neighbors(from)
            .iter()
            .find(|n| n.id == to)
            .map(|n| n.weight)
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
