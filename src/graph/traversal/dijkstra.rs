//! Dijkstra shortest path
//!
//! Uses a linear scan for the next node instead of a heap: O(V²), which is
//! nothing for city-sized graphs and keeps every iteration easy to follow
//! in the trace. Weights must be non-negative; the store only accepts
//! positive ones.

use std::collections::{HashMap, HashSet};

use crate::graph::AdjacencyIndex;
use crate::trace::TraceRecorder;
use super::{reconstruct, PathResult, SearchOutcome};

pub fn search(adjacency: &AdjacencyIndex, start: &str, end: &str) -> SearchOutcome {
    let mut recorder = TraceRecorder::new();
    if start == end || !adjacency.contains(start) || !adjacency.contains(end) {
        return (None, recorder.finish());
    }

    let mut distance: HashMap<&str, f64> = adjacency
        .node_ids()
        .iter()
        .map(|id| (id.as_str(), f64::INFINITY))
        .collect();
    distance.insert(start, 0.0);
    let mut predecessor: HashMap<String, String> = HashMap::new();
    let mut finalized: HashSet<&str> = HashSet::new();

    recorder.visit(start, &[start.to_string()]);

    loop {
        // Closest unfinalized node; ties go to the earliest inserted node
        let mut current: Option<(&str, f64)> = None;
        for id in adjacency.node_ids() {
            let id = id.as_str();
            if finalized.contains(id) {
                continue;
            }
            let d = distance[id];
            if d.is_finite() && current.map_or(true, |(_, best)| d < best) {
                current = Some((id, d));
            }
        }

        let Some((node, node_distance)) = current else {
            break;
        };
        if node == end {
            break;
        }
        finalized.insert(node);

        let node_path = reconstruct(&predecessor, start, node).unwrap_or_default();
        for neighbor in adjacency.neighbors(node) {
            let id = neighbor.id.as_str();
            if finalized.contains(id) {
                continue;
            }
            recorder.probe(node, id, &node_path);

            let candidate = node_distance + neighbor.weight;
            if candidate < distance[id] {
                distance.insert(id, candidate);
                predecessor.insert(id.to_string(), node.to_string());

                let mut relaxed_path = node_path.clone();
                relaxed_path.push(id.to_string());
                recorder.visit(id, &relaxed_path);
            }
        }
    }

    let found = reconstruct(&predecessor, start, end).map(|nodes| PathResult {
        nodes,
        distance: distance[end],
    });
    if let Some(ref result) = found {
        recorder.reveal(&result.nodes);
    }
    (found, recorder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{NodeRecord, EdgeRecord};
    use crate::trace::StepAction;

    fn build(names: &[&str], edges: &[(&str, &str, f64, bool)]) -> AdjacencyIndex {
        let nodes: Vec<NodeRecord> = names.iter().map(|n| NodeRecord::new(*n, 0.0, 0.0)).collect();
        let edges: Vec<EdgeRecord> = edges
            .iter()
            .map(|(a, b, w, directed)| EdgeRecord::new(*a, *b, *w, *directed))
            .collect();
        AdjacencyIndex::build(&nodes, &edges, false)
    }

    #[test]
    fn test_dijkstra_least_weight() {
        let adj = build(
            &["A", "B", "C"],
            &[("A", "B", 5.0, false), ("B", "C", 3.0, false), ("A", "C", 10.0, false)],
        );
        let (path, trace) = search(&adj, "A", "C");
        let path = path.unwrap();

        assert_eq!(path.nodes, vec!["A", "B", "C"]);
        assert_eq!(path.distance, 8.0);
        assert_eq!(trace.steps().last().unwrap().partial_path, path.nodes);
    }

    #[test]
    fn test_rejected_relaxations_are_probed_not_visited() {
        let adj = build(
            &["A", "B", "C"],
            &[("A", "B", 5.0, false), ("B", "C", 3.0, false), ("A", "C", 10.0, false)],
        );
        let (_, trace) = search(&adj, "A", "C");

        let visits_to_c = trace
            .iter()
            .filter(|s| s.action == StepAction::Visit { node: "C".into() })
            .count();
        // A relaxes C to 10, then B improves it to 8
        assert_eq!(visits_to_c, 2);

        // From B, A is finalized and never probed
        assert!(!trace.iter().any(|s| s.action == StepAction::Probe { from: "B".into(), to: "A".into() }));
    }

    #[test]
    fn test_dijkstra_probe_without_improvement() {
        // A-C (1) is found first; B's edge to C (5) cannot improve it
        let adj = build(
            &["A", "B", "C", "D"],
            &[("A", "C", 1.0, false), ("A", "B", 1.0, false), ("B", "C", 5.0, false), ("C", "D", 1.0, false)],
        );
        let (path, trace) = search(&adj, "A", "D");
        assert_eq!(path.unwrap().nodes, vec!["A", "C", "D"]);

        // B ties with C at distance 1 and wins (inserted earlier), so B -> C
        // is probed but rejected: 6 is not better than 1
        let probe = StepAction::Probe { from: "B".into(), to: "C".into() };
        let idx = trace.iter().position(|s| s.action == probe).unwrap();
        assert_ne!(trace.step_at(idx + 1).unwrap().action, StepAction::Visit { node: "C".into() });

        let visits_to_c = trace
            .iter()
            .filter(|s| s.action == StepAction::Visit { node: "C".into() })
            .count();
        assert_eq!(visits_to_c, 1);
    }

    #[test]
    fn test_dijkstra_unreachable() {
        let adj = build(&["A", "B", "C"], &[("A", "B", 1.0, true)]);
        let (path, trace) = search(&adj, "A", "C");
        assert!(path.is_none());
        assert!(!trace.iter().any(|s| s.action == StepAction::RevealPath));
    }
}
