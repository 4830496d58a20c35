//! Breadth-first search: fewest hops, weight reported for information only

use std::collections::{HashSet, VecDeque};

use crate::graph::AdjacencyIndex;
use crate::trace::TraceRecorder;
use super::{PathResult, SearchOutcome};

pub fn search(adjacency: &AdjacencyIndex, start: &str, end: &str) -> SearchOutcome {
    let mut recorder = TraceRecorder::new();
    if start == end || !adjacency.contains(start) || !adjacency.contains(end) {
        return (None, recorder.finish());
    }

    // Nodes are marked at enqueue time so nothing is queued twice
    let mut visited: HashSet<&str> = HashSet::from([start]);
    let mut queue: VecDeque<(&str, Vec<String>, f64)> = VecDeque::new();

    let root = vec![start.to_string()];
    recorder.visit(start, &root);
    queue.push_back((start, root, 0.0));

    while let Some((node, path, distance)) = queue.pop_front() {
        if node == end {
            recorder.reveal(&path);
            return (Some(PathResult { nodes: path, distance }), recorder.finish());
        }

        // Добавляем соседей в очередь
        for neighbor in adjacency.neighbors(node) {
            if !visited.insert(neighbor.id.as_str()) {
                continue;
            }
            recorder.probe(node, &neighbor.id, &path);

            let mut next = path.clone();
            next.push(neighbor.id.clone());
            recorder.visit(&neighbor.id, &next);
            queue.push_back((neighbor.id.as_str(), next, distance + neighbor.weight));
        }
    }

    (None, recorder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{NodeRecord, EdgeRecord};
    use crate::trace::StepAction;

    fn triangle() -> AdjacencyIndex {
        let nodes: Vec<NodeRecord> = ["A", "B", "C"].iter().map(|n| NodeRecord::new(*n, 0.0, 0.0)).collect();
        let edges = vec![
            EdgeRecord::new("A", "B", 5.0, false),
            EdgeRecord::new("B", "C", 3.0, false),
            EdgeRecord::new("A", "C", 10.0, false),
        ];
        AdjacencyIndex::build(&nodes, &edges, false)
    }

    #[test]
    fn test_bfs_prefers_fewer_hops() {
        let (path, _) = search(&triangle(), "A", "C");
        let path = path.unwrap();
        assert_eq!(path.nodes, vec!["A", "C"]);
        assert_eq!(path.distance, 10.0);
    }

    #[test]
    fn test_bfs_probe_then_visit_per_discovery() {
        let (_, trace) = search(&triangle(), "A", "C");
        let actions: Vec<StepAction> = trace.iter().map(|s| s.action.clone()).collect();

        assert_eq!(
            actions,
            vec![
                StepAction::Visit { node: "A".into() },
                StepAction::Probe { from: "A".into(), to: "B".into() },
                StepAction::Visit { node: "B".into() },
                StepAction::Probe { from: "A".into(), to: "C".into() },
                StepAction::Visit { node: "C".into() },
                // B is dequeued before C but has nothing new to discover
                StepAction::RevealPath,
            ]
        );
        assert_eq!(trace.step_at(4).unwrap().partial_path, vec!["A", "C"]);
    }

    #[test]
    fn test_bfs_respects_direction() {
        let nodes: Vec<NodeRecord> = ["A", "B"].iter().map(|n| NodeRecord::new(*n, 0.0, 0.0)).collect();
        let edges = vec![EdgeRecord::new("B", "A", 1.0, true)];
        let adj = AdjacencyIndex::build(&nodes, &edges, false);

        assert!(search(&adj, "A", "B").0.is_none());
        assert!(search(&adj, "B", "A").0.is_some());
    }
}
