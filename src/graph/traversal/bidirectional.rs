//! Bidirectional wave search
//!
//! Two wave fronts take turns: one layer forward from the start, then one
//! layer backward from the end (along incoming edges), until one of them
//! touches a node the other has already visited.

use crate::graph::AdjacencyIndex;
use crate::trace::TraceRecorder;
use super::wave::{Expansion, WaveFront};
use super::{path_distance, PathResult, SearchOutcome};

/// `forward` is the traversal adjacency; `backward` must be built with the
/// opposite reverse flag so that its entries are the forward edges flipped.
pub fn search(
    forward: &AdjacencyIndex,
    backward: &AdjacencyIndex,
    start: &str,
    end: &str,
) -> SearchOutcome {
    let mut recorder = TraceRecorder::new();
    if start == end || !forward.contains(start) || !forward.contains(end) {
        return (None, recorder.finish());
    }

    let mut ahead = WaveFront::new(start, false);
    let mut behind = WaveFront::new(end, true);
    recorder.visit(start, &[start.to_string()]);
    recorder.visit(end, &[end.to_string()]);

    let meeting = loop {
        if ahead.is_exhausted() && behind.is_exhausted() {
            tracing::debug!("Bidirectional wave {} -> {}: fronts exhausted", start, end);
            return (None, recorder.finish());
        }

        if !ahead.is_exhausted() {
            let outcome = ahead.expand(forward, |n| behind.visited.contains(n), true, &mut recorder);
            if let Expansion::Met(node) = outcome {
                break node;
            }
        }

        if !behind.is_exhausted() {
            let outcome = behind.expand(backward, |n| ahead.visited.contains(n), true, &mut recorder);
            if let Expansion::Met(node) = outcome {
                break node;
            }
        }
    };

    let (Some(head), Some(tail)) = (ahead.path_to(&meeting), behind.path_to(&meeting)) else {
        tracing::error!("Bidirectional wave: broken predecessor chain at {}", meeting);
        return (None, recorder.finish());
    };

    // head is start..=meeting; tail is end..=meeting, so flip it and drop
    // the meeting node it shares with head
    let mut nodes = head.clone();
    nodes.extend(tail.into_iter().rev().skip(1));

    // Both fronts kept their own distance tables; recompute from real edges
    let Some(distance) = path_distance(forward, &nodes) else {
        tracing::error!("Bidirectional wave: path {:?} uses a missing edge", nodes);
        return (None, recorder.finish());
    };

    recorder.meet(&meeting, &head);
    recorder.reveal(&nodes);
    (Some(PathResult { nodes, distance }), recorder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{NodeRecord, EdgeRecord};
    use crate::trace::StepAction;

    fn build(names: &[&str], edges: &[(&str, &str, f64, bool)]) -> (AdjacencyIndex, AdjacencyIndex) {
        let nodes: Vec<NodeRecord> = names.iter().map(|n| NodeRecord::new(*n, 0.0, 0.0)).collect();
        let edges: Vec<EdgeRecord> = edges
            .iter()
            .map(|(a, b, w, d)| EdgeRecord::new(*a, *b, *w, *d))
            .collect();
        (
            AdjacencyIndex::build(&nodes, &edges, false),
            AdjacencyIndex::build(&nodes, &edges, true),
        )
    }

    #[test]
    fn test_meets_in_the_middle_of_a_chain() {
        let (fwd, bwd) = build(
            &["A", "B", "C", "D", "E"],
            &[("A", "B", 1.0, false), ("B", "C", 2.0, false), ("C", "D", 3.0, false), ("D", "E", 4.0, false)],
        );
        let (path, trace) = search(&fwd, &bwd, "A", "E");
        let path = path.unwrap();

        assert_eq!(path.nodes, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(path.distance, 10.0);

        let steps = trace.steps();
        let n = steps.len();
        // forward {B}, backward {D}, forward {C}; the backward front then
        // discovers C, which the forward front already holds
        assert!(matches!(steps[n - 2].action, StepAction::Meet { ref node } if node == "C"));
        assert_eq!(steps[n - 2].partial_path, vec!["A", "B", "C"]);
        assert_eq!(steps[n - 1].action, StepAction::RevealPath);
        assert_eq!(steps[n - 1].partial_path, path.nodes);
    }

    #[test]
    fn test_follows_one_way_edges() {
        // Backward front must walk incoming edges: E <- D <- C <- B <- A
        let (fwd, bwd) = build(
            &["A", "B", "C", "D", "E"],
            &[("A", "B", 1.0, true), ("B", "C", 1.0, true), ("C", "D", 1.0, true), ("D", "E", 1.0, true)],
        );
        let path = search(&fwd, &bwd, "A", "E").0.unwrap();
        assert_eq!(path.nodes, vec!["A", "B", "C", "D", "E"]);

        assert!(search(&fwd, &bwd, "E", "A").0.is_none());
    }

    #[test]
    fn test_both_directions_tagged() {
        let (fwd, bwd) = build(
            &["A", "B", "C", "D"],
            &[("A", "B", 1.0, false), ("B", "C", 1.0, false), ("C", "D", 1.0, false)],
        );
        let (_, trace) = search(&fwd, &bwd, "A", "D");
        let backward_waves = trace
            .iter()
            .filter(|s| matches!(s.action, StepAction::WaveExpand { is_backward: true, .. }))
            .count();
        let forward_waves = trace
            .iter()
            .filter(|s| matches!(s.action, StepAction::WaveExpand { is_backward: false, .. }))
            .count();
        // forward {B}, backward {C}, forward {C} cut short by the meeting
        assert_eq!(forward_waves, 2);
        assert_eq!(backward_waves, 1);
    }

    #[test]
    fn test_disconnected_is_no_result() {
        let (fwd, bwd) = build(&["A", "B", "C", "D"], &[("A", "B", 1.0, false), ("C", "D", 1.0, false)]);
        let (path, trace) = search(&fwd, &bwd, "A", "D");
        assert!(path.is_none());
        assert!(!trace.iter().any(|s| matches!(s.action, StepAction::Meet { .. })));
    }
}
