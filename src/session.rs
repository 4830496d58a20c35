//! Session: the mutation service plus the current selection, path and player
//!
//! All graph edits go through here so that anything computed from the old
//! graph (path, trace, playback position) is dropped when it stops being
//! true.

use serde::Serialize;

use crate::error::Result;
use crate::graph::{try_compute_path, EdgeUpsert, GraphEngine, GraphStore, PathResult, Strategy};
use crate::storage::{NodeRecord, EdgeRecord, GraphSnapshot};
use crate::trace::{AnimationTrace, HighlightState, PlaybackSpeed, TracePlayer};

/// Result of the last successful search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedPath {
    pub strategy: Strategy,
    pub start: String,
    pub end: String,
    pub reverse: bool,
    pub path: PathResult,
    pub trace: AnimationTrace,
}

pub struct Session {
    graph: GraphEngine,
    start: Option<String>,
    end: Option<String>,
    reverse_traversal: bool,
    speed: PlaybackSpeed,
    computed: Option<ComputedPath>,
    player: Option<TracePlayer>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GraphEngine::new())
    }
}

impl Session {
    pub fn new(graph: GraphEngine) -> Self {
        let mut session = Self {
            graph,
            start: None,
            end: None,
            reverse_traversal: false,
            speed: PlaybackSpeed::default(),
            computed: None,
            player: None,
        };
        session.fill_selection();
        session
    }

    pub fn graph(&self) -> &GraphEngine {
        &self.graph
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.graph.snapshot()
    }

    // === SELECTION ===

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }

    /// Set both endpoints. Unknown ids are stored as-is; the next search
    /// reports them as an invalid selection.
    pub fn select(&mut self, start: Option<String>, end: Option<String>) {
        if start != self.start || end != self.end {
            self.start = start;
            self.end = end;
            self.invalidate("selection changed");
        }
    }

    pub fn reverse_traversal(&self) -> bool {
        self.reverse_traversal
    }

    /// A stored path only holds for the flag it was searched with
    pub fn set_reverse_traversal(&mut self, reverse: bool) {
        if reverse != self.reverse_traversal {
            self.reverse_traversal = reverse;
            self.invalidate("traversal direction changed");
        }
    }

    /// Give unset endpoints the first node that is not the other endpoint
    fn fill_selection(&mut self) {
        if self.start.is_none() {
            let end = self.end.clone();
            self.start = self
                .graph
                .nodes()
                .iter()
                .find(|n| Some(&n.id) != end.as_ref())
                .map(|n| n.id.clone());
        }
        if self.end.is_none() {
            let start = self.start.clone();
            self.end = self
                .graph
                .nodes()
                .iter()
                .find(|n| Some(&n.id) != start.as_ref())
                .map(|n| n.id.clone());
        }
    }

    // === MUTATIONS ===

    pub fn add_node(&mut self, id: impl Into<String>, x: f64, y: f64) -> Result<GraphSnapshot> {
        self.add_node_record(NodeRecord::new(id, x, y))
    }

    pub fn add_node_record(&mut self, node: NodeRecord) -> Result<GraphSnapshot> {
        let id = node.id.clone();
        self.graph.add_node(node)?;
        tracing::info!("Added node {}", id);
        self.stop_playback();
        self.fill_selection();
        Ok(self.snapshot())
    }

    /// Reposition a node. Positions never reach traversal, so the path
    /// and the playback position stay as they are.
    pub fn move_node(&mut self, id: &str, x: f64, y: f64) -> GraphSnapshot {
        self.graph.move_node(id, x, y);
        self.snapshot()
    }

    pub fn delete_node(&mut self, id: &str) -> GraphSnapshot {
        if self.graph.delete_node(id).is_none() {
            return self.snapshot();
        }
        self.stop_playback();

        let was_endpoint = self.start.as_deref() == Some(id) || self.end.as_deref() == Some(id);
        let on_path = self
            .computed
            .as_ref()
            .map_or(false, |c| c.path.contains_node(id));
        if was_endpoint || on_path {
            self.invalidate("node deleted");
        }

        if self.start.as_deref() == Some(id) {
            self.start = None;
        }
        if self.end.as_deref() == Some(id) {
            self.end = None;
        }
        self.fill_selection();
        self.snapshot()
    }

    pub fn add_edge(&mut self, src: &str, dst: &str, weight: f64, directed: bool) -> Result<GraphSnapshot> {
        let outcome = self.graph.upsert_edge(EdgeRecord::new(src, dst, weight, directed))?;
        tracing::info!("{:?} edge {} -> {} (weight {}, directed {})", outcome, src, dst, weight, directed);
        self.stop_playback();

        let on_path = self
            .computed
            .as_ref()
            .map_or(false, |c| c.path.uses_edge(src, dst));
        if outcome == EdgeUpsert::Updated && on_path {
            self.invalidate("edge on path updated");
        }
        Ok(self.snapshot())
    }

    pub fn delete_edge(&mut self, src: &str, dst: &str) -> GraphSnapshot {
        if self.graph.delete_edge(src, dst).is_none() {
            return self.snapshot();
        }
        self.stop_playback();

        let on_path = self
            .computed
            .as_ref()
            .map_or(false, |c| c.path.uses_edge(src, dst));
        if on_path {
            self.invalidate("edge on path deleted");
        }
        self.snapshot()
    }

    /// Replace the whole graph
    pub fn load(&mut self, snapshot: GraphSnapshot) -> Result<GraphSnapshot> {
        let graph = GraphEngine::from_records(snapshot.nodes, snapshot.edges)?;
        self.graph = graph;
        self.start = None;
        self.end = None;
        self.invalidate("graph replaced");
        self.fill_selection();
        Ok(self.snapshot())
    }

    pub fn clear(&mut self) -> GraphSnapshot {
        self.graph.clear();
        self.start = None;
        self.end = None;
        self.invalidate("graph cleared");
        self.snapshot()
    }

    // === SEARCH ===

    /// Search between the selected endpoints. A missing or equal selection,
    /// or no path, clears the previous result and returns None.
    pub fn compute(&mut self, strategy: Strategy) -> Option<&ComputedPath> {
        self.invalidate("new search");

        let (Some(start), Some(end)) = (self.start.clone(), self.end.clone()) else {
            tracing::info!("{}: no result (start or end not selected)", strategy);
            return None;
        };

        match try_compute_path(&self.graph, &start, &end, strategy, self.reverse_traversal) {
            Ok((path, trace)) => {
                self.player = Some(TracePlayer::new(trace.clone(), self.speed));
                self.computed = Some(ComputedPath {
                    strategy,
                    start,
                    end,
                    reverse: self.reverse_traversal,
                    path,
                    trace,
                });
                self.computed.as_ref()
            }
            Err(e) => {
                tracing::info!("{}: no result ({})", strategy, e);
                None
            }
        }
    }

    pub fn computed(&self) -> Option<&ComputedPath> {
        self.computed.as_ref()
    }

    pub fn trace(&self) -> Option<&AnimationTrace> {
        self.computed.as_ref().map(|c| &c.trace)
    }

    fn invalidate(&mut self, reason: &str) {
        if self.computed.take().is_some() {
            tracing::debug!("Cleared computed path: {}", reason);
        }
        self.player = None;
    }

    // === PLAYBACK ===

    pub fn player(&self) -> Option<&TracePlayer> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut TracePlayer> {
        self.player.as_mut()
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
        if let Some(player) = self.player.as_mut() {
            player.set_speed(speed);
        }
    }

    /// Current highlight; empty when nothing has been computed
    pub fn highlight(&self) -> HighlightState {
        self.player
            .as_ref()
            .map(|p| p.state().clone())
            .unwrap_or_default()
    }

    /// Structural edits make the applied highlight state meaningless
    fn stop_playback(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::trace::PlayerStatus;

    fn make_session() -> Session {
        let mut session = Session::default();
        session.add_node("A", 0.0, 0.0).unwrap();
        session.add_node("B", 10.0, 0.0).unwrap();
        session.add_node("C", 10.0, 10.0).unwrap();
        session.add_edge("A", "B", 5.0, false).unwrap();
        session.add_edge("B", "C", 3.0, false).unwrap();
        session.add_edge("A", "C", 10.0, false).unwrap();
        session.select(Some("A".into()), Some("C".into()));
        session
    }

    #[test]
    fn test_first_nodes_become_selection() {
        let mut session = Session::default();
        assert!(session.start().is_none());
        session.add_node("X", 0.0, 0.0).unwrap();
        assert_eq!(session.start(), Some("X"));
        assert!(session.end().is_none());
        session.add_node("Y", 0.0, 0.0).unwrap();
        assert_eq!(session.end(), Some("Y"));
    }

    #[test]
    fn test_compute_stores_path_and_player() {
        let mut session = make_session();
        let computed = session.compute(Strategy::Dijkstra).unwrap();
        assert_eq!(computed.path.nodes, vec!["A", "B", "C"]);
        assert_eq!(session.player().unwrap().status(), PlayerStatus::Idle);
    }

    #[test]
    fn test_delete_node_clears_path_through_it() {
        let mut session = make_session();
        session.compute(Strategy::Dfs).unwrap();

        let snapshot = session.delete_node("B");
        assert_eq!(snapshot.edges, vec![EdgeRecord::new("A", "C", 10.0, false)]);
        assert!(session.computed().is_none());
        assert!(session.player().is_none());
        assert_eq!(session.start(), Some("A"));
        assert_eq!(session.end(), Some("C"));
    }

    #[test]
    fn test_delete_endpoint_reassigns_selection() {
        let mut session = make_session();
        session.compute(Strategy::Bfs).unwrap();

        session.delete_node("A");
        assert!(session.computed().is_none());
        assert_eq!(session.start(), Some("B"));
        assert_eq!(session.end(), Some("C"));

        session.delete_node("B");
        session.delete_node("C");
        assert!(session.start().is_none());
        assert!(session.end().is_none());
    }

    #[test]
    fn test_delete_path_edge_clears_path() {
        let mut session = make_session();
        session.compute(Strategy::Dijkstra).unwrap();

        session.delete_edge("C", "B");
        assert!(session.computed().is_none());
    }

    #[test]
    fn test_delete_unrelated_edge_keeps_path() {
        let mut session = make_session();
        session.compute(Strategy::Dijkstra).unwrap();
        session.player_mut().unwrap().step_forward();

        session.delete_edge("A", "C");
        assert!(session.computed().is_some());
        // Playback restarts from the beginning
        let player = session.player().unwrap();
        assert_eq!(player.cursor(), 0);
        assert_eq!(player.state(), &HighlightState::default());
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut session = make_session();
        session.compute(Strategy::Dfs).unwrap();
        session.player_mut().unwrap().step_forward();

        session.delete_node("nope");
        session.delete_edge("A", "nope");
        assert!(session.computed().is_some());
        assert_eq!(session.player().unwrap().cursor(), 1);
    }

    #[test]
    fn test_updating_path_edge_clears_path() {
        let mut session = make_session();
        session.compute(Strategy::Dijkstra).unwrap();

        session.add_edge("A", "C", 12.0, false).unwrap();
        assert!(session.computed().is_some());

        session.add_edge("B", "C", 1.0, false).unwrap();
        assert!(session.computed().is_none());
    }

    #[test]
    fn test_add_edge_errors() {
        let mut session = make_session();
        assert!(matches!(session.add_edge("A", "B", 0.0, false), Err(GraphError::InvalidEdge { .. })));
        assert!(matches!(session.add_edge("A", "Q", 1.0, false), Err(GraphError::NodeNotFound(_))));
        assert!(matches!(session.add_node("A", 0.0, 0.0), Err(GraphError::DuplicateNodeName(_))));
    }

    #[test]
    fn test_additions_reset_playback() {
        let mut session = make_session();
        session.compute(Strategy::Dfs).unwrap();
        session.player_mut().unwrap().play();
        session.player_mut().unwrap().tick();

        session.add_node("D", 5.0, 5.0).unwrap();
        let player = session.player().unwrap();
        assert_eq!(player.cursor(), 0);
        assert_eq!(player.status(), PlayerStatus::Idle);
        assert!(session.computed().is_some());

        session.player_mut().unwrap().step_forward();
        let snapshot = session.add_edge("C", "D", 2.0, false).unwrap();
        assert_eq!(snapshot.edges.len(), 4);
        assert_eq!(session.player().unwrap().cursor(), 0);
        assert!(session.computed().is_some());
    }

    #[test]
    fn test_one_way_over_path_edge_reroutes() {
        let mut session = make_session();
        session.compute(Strategy::Dijkstra).unwrap();

        // B-C becomes one-way C -> B, so A -> B -> C is gone
        let snapshot = session.add_edge("C", "B", 3.0, true).unwrap();
        assert_eq!(snapshot.edges[1], EdgeRecord::new("C", "B", 3.0, true));
        assert!(session.computed().is_none());

        let computed = session.compute(Strategy::Dijkstra).unwrap();
        assert_eq!(computed.path.nodes, vec!["A", "C"]);
        assert_eq!(computed.path.distance, 10.0);
    }

    #[test]
    fn test_reverse_flag_change_clears_path() {
        let mut session = make_session();
        session.compute(Strategy::Bfs).unwrap();

        session.set_reverse_traversal(false);
        assert!(session.computed().is_some());

        session.set_reverse_traversal(true);
        assert!(session.computed().is_none());
        assert!(session.player().is_none());
        assert!(session.compute(Strategy::Bfs).unwrap().reverse);
    }

    #[test]
    fn test_move_node_keeps_playback() {
        let mut session = make_session();
        session.compute(Strategy::Wave).unwrap();
        session.player_mut().unwrap().step_forward();

        let snapshot = session.move_node("B", 99.0, 1.0);
        assert_eq!(snapshot.nodes[1].x, 99.0);
        assert_eq!(session.player().unwrap().cursor(), 1);
    }

    #[test]
    fn test_invalid_selection_gives_no_result() {
        let mut session = make_session();
        session.compute(Strategy::Bfs).unwrap();

        session.select(Some("A".into()), Some("A".into()));
        assert!(session.compute(Strategy::Bfs).is_none());
        assert!(session.computed().is_none());
        assert_eq!(session.highlight(), HighlightState::default());
    }

    #[test]
    fn test_load_replaces_graph() {
        let mut session = make_session();
        session.compute(Strategy::Dfs).unwrap();

        let snapshot = GraphSnapshot {
            nodes: vec![NodeRecord::new("P", 0.0, 0.0), NodeRecord::new("Q", 0.0, 0.0)],
            edges: vec![EdgeRecord::new("P", "Q", 2.0, true)],
        };
        session.load(snapshot.clone()).unwrap();

        assert_eq!(session.snapshot(), snapshot);
        assert!(session.computed().is_none());
        assert_eq!(session.start(), Some("P"));
        assert_eq!(session.end(), Some("Q"));
        assert_eq!(session.compute(Strategy::BidirectionalWave).unwrap().path.distance, 2.0);
    }
}
