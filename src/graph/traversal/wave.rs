//! Wave search: BFS that expands a whole layer per step
//!
//! Each layer becomes a single `WaveExpand` step so the animation shows
//! the frontier moving at once. Distances are accumulated in discovery
//! order, so on graphs with uneven weights the reported distance is the
//! weight of the fewest-hops path found, not the shortest distance.
//! That is what the animation depicts; use Dijkstra for shortest paths.

use std::collections::{HashMap, HashSet};

use crate::graph::AdjacencyIndex;
use crate::trace::TraceRecorder;
use super::{reconstruct, PathResult, SearchOutcome};

/// Result of expanding one layer
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expansion {
    /// Frontier moved on, nothing met
    Continue,
    /// Frontier is empty
    Exhausted,
    /// Hit a node accepted by the meet predicate
    Met(String),
}

/// One growing frontier with its bookkeeping
#[derive(Debug)]
pub(crate) struct WaveFront {
    pub origin: String,
    pub visited: HashSet<String>,
    pub predecessor: HashMap<String, String>,
    pub distance: HashMap<String, f64>,
    queue: Vec<String>,
    wave_index: usize,
    is_backward: bool,
}

impl WaveFront {
    pub fn new(origin: &str, is_backward: bool) -> Self {
        Self {
            origin: origin.to_string(),
            visited: HashSet::from([origin.to_string()]),
            predecessor: HashMap::new(),
            distance: HashMap::from([(origin.to_string(), 0.0)]),
            queue: vec![origin.to_string()],
            wave_index: 0,
            is_backward,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }

    /// Expand the current layer.
    ///
    /// `meets` is checked for every dequeued node, and also for every newly
    /// discovered node when `check_discovery` is set. The `WaveExpand` step
    /// is emitted even when the layer is cut short by a meeting.
    pub fn expand<F>(
        &mut self,
        adjacency: &AdjacencyIndex,
        meets: F,
        check_discovery: bool,
        recorder: &mut TraceRecorder,
    ) -> Expansion
    where
        F: Fn(&str) -> bool,
    {
        let current_wave = std::mem::take(&mut self.queue);
        if let Some(hit) = current_wave.iter().find(|n| meets(n)) {
            return Expansion::Met(hit.clone());
        }

        let mut next_wave = Vec::new();
        let mut wave_edges = Vec::new();
        let mut met = None;

        'wave: for node in &current_wave {
            let base = self.distance.get(node).copied().unwrap_or(0.0);
            for neighbor in adjacency.neighbors(node) {
                if !self.visited.insert(neighbor.id.clone()) {
                    continue;
                }
                self.distance.insert(neighbor.id.clone(), base + neighbor.weight);
                self.predecessor.insert(neighbor.id.clone(), node.clone());
                next_wave.push(neighbor.id.clone());
                wave_edges.push((node.clone(), neighbor.id.clone()));

                if check_discovery && meets(&neighbor.id) {
                    met = Some(neighbor.id.clone());
                    break 'wave;
                }
            }
        }

        if !next_wave.is_empty() {
            recorder.wave(next_wave.clone(), wave_edges, self.wave_index, self.is_backward);
            self.wave_index += 1;
        }
        self.queue = next_wave;

        match met {
            Some(node) => Expansion::Met(node),
            None if self.queue.is_empty() => Expansion::Exhausted,
            None => Expansion::Continue,
        }
    }

    /// Path from the origin to `node` along this front's predecessors
    pub fn path_to(&self, node: &str) -> Option<Vec<String>> {
        reconstruct(&self.predecessor, &self.origin, node)
    }
}

pub fn search(adjacency: &AdjacencyIndex, start: &str, end: &str) -> SearchOutcome {
    let mut recorder = TraceRecorder::new();
    if start == end || !adjacency.contains(start) || !adjacency.contains(end) {
        return (None, recorder.finish());
    }

    let mut front = WaveFront::new(start, false);
    recorder.visit(start, &[start.to_string()]);

    // The target only counts once its layer is dequeued
    loop {
        match front.expand(adjacency, |n| n == end, false, &mut recorder) {
            Expansion::Met(_) => break,
            Expansion::Continue => continue,
            Expansion::Exhausted => return (None, recorder.finish()),
        }
    }

    let found = front.path_to(end).map(|nodes| PathResult {
        nodes,
        distance: front.distance.get(end).copied().unwrap_or(0.0),
    });
    if let Some(ref result) = found {
        recorder.reveal(&result.nodes);
    }
    (found, recorder.finish())
}
