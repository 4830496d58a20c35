//! Depth-first search
//!
//! Returns the first path found in adjacency order. It is not the fewest
//! hops nor the least weight, and is not meant to be: the trace shows
//! plain DFS behavior, backtracking included.

use std::collections::HashSet;

use crate::graph::AdjacencyIndex;
use crate::trace::TraceRecorder;
use super::{PathResult, SearchOutcome};

struct Dfs<'a> {
    adjacency: &'a AdjacencyIndex,
    end: &'a str,
    visited: HashSet<&'a str>,
    // Current root-to-node path; each frame pushes on entry and pops on backtrack
    path: Vec<String>,
    recorder: TraceRecorder,
}

impl<'a> Dfs<'a> {
    /// Returns the distance to `end` if reached through `node`
    fn explore(&mut self, node: &'a str, distance: f64) -> Option<f64> {
        self.visited.insert(node);
        self.path.push(node.to_string());
        self.recorder.visit(node, &self.path);

        if node == self.end {
            return Some(distance);
        }

        let adjacency = self.adjacency;
        for neighbor in adjacency.neighbors(node) {
            if self.visited.contains(neighbor.id.as_str()) {
                continue;
            }
            self.recorder.probe(node, &neighbor.id, &self.path);
            if let Some(total) = self.explore(&neighbor.id, distance + neighbor.weight) {
                return Some(total);
            }
        }

        // Все соседи исчерпаны, откатываемся
        self.path.pop();
        self.recorder.backtrack(node, &self.path);
        None
    }
}

pub fn search(adjacency: &AdjacencyIndex, start: &str, end: &str) -> SearchOutcome {
    let mut dfs = Dfs {
        adjacency,
        end,
        visited: HashSet::new(),
        path: Vec::new(),
        recorder: TraceRecorder::new(),
    };

    if start == end || !adjacency.contains(start) || !adjacency.contains(end) {
        return (None, dfs.recorder.finish());
    }

    let found = dfs.explore(start, 0.0).map(|distance| PathResult {
        nodes: dfs.path.clone(),
        distance,
    });
    if let Some(ref result) = found {
        dfs.recorder.reveal(&result.nodes);
    }
    (found, dfs.recorder.finish())
}
