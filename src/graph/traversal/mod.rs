//! Path search strategies
//!
//! Every strategy works on an [`AdjacencyIndex`] and returns the path it
//! found (if any) together with the [`AnimationTrace`] of how it got
//! there. Neighbor order in the index decides all tie-breaks, so the same
//! graph and flags always produce the same trace.
//!
//! | Strategy            | Guarantees                                  |
//! |---------------------|---------------------------------------------|
//! | `Dfs`               | some path, first found in adjacency order   |
//! | `Bfs`               | fewest hops                                 |
//! | `Dijkstra`          | least total weight                          |
//! | `Wave`              | fewest hops; distance is discovery order    |
//! | `BidirectionalWave` | some path; distance recomputed from edges   |

pub mod dfs;
pub mod bfs;
pub mod dijkstra;
pub mod wave;
pub mod bidirectional;


use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::trace::AnimationTrace;
use super::{AdjacencyIndex, GraphStore};

/// Search strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
    Dfs,
    Bfs,
    #[default]
    Dijkstra,
    Wave,
    BidirectionalWave,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Dfs,
        Strategy::Bfs,
        Strategy::Dijkstra,
        Strategy::Wave,
        Strategy::BidirectionalWave,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Dfs => "dfs",
            Strategy::Bfs => "bfs",
            Strategy::Dijkstra => "dijkstra",
            Strategy::Wave => "wave",
            Strategy::BidirectionalWave => "bidirectional-wave",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == normalized)
            .or(match normalized.as_str() {
                "bidirectional" | "bidi" => Some(Strategy::BidirectionalWave),
                _ => None,
            })
            .ok_or_else(|| format!("Unknown strategy: {}", s))
    }
}

/// A found path, start..=end inclusive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    pub nodes: Vec<String>,
    /// Sum of traversed edge weights
    pub distance: f64,
}

impl PathResult {
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }

    /// Whether `a` and `b` are consecutive on the path, in either order
    pub fn uses_edge(&self, a: &str, b: &str) -> bool {
        self.nodes
            .windows(2)
            .any(|w| (w[0] == a && w[1] == b) || (w[0] == b && w[1] == a))
    }
}

/// Raw engine output: the trace is kept even when nothing was found
pub type SearchOutcome = (Option<PathResult>, AnimationTrace);

/// Run a strategy on a prepared adjacency index.
///
/// `backward` is only read by the bidirectional strategy: it must be the
/// index built with the opposite reverse flag, i.e. incoming edges.
pub fn run_strategy(
    strategy: Strategy,
    forward: &AdjacencyIndex,
    backward: &AdjacencyIndex,
    start: &str,
    end: &str,
) -> SearchOutcome {
    match strategy {
        Strategy::Dfs => dfs::search(forward, start, end),
        Strategy::Bfs => bfs::search(forward, start, end),
        Strategy::Dijkstra => dijkstra::search(forward, start, end),
        Strategy::Wave => wave::search(forward, start, end),
        Strategy::BidirectionalWave => bidirectional::search(forward, backward, start, end),
    }
}

/// Compute a path, distinguishing why there is none
pub fn try_compute_path<G: GraphStore + ?Sized>(
    graph: &G,
    start: &str,
    end: &str,
    strategy: Strategy,
    reverse: bool,
) -> Result<(PathResult, AnimationTrace)> {
    if start == end {
        return Err(GraphError::InvalidSelection(format!("start and end are both {}", start)));
    }
    for endpoint in [start, end] {
        if !graph.node_exists(endpoint) {
            return Err(GraphError::InvalidSelection(format!("{} is not in the graph", endpoint)));
        }
    }

    let forward = graph.adjacency(reverse);
    let backward = if strategy == Strategy::BidirectionalWave {
        graph.adjacency(!reverse)
    } else {
        AdjacencyIndex::default()
    };

    let (path, trace) = run_strategy(strategy, &forward, &backward, start, end);
    tracing::debug!(
        "{} {} -> {} (reverse={}): {} steps",
        strategy, start, end, reverse, trace.step_count()
    );

    match path {
        Some(path) => {
            tracing::info!(
                "{} found {} hops, distance {}",
                strategy, path.hops(), path.distance
            );
            Ok((path, trace))
        }
        None => Err(GraphError::UnreachableTarget {
            start: start.to_string(),
            end: end.to_string(),
        }),
    }
}

/// Compute a path; every failure is "no result"
pub fn compute_path<G: GraphStore + ?Sized>(
    graph: &G,
    start: &str,
    end: &str,
    strategy: Strategy,
    reverse: bool,
) -> Option<(PathResult, AnimationTrace)> {
    match try_compute_path(graph, start, end, strategy, reverse) {
        Ok(found) => Some(found),
        Err(e) => {
            tracing::info!("{}: no result ({})", strategy, e);
            None
        }
    }
}

/// Walk predecessors back from `end`. None if the chain never reaches `start`.
pub(crate) fn reconstruct(
    predecessor: &HashMap<String, String>,
    start: &str,
    end: &str,
) -> Option<Vec<String>> {
    let mut path = vec![end.to_string()];
    let mut current = end;
    while current != start {
        current = predecessor.get(current)?.as_str();
        path.push(current.to_string());
        // A chain longer than the map means a cycle
        if path.len() > predecessor.len() + 1 {
            return None;
        }
    }
    path.reverse();
    Some(path)
}

/// Sum edge weights along `path` using the live adjacency
pub(crate) fn path_distance(adjacency: &AdjacencyIndex, path: &[String]) -> Option<f64> {
    path.windows(2)
        .map(|pair| adjacency.weight(&pair[0], &pair[1]))
        .sum()
}
