//! pathtrace - graph path search with step-by-step animation traces
//!
//! # Architecture
//!
//! - **Graph store**: named nodes with positions, weighted edges (directed or not)
//! - **Adjacency index**: rebuilt per search, optionally with edges reversed
//! - **Search engines**: DFS, BFS, Dijkstra, Wave, Bidirectional Wave
//! - **Animation trace**: every engine records the steps it takes
//! - **Trace player**: folds steps into a highlight state at a fixed tempo
//! - **Session**: mutations that drop paths the edit made stale
//!
//! # Usage example
//!
//! ```no_run
//! use pathtrace::{GraphEngine, GraphStore, NodeRecord, EdgeRecord, Strategy, compute_path};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = GraphEngine::new();
//! engine.add_node(NodeRecord::new("A", 0.0, 0.0))?;
//! engine.add_node(NodeRecord::new("B", 40.0, 0.0))?;
//! engine.add_node(NodeRecord::new("C", 40.0, 30.0))?;
//! engine.upsert_edge(EdgeRecord::new("A", "B", 5.0, false))?;
//! engine.upsert_edge(EdgeRecord::new("B", "C", 3.0, false))?;
//!
//! if let Some((path, trace)) = compute_path(&engine, "A", "C", Strategy::Dijkstra, false) {
//!     println!("{:?} (distance {}) in {} steps", path.nodes, path.distance, trace.step_count());
//!     let state = trace.replay();
//!     println!("Visited {} nodes", state.visited_nodes.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod graph;
pub mod storage;
pub mod error;
pub mod trace;
pub mod session;

pub use graph::{GraphStore, GraphEngine, EdgeUpsert, AdjacencyIndex, Neighbor};
pub use graph::{compute_path, try_compute_path, PathResult, Strategy};
pub use storage::{NodeRecord, EdgeRecord, GraphSnapshot};
pub use storage::delta::Delta;
pub use error::{GraphError, Result};

// Re-export типов анимации
pub use trace::{
    apply_step, AnimationStep, AnimationTrace, HighlightState, PlaybackSpeed, PlayerStatus,
    StepAction, TracePlayer, Ticker, TickControl, WaveColor,
};
pub use session::{ComputedPath, Session};
