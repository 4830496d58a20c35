//! Animation traces: the ordered log of decisions a search made
//!
//! A trace is produced once per search and then only read, by index, by
//! the [`player::TracePlayer`] or by any external renderer.

pub mod highlight;
pub mod player;
pub mod ticker;

use serde::{Deserialize, Serialize};

pub use highlight::{apply_step, HighlightState, WaveColor, WAVE_BUCKETS};
pub use player::{PlaybackSpeed, PlayerStatus, TracePlayer};
pub use ticker::{TickControl, Ticker};

/// What the algorithm did at one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StepAction {
    /// Node entered exploration
    Visit { node: String },
    /// Edge `from -> to` is being considered
    Probe { from: String, to: String },
    /// DFS ran out of neighbors at `node`
    Backtrack { node: String },
    /// A whole layer of a wave search, applied atomically
    #[serde(rename_all = "camelCase")]
    WaveExpand {
        frontier_nodes: Vec<String>,
        frontier_edges: Vec<(String, String)>,
        wave_index: usize,
        is_backward: bool,
    },
    /// Forward and backward frontiers met at `node`
    Meet { node: String },
    /// Final path is shown in full; the step's partial path is the result
    RevealPath,
}

/// One entry of a trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationStep {
    pub action: StepAction,
    /// Path known when this step happened (may be empty)
    pub partial_path: Vec<String>,
}

/// Immutable, replayable step log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationTrace {
    steps: Vec<AnimationStep>,
}

impl AnimationTrace {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step_at(&self, index: usize) -> Option<&AnimationStep> {
        self.steps.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[AnimationStep] {
        &self.steps
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnimationStep> {
        self.steps.iter()
    }

    /// Fold every step into a fresh highlight state
    pub fn replay(&self) -> HighlightState {
        self.steps.iter().fold(HighlightState::default(), apply_step)
    }
}

/// Append-only builder used by the traversal engines
#[derive(Debug, Default)]
pub(crate) struct TraceRecorder {
    steps: Vec<AnimationStep>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, action: StepAction, path: &[String]) {
        self.steps.push(AnimationStep {
            action,
            partial_path: path.to_vec(),
        });
    }

    pub fn visit(&mut self, node: &str, path: &[String]) {
        self.push(StepAction::Visit { node: node.to_string() }, path);
    }

    pub fn probe(&mut self, from: &str, to: &str, path: &[String]) {
        self.push(StepAction::Probe { from: from.to_string(), to: to.to_string() }, path);
    }

    pub fn backtrack(&mut self, node: &str, path: &[String]) {
        self.push(StepAction::Backtrack { node: node.to_string() }, path);
    }

    pub fn wave(
        &mut self,
        frontier_nodes: Vec<String>,
        frontier_edges: Vec<(String, String)>,
        wave_index: usize,
        is_backward: bool,
    ) {
        self.push(
            StepAction::WaveExpand { frontier_nodes, frontier_edges, wave_index, is_backward },
            &[],
        );
    }

    pub fn meet(&mut self, node: &str, path: &[String]) {
        self.push(StepAction::Meet { node: node.to_string() }, path);
    }

    pub fn reveal(&mut self, path: &[String]) {
        self.push(StepAction::RevealPath, path);
    }

    pub fn finish(self) -> AnimationTrace {
        AnimationTrace { steps: self.steps }
    }
}
