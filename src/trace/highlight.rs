//! Cumulative highlight state, built by folding trace steps

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{AnimationStep, StepAction};

/// Number of color buckets wave layers cycle through
pub const WAVE_BUCKETS: usize = 6;

/// Color assignment for a node or edge touched by a wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveColor {
    pub wave_index: usize,
    /// `wave_index % WAVE_BUCKETS`; the renderer maps it to a palette entry
    pub bucket: usize,
    pub is_backward: bool,
}

impl WaveColor {
    pub fn new(wave_index: usize, is_backward: bool) -> Self {
        Self {
            wave_index,
            bucket: wave_index % WAVE_BUCKETS,
            is_backward,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColoredEdge {
    pub from: String,
    pub to: String,
    pub color: WaveColor,
}

/// Everything the renderer needs to draw the animation at some step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightState {
    pub visited_nodes: BTreeSet<String>,
    pub explored_edges: BTreeSet<(String, String)>,
    pub backtracked_nodes: BTreeSet<String>,
    pub current_node: Option<String>,
    pub active_edge: Option<(String, String)>,
    /// First wave that reached each node wins
    pub wave_colors: BTreeMap<String, WaveColor>,
    pub edge_colors: Vec<ColoredEdge>,
    pub path: Vec<String>,
    pub meeting_node: Option<String>,
    pub path_revealed: bool,
    pub steps_applied: usize,
}

impl HighlightState {
    pub fn is_visited(&self, node: &str) -> bool {
        self.visited_nodes.contains(node)
    }

    pub fn wave_color(&self, node: &str) -> Option<WaveColor> {
        self.wave_colors.get(node).copied()
    }
}

/// Pure fold: returns the state after `step`
pub fn apply_step(mut state: HighlightState, step: &AnimationStep) -> HighlightState {
    match &step.action {
        StepAction::Visit { node } => {
            state.visited_nodes.insert(node.clone());
            state.current_node = Some(node.clone());
            state.path = step.partial_path.clone();
        }
        StepAction::Probe { from, to } => {
            state.explored_edges.insert((from.clone(), to.clone()));
            state.active_edge = Some((from.clone(), to.clone()));
            state.current_node = Some(from.clone());
            state.path = step.partial_path.clone();
        }
        StepAction::Backtrack { node } => {
            state.backtracked_nodes.insert(node.clone());
            state.current_node = step.partial_path.last().cloned();
            state.active_edge = None;
            state.path = step.partial_path.clone();
        }
        StepAction::WaveExpand { frontier_nodes, frontier_edges, wave_index, is_backward } => {
            let color = WaveColor::new(*wave_index, *is_backward);
            for node in frontier_nodes {
                state.visited_nodes.insert(node.clone());
                state.wave_colors.entry(node.clone()).or_insert(color);
            }
            for (from, to) in frontier_edges {
                if state.explored_edges.insert((from.clone(), to.clone())) {
                    state.edge_colors.push(ColoredEdge {
                        from: from.clone(),
                        to: to.clone(),
                        color,
                    });
                }
            }
            state.current_node = None;
            state.active_edge = None;
        }
        StepAction::Meet { node } => {
            state.meeting_node = Some(node.clone());
            state.current_node = Some(node.clone());
            state.path = step.partial_path.clone();
        }
        StepAction::RevealPath => {
            state.path = step.partial_path.clone();
            state.path_revealed = true;
            state.current_node = None;
            state.active_edge = None;
        }
    }
    state.steps_applied += 1;
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(action: StepAction, path: &[&str]) -> AnimationStep {
        AnimationStep {
            action,
            partial_path: path.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_visit_probe_backtrack() {
        let state = HighlightState::default();
        let state = apply_step(state, &step(StepAction::Visit { node: "A".into() }, &["A"]));
        let state = apply_step(state, &step(StepAction::Probe { from: "A".into(), to: "B".into() }, &["A"]));
        let state = apply_step(state, &step(StepAction::Visit { node: "B".into() }, &["A", "B"]));
        assert_eq!(state.current_node.as_deref(), Some("B"));
        assert_eq!(state.path, vec!["A", "B"]);

        let state = apply_step(state, &step(StepAction::Backtrack { node: "B".into() }, &["A"]));
        assert!(state.is_visited("B"));
        assert!(state.backtracked_nodes.contains("B"));
        assert_eq!(state.current_node.as_deref(), Some("A"));
        assert!(state.active_edge.is_none());
        assert_eq!(state.steps_applied, 4);
    }

    #[test]
    fn test_wave_colors_first_wave_wins() {
        let wave = |nodes: &[&str], index: usize, backward: bool| {
            step(
                StepAction::WaveExpand {
                    frontier_nodes: nodes.iter().map(|s| s.to_string()).collect(),
                    frontier_edges: vec![("S".into(), nodes[0].to_string())],
                    wave_index: index,
                    is_backward: backward,
                },
                &[],
            )
        };

        let state = apply_step(HighlightState::default(), &wave(&["B", "C"], 0, false));
        let state = apply_step(state, &wave(&["C", "D"], 7, true));

        assert_eq!(state.wave_color("C"), Some(WaveColor::new(0, false)));
        let d = state.wave_color("D").unwrap();
        assert_eq!(d.bucket, 7 % WAVE_BUCKETS);
        assert!(d.is_backward);
        assert_eq!(state.edge_colors.len(), 2);
        assert!(state.current_node.is_none());
    }

    #[test]
    fn test_meet_and_reveal() {
        let state = apply_step(HighlightState::default(), &step(StepAction::Meet { node: "M".into() }, &["A", "M"]));
        assert_eq!(state.meeting_node.as_deref(), Some("M"));
        assert!(!state.path_revealed);

        let state = apply_step(state, &step(StepAction::RevealPath, &["A", "M", "Z"]));
        assert!(state.path_revealed);
        assert_eq!(state.path, vec!["A", "M", "Z"]);
    }

    #[test]
    fn test_apply_step_does_not_touch_input() {
        let before = HighlightState::default();
        let after = apply_step(before.clone(), &step(StepAction::Visit { node: "A".into() }, &[]));
        assert_eq!(before, HighlightState::default());
        assert_ne!(before, after);
    }
}
