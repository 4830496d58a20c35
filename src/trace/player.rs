//! Step cursor over a trace
//!
//! The player never schedules anything itself. Whoever owns the cadence
//! (a [`super::Ticker`], a UI timer, a test) calls [`TracePlayer::tick`];
//! each call applies exactly one step, in order.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{apply_step, AnimationStep, AnimationTrace, HighlightState};

/// Playback cadence presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackSpeed {
    Slow,
    #[default]
    Medium,
    Fast,
    /// Interval in milliseconds
    Custom(u64),
}

impl PlaybackSpeed {
    pub fn interval(self) -> Duration {
        match self {
            PlaybackSpeed::Slow => Duration::from_millis(1000),
            PlaybackSpeed::Medium => Duration::from_millis(500),
            PlaybackSpeed::Fast => Duration::from_millis(150),
            PlaybackSpeed::Custom(ms) => Duration::from_millis(ms.max(1)),
        }
    }
}

impl FromStr for PlaybackSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slow" => Ok(PlaybackSpeed::Slow),
            "medium" => Ok(PlaybackSpeed::Medium),
            "fast" => Ok(PlaybackSpeed::Fast),
            other => other
                .trim_end_matches("ms")
                .parse::<u64>()
                .map(PlaybackSpeed::Custom)
                .map_err(|_| format!("Unknown playback speed: {}", s)),
        }
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackSpeed::Slow => write!(f, "slow"),
            PlaybackSpeed::Medium => write!(f, "medium"),
            PlaybackSpeed::Fast => write!(f, "fast"),
            PlaybackSpeed::Custom(ms) => write!(f, "{}ms", ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerStatus {
    /// Nothing applied yet
    Idle,
    Playing,
    /// Stopped mid-trace; applied state is kept
    Paused,
    Finished,
}

pub struct TracePlayer {
    trace: AnimationTrace,
    cursor: usize,
    state: HighlightState,
    status: PlayerStatus,
    speed: PlaybackSpeed,
}

impl TracePlayer {
    pub fn new(trace: AnimationTrace, speed: PlaybackSpeed) -> Self {
        let status = if trace.is_empty() { PlayerStatus::Finished } else { PlayerStatus::Idle };
        Self {
            trace,
            cursor: 0,
            state: HighlightState::default(),
            status,
            speed,
        }
    }

    /// Start or resume. Returns false when already playing or finished,
    /// so a second start request cannot double the tick rate.
    pub fn play(&mut self) -> bool {
        match self.status {
            PlayerStatus::Idle | PlayerStatus::Paused => {
                self.status = PlayerStatus::Playing;
                true
            }
            PlayerStatus::Playing | PlayerStatus::Finished => false,
        }
    }

    /// Stop future ticks. Already-applied state stays until `reset`.
    pub fn pause(&mut self) {
        if self.status == PlayerStatus::Playing {
            self.status = PlayerStatus::Paused;
        }
    }

    /// Apply the next step if playing
    pub fn tick(&mut self) -> Option<&AnimationStep> {
        if self.status != PlayerStatus::Playing {
            return None;
        }
        self.advance()
    }

    /// Apply the next step regardless of play state (manual stepping)
    pub fn step_forward(&mut self) -> Option<&AnimationStep> {
        if self.status == PlayerStatus::Idle {
            self.status = PlayerStatus::Paused;
        }
        self.advance()
    }

    fn advance(&mut self) -> Option<&AnimationStep> {
        let index = self.cursor;
        let step = self.trace.step_at(index)?;
        self.state = apply_step(std::mem::take(&mut self.state), step);
        self.cursor += 1;
        if self.cursor == self.trace.step_count() {
            self.status = PlayerStatus::Finished;
        }
        self.trace.step_at(index)
    }

    /// Back to the empty state at step 0
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.state = HighlightState::default();
        self.status = if self.trace.is_empty() { PlayerStatus::Finished } else { PlayerStatus::Idle };
    }

    /// Jump so that exactly `index` steps are applied
    pub fn seek(&mut self, index: usize) {
        let index = index.min(self.trace.step_count());
        self.state = self.trace.steps()[..index]
            .iter()
            .fold(HighlightState::default(), apply_step);
        self.cursor = index;
        self.status = if index == self.trace.step_count() {
            PlayerStatus::Finished
        } else {
            PlayerStatus::Paused
        };
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> &HighlightState {
        &self.state
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn trace(&self) -> &AnimationTrace {
        &self.trace
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
    }

    pub fn is_finished(&self) -> bool {
        self.status == PlayerStatus::Finished
    }
}
