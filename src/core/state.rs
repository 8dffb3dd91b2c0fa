// core/state.rs

// Action labels and the controller's private state. ControllerState is created once when
// the controller starts and mutated only by the run-and-tumble state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::navigation::Heading;

/// What the controller is doing on the current tick
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionState {
    /// Fly straight along the held heading
    Run,
    /// Single-tick heading randomization
    Tumble,
    /// Reactive override near obstacles
    Avoid,
}

impl ActionState {
    /// Label used on the telemetry topic.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionState::Run => "RUN",
            ActionState::Tumble => "TUMBLE",
            ActionState::Avoid => "AVOID",
        }
    }

    /// Plot colour used by the trajectory viewer.
    pub fn plot_color(&self) -> &'static str {
        match self {
            ActionState::Run => "green",
            ActionState::Tumble => "blue",
            ActionState::Avoid => "red",
        }
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable controller state, generic over the injected random source
#[derive(Debug, Clone)]
pub struct ControllerState<R> {
    pub(crate) action: ActionState,
    /// Held run/tumble heading; left untouched while avoiding
    pub(crate) current_heading: Heading,
    pub(crate) last_intensity_avg: Option<f64>,
    pub(crate) previous_intensity_avg: Option<f64>,
    pub(crate) ticks_in_state: u64,
    /// Action to resume once avoidance ends; set only while avoiding
    pub(crate) resume_action: Option<ActionState>,
    /// Last heading commanded by the avoidance policy
    pub(crate) avoidance_heading: Option<f64>,
    pub(crate) gap_ticks: u64,
    pub(crate) rng: R,
}

impl<R> ControllerState<R> {
    /// Starting state: running along `heading`.
    pub fn new(heading: Heading, rng: R) -> Self {
        ControllerState {
            action: ActionState::Run,
            current_heading: heading,
            last_intensity_avg: None,
            previous_intensity_avg: None,
            ticks_in_state: 0,
            resume_action: None,
            avoidance_heading: None,
            gap_ticks: 0,
            rng,
        }
    }

    /// Action chosen on the last tick.
    pub fn action(&self) -> ActionState {
        self.action
    }

    /// Held run/tumble heading.
    pub fn current_heading(&self) -> Heading {
        self.current_heading
    }

    /// Smoothed intensity after the last reading.
    pub fn last_intensity_avg(&self) -> Option<f64> {
        self.last_intensity_avg
    }

    /// Smoothed intensity one reading earlier.
    pub fn previous_intensity_avg(&self) -> Option<f64> {
        self.previous_intensity_avg
    }

    /// Consecutive ticks spent in the current action, this one included.
    pub fn ticks_in_state(&self) -> u64 {
        self.ticks_in_state
    }

    /// Action that will resume when avoidance ends.
    pub fn resume_action(&self) -> Option<ActionState> {
        self.resume_action
    }

    /// Ticks on which at least one reading was missing.
    pub fn gap_ticks(&self) -> u64 {
        self.gap_ticks
    }

    /// Moves to `next`, keeping the per-state tick counter.
    pub(crate) fn enter(&mut self, next: ActionState) {
        if next == self.action {
            self.ticks_in_state += 1;
        } else {
            log::debug!("{} -> {}", self.action, next);
            self.action = next;
            self.ticks_in_state = 1;
        }
    }
}
