// src/navigation/controller.rs
// Run-and-tumble state machine with obstacle-avoidance preemption.
// Owns its ControllerState; each call to `tick` consumes one sensor frame and returns one command.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    AvoidanceCommand, AvoidancePolicy, ConfigError, ControllerConfig, Heading, IntensityFilter,
    MotionCommand, TumbleGenerator, wrap_angle,
};
use crate::core::{ActionState, ControllerState, SensorFrame};

/// Light-seeking controller.
///
/// Transitions, in priority order on every tick:
/// 1. any state to AVOID while an obstacle is inside `d_min`;
/// 2. AVOID back to the action held before avoidance, with the held heading;
/// 3. RUN to TUMBLE when the smoothed intensity did not rise;
/// 4. TUMBLE to RUN unconditionally;
/// 5. RUN stays RUN while the smoothed intensity rises.
///
/// The intensity history advances on every tick that carries a reading, avoidance included.
pub struct RunTumbleController<R = StdRng> {
    config: ControllerConfig,
    filter: IntensityFilter,
    policy: AvoidancePolicy,
    tumbler: TumbleGenerator,
    state: ControllerState<R>,
}

impl RunTumbleController<StdRng> {
    /// Controller with a seeded `StdRng`, for reproducible runs.
    pub fn with_seed(config: ControllerConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RunTumbleController<R> {
    /// Validates `config` and starts in RUN along `config.initial_heading`.
    pub fn new(config: ControllerConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let heading = Heading::new(config.initial_heading, config.v_run);
        info!(
            "Run-and-tumble controller ready: d_min={}m, d_min_hard={}m, v_run={}m/s, K={}",
            config.d_min, config.d_min_hard, config.v_run, config.window_size
        );

        Ok(RunTumbleController {
            filter: IntensityFilter::new(config.window_size),
            policy: AvoidancePolicy::new(config.d_min, config.d_min_hard, config.v_run),
            tumbler: TumbleGenerator::new(config.tumble, config.v_tumble),
            state: ControllerState::new(heading, rng),
            config,
        })
    }

    /// Runs one control tick.
    pub fn tick(&mut self, frame: &SensorFrame) -> MotionCommand {
        let (ranges, intensity, gaps) = frame.sanitize();
        if !gaps.is_empty() {
            self.state.gap_ticks += 1;
        }

        // None when the reading is missing or there is nothing to compare against yet
        let rising = intensity.and_then(|raw| self.advance_gradient(raw));

        if let Some(avoidance) = self.policy.evaluate(&ranges) {
            return self.avoid(avoidance);
        }

        if let Some(resume) = self.state.resume_action.take() {
            self.state.avoidance_heading = None;
            info!(
                "Path clear, resuming {} at heading {:.3}",
                resume, self.state.current_heading.angle
            );
            self.state.enter(resume);
            return self.command_for(resume);
        }

        let next = match (self.state.action, rising) {
            (ActionState::Tumble, _) => {
                self.state.current_heading = self.state.current_heading.with_speed(self.config.v_run);
                ActionState::Run
            }
            (ActionState::Run, Some(false)) => {
                let from = self.state.current_heading.angle;
                self.state.current_heading = self.tumbler.generate(&mut self.state.rng, from);
                debug!(
                    "Gradient flat or falling, tumbling from {:.3} to {:.3}",
                    from, self.state.current_heading.angle
                );
                ActionState::Tumble
            }
            // Rising gradient, or no comparison possible this tick: hold the course
            (ActionState::Run, _) | (ActionState::Avoid, _) => ActionState::Run,
        };

        self.state.enter(next);
        self.command_for(next)
    }

    /// Feeds the filter and shifts the two-value gradient history.
    fn advance_gradient(&mut self, raw: f64) -> Option<bool> {
        let smoothed = self.filter.observe(raw);
        self.state.previous_intensity_avg = self.state.last_intensity_avg;
        self.state.last_intensity_avg = Some(smoothed.current);
        smoothed.is_rising()
    }

    fn avoid(&mut self, avoidance: AvoidanceCommand) -> MotionCommand {
        if self.state.action != ActionState::Avoid {
            info!(
                "Obstacle {:.2}m {:?}, avoiding toward {:?} (was {})",
                avoidance.nearest_distance, avoidance.nearest, avoidance.clearest, self.state.action
            );
            self.state.resume_action = Some(self.state.action);
        }

        // The body frame follows the last commanded heading
        let reference = self
            .state
            .avoidance_heading
            .unwrap_or(self.state.current_heading.angle);
        let heading = wrap_angle(reference + avoidance.bearing);
        self.state.avoidance_heading = Some(heading);
        self.state.enter(ActionState::Avoid);

        MotionCommand {
            forward_velocity: avoidance.forward_velocity,
            target_heading: heading,
            label: ActionState::Avoid,
        }
    }

    fn command_for(&self, action: ActionState) -> MotionCommand {
        MotionCommand::from_heading(self.state.current_heading, action)
    }

    /// Read-only view of the controller state.
    pub fn state(&self) -> &ControllerState<R> {
        &self.state
    }

    /// Validated configuration in use.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Latest smoothed intensity, if any sample has been seen.
    pub fn smoothed_intensity(&self) -> Option<f64> {
        self.filter.current()
    }
}
