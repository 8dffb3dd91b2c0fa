//! bcf-nav - run-and-tumble light seeking for small aerial robots
//!
//! This library provides the chemotaxis-inspired controller (run, tumble, avoid), the
//! intensity smoothing and obstacle avoidance it relies on, and the navigator loop that
//! connects it to a sensor link and a command sink (simulator or ROS 2).

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Vehicle stand-ins (simulated arena)
pub mod apps;
/// Sensor input, state, collaborator traits and telemetry
pub mod core;
/// Run-and-tumble controller and its building blocks
pub mod navigation;
/// ROS 2 vehicle link
#[cfg(feature = "ros")]
pub mod ros_interface;

// Re-export commonly used items for easier access
pub use apps::{SimulatedWorld, SimulationConfig};
pub use self::core::{
    ActionState, CommandSink, Position, RangeSnapshot, SensorFrame, SensorLink, Telemetry,
    TrajectoryLog,
};
pub use navigation::{ConfigError, ControllerConfig, MotionCommand, RunTumbleController};

use log::{error, info, warn};
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Main configuration structure, loaded once at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BcfConfig {
    /// Run-and-tumble controller constants
    pub controller: ControllerConfig,
    /// Control loop settings
    pub navigator: NavigatorConfig,
    /// Simulated arena
    pub simulation: SimulationConfig,
    /// ROS 2 topics
    pub ros: RosConfig,
}

impl BcfConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: BcfConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path.as_ref())?;
        let config: BcfConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Checks every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.controller.validate()?;
        self.simulation.validate()?;
        if let Some(threshold) = self.navigator.source_found_intensity {
            if !(threshold.is_finite() && threshold > 0.0) {
                return Err(ConfigError::InvalidSetting(format!(
                    "source_found_intensity must be positive (got {threshold})"
                )));
            }
        }
        Ok(())
    }
}

/// Control loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Smoothed intensity at which the light source counts as found; `None` never stops
    pub source_found_intensity: Option<f64>,
    /// Upper bound on ticks for a run
    pub max_ticks: u64,
    /// Telemetry records kept in memory
    pub trajectory_capacity: usize,
    /// Where the trajectory is written at shutdown
    pub trajectory_path: Option<String>,
    /// Seed for the tumble random source
    pub seed: u64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        NavigatorConfig {
            source_found_intensity: Some(100.0),
            max_ticks: 2000,
            trajectory_capacity: 5000,
            trajectory_path: Some("bcf_trajectory.yaml".to_string()),
            seed: 1,
        }
    }
}

/// ROS 2 specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosConfig {
    /// Node name
    pub node_name: String,
    /// Node namespace
    pub namespace: String,
    /// Light sensor topic (std_msgs/Float32)
    pub intensity_topic: String,
    /// Multi-ranger topic (std_msgs/Float32MultiArray: left, front, right, back, up)
    pub range_topic: String,
    /// Position estimate topic (geometry_msgs/Point)
    pub state_topic: String,
    /// Velocity command topic (geometry_msgs/Twist)
    pub cmd_vel_topic: String,
    /// Target heading topic (std_msgs/Float32, radians)
    pub heading_topic: String,
    /// Action label topic (std_msgs/String)
    pub action_topic: String,
    /// QoS history depth
    pub qos_depth: usize,
}

impl Default for RosConfig {
    fn default() -> Self {
        RosConfig {
            node_name: "bcf_controller".to_string(),
            namespace: String::new(),
            intensity_topic: "bcf_intensity".to_string(),
            range_topic: "bcf_range".to_string(),
            state_topic: "bcf_state".to_string(),
            cmd_vel_topic: "cmd_vel".to_string(),
            heading_topic: "bcf_heading".to_string(),
            action_topic: "bcf_action".to_string(),
            qos_depth: 10,
        }
    }
}

/// Who is flying the vehicle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// The controller emits commands
    Autonomous,
    /// An operator is in control; the controller is not invoked
    Teleoperation,
}

/// Control loop: pulls a frame from the link, ticks the controller, sends the command back
pub struct Navigator<V, R = StdRng> {
    vehicle: V,
    controller: RunTumbleController<R>,
    config: NavigatorConfig,
    mode: Mode,
    trajectory: TrajectoryLog,
    ticks: u64,
    source_found: bool,
    is_initialized: bool,
}

impl<V: SensorLink + CommandSink, R: Rng> Navigator<V, R> {
    /// Create a new navigator around a vehicle link and a configured controller
    pub fn new(vehicle: V, controller: RunTumbleController<R>, config: NavigatorConfig) -> Self {
        Navigator {
            trajectory: TrajectoryLog::new(config.trajectory_capacity),
            vehicle,
            controller,
            config,
            mode: Mode::Autonomous,
            ticks: 0,
            source_found: false,
            is_initialized: false,
        }
    }

    /// Marks the loop ready to run
    pub fn initialize(&mut self) -> Result<(), BcfError> {
        info!("Initializing navigator in {:?} mode...", self.mode);
        self.is_initialized = true;
        Ok(())
    }

    /// Runs one tick. Returns `None` when nothing was emitted: teleoperation is active, the
    /// source was already found, or the link had no new frame.
    pub fn run_cycle(&mut self) -> Result<Option<Telemetry>, BcfError> {
        if !self.is_initialized {
            return Err(BcfError::NotInitialized);
        }
        if self.mode == Mode::Teleoperation || self.source_found {
            return Ok(None);
        }

        let Some(frame) = self.vehicle.poll()? else {
            return Ok(None);
        };

        let mut command = self.controller.tick(&frame);
        let smoothed = self.controller.smoothed_intensity();

        if let (Some(threshold), Some(level)) = (self.config.source_found_intensity, smoothed) {
            if level >= threshold {
                self.source_found = true;
                info!("Light source found (smoothed intensity {level:.2} >= {threshold}), holding position");
                command = MotionCommand::hold(command.target_heading, command.label);
            }
        }

        if let Err(e) = self.vehicle.send(&command) {
            error!("Failed to send command: {}", e);
            return Err(e);
        }

        self.ticks += 1;
        let telemetry = Telemetry {
            tick: self.ticks,
            position: frame.position,
            raw_intensity: frame.intensity,
            smoothed_intensity: smoothed,
            command,
        };
        if let Err(e) = self.vehicle.publish_telemetry(&telemetry) {
            warn!("Failed to publish telemetry: {}", e);
        }
        self.trajectory.record(telemetry.clone());

        Ok(Some(telemetry))
    }

    /// Cycles until the source is found or `max_ticks` cycles have run. Returns the number
    /// of commands emitted.
    pub fn run(&mut self) -> Result<u64, BcfError> {
        let start = self.ticks;
        for _ in 0..self.config.max_ticks {
            if self.source_found {
                break;
            }
            self.run_cycle()?;
        }
        Ok(self.ticks - start)
    }

    /// Runs to completion, then shuts down even when the run failed. A run failure takes
    /// precedence over a shutdown failure, which is only logged in that case.
    pub fn run_and_shutdown(&mut self) -> Result<u64, BcfError> {
        let result = self.run();
        match (result, self.shutdown()) {
            (Ok(ticks), Ok(())) => Ok(ticks),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), shutdown) => {
                if let Err(shutdown_err) = shutdown {
                    error!("Shutdown after failed run also failed: {}", shutdown_err);
                }
                Err(e)
            }
        }
    }

    /// Switches between autonomous flight and teleoperation
    pub fn set_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            info!("Switching navigator mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Stops the vehicle and saves the trajectory
    pub fn shutdown(&mut self) -> Result<(), BcfError> {
        info!("Shutting down navigator...");

        let hold = if self.is_initialized && self.mode == Mode::Autonomous {
            let heading = self.controller.state().current_heading().angle;
            self.vehicle
                .send(&MotionCommand::hold(heading, self.controller.state().action()))
        } else {
            Ok(())
        };
        // the trajectory is written even when the hold command failed
        let saved = match &self.config.trajectory_path {
            Some(path) => self.trajectory.save(path),
            None => Ok(()),
        };

        self.is_initialized = false;
        hold?;
        saved?;
        info!("Navigator shutdown complete after {} ticks", self.ticks);
        Ok(())
    }

    /// Get current navigator status
    pub fn status(&self) -> NavigatorStatus {
        let state = self.controller.state();
        NavigatorStatus {
            mode: self.mode,
            operational: self.is_initialized,
            ticks: self.ticks,
            action: state.action(),
            smoothed_intensity: self.controller.smoothed_intensity(),
            source_found: self.source_found,
            gap_ticks: state.gap_ticks(),
        }
    }

    /// Telemetry recorded so far.
    pub fn trajectory(&self) -> &TrajectoryLog {
        &self.trajectory
    }

    /// The wrapped controller.
    pub fn controller(&self) -> &RunTumbleController<R> {
        &self.controller
    }

    /// The vehicle link.
    pub fn vehicle(&self) -> &V {
        &self.vehicle
    }

    /// Mutable access to the vehicle link.
    pub fn vehicle_mut(&mut self) -> &mut V {
        &mut self.vehicle
    }
}

/// Snapshot of the control loop
#[derive(Debug, Clone, PartialEq)]
pub struct NavigatorStatus {
    /// Current mode
    pub mode: Mode,
    /// Whether the loop was initialized and not shut down
    pub operational: bool,
    /// Commands emitted so far
    pub ticks: u64,
    /// Controller action after the last tick
    pub action: ActionState,
    /// Latest smoothed intensity
    pub smoothed_intensity: Option<f64>,
    /// Whether the source threshold was reached
    pub source_found: bool,
    /// Ticks with missing readings
    pub gap_ticks: u64,
}

/// Error types
#[derive(Debug, Error)]
pub enum BcfError {
    /// Invalid configuration, fatal at startup
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Sensor side of the link failed
    #[error("sensor link error: {0}")]
    Link(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Command side of the link failed
    #[error("command sink error: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Trajectory file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Trajectory file is not valid YAML
    #[error("trajectory serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),
    /// Link requested that this build does not include
    #[error("{0} support not compiled in; rebuild with --features {0}")]
    FeatureDisabled(&'static str),
    /// Navigator used before `initialize`
    #[error("navigator not initialized")]
    NotInitialized,
    /// ROS 2 failure
    #[cfg(feature = "ros")]
    #[error("ROS error: {0}")]
    Ros(#[from] r2r::Error),
}
