// core/api.rs

// Seams to the external collaborators: whatever produces sensor frames (simulator, ROS
// link) and whatever turns commands into vehicle actuation and telemetry.

use serde::{Deserialize, Serialize};

use super::{localization::Position, state::ActionState};
use crate::BcfError;
use crate::navigation::MotionCommand;

/// Source of one sensor frame per externally driven tick
pub trait SensorLink {
    /// Returns the next frame, or `None` when no new tick is available yet.
    fn poll(&mut self) -> Result<Option<super::SensorFrame>, BcfError>;
}

/// Consumer of motion commands and telemetry
pub trait CommandSink {
    /// Forwards a command to the vehicle.
    fn send(&mut self, command: &MotionCommand) -> Result<(), BcfError>;

    /// Publishes the per-tick record for plotting. Default: drop it.
    fn publish_telemetry(&mut self, _telemetry: &Telemetry) -> Result<(), BcfError> {
        Ok(())
    }
}

/// Per-tick record consumed by the plotter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// 1-based tick counter
    pub tick: u64,
    /// Vehicle position, when the link reports one
    pub position: Option<Position>,
    /// Raw light reading, sensor units
    pub raw_intensity: Option<f64>,
    /// Filter output after this tick
    pub smoothed_intensity: Option<f64>,
    /// Command emitted on this tick
    pub command: MotionCommand,
}

impl Telemetry {
    /// Label of the emitted command.
    pub fn action(&self) -> ActionState {
        self.command.label
    }
}
