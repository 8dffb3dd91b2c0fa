// core/mod.rs

// Shared vocabulary of the controller: sensor input, action labels, controller state,
// the collaborator traits and the telemetry log.

/// Collaborator traits and telemetry
pub mod api;
/// Position passthrough
pub mod localization;
/// Bounded trajectory log
pub mod memory;
/// Per-tick sensor input
pub mod perception;
/// Action labels and controller state
pub mod state;

pub use api::{CommandSink, SensorLink, Telemetry};
pub use localization::Position;
pub use memory::TrajectoryLog;
pub use perception::{Direction, RangeSnapshot, SensorFrame, SensorGaps};
pub use state::{ActionState, ControllerState};
