//! Stand-ins for the vehicle side of the link.

/// Simulated arena implementing both sides of the vehicle link
pub mod simulation;

pub use simulation::{CircleObstacle, SimulatedWorld, SimulationConfig};
