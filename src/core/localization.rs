// core/localization.rs

// Vehicle position as reported by the state estimator. The controller never decides on it;
// it is only carried into telemetry so the plotter can draw the trajectory.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Position estimate in meters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// East (m)
    pub x: f64,
    /// North (m)
    pub y: f64,
    /// Altitude (m)
    pub z: f64,
}

impl Position {
    /// Position from its coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Position { x, y, z }
    }

    /// Ground-plane projection.
    pub fn planar(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Ground-plane distance to another position.
    pub fn planar_distance(&self, other: &Position) -> f64 {
        (self.planar() - other.planar()).norm()
    }
}

impl From<Vector2<f64>> for Position {
    fn from(point: Vector2<f64>) -> Self {
        Position::new(point.x, point.y, 0.0)
    }
}
