//! Navigation system for the light-seeking vehicle
//!
//! This module holds the run-and-tumble controller and the pieces it consults every tick:
//! intensity smoothing, obstacle avoidance and tumble heading generation.

/// Obstacle override
pub mod avoidance;
/// Tunables and their validation
pub mod config;
/// Run-and-tumble state machine
pub mod controller;
/// Rolling light-intensity mean
pub mod intensity;
/// Random reorientation
pub mod tumble;

pub use avoidance::{AvoidanceCommand, AvoidancePolicy};
pub use config::{ConfigError, ControllerConfig, TumbleDistribution};
pub use controller::RunTumbleController;
pub use intensity::{IntensityFilter, SmoothedIntensity};
pub use tumble::TumbleGenerator;

use crate::core::ActionState;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Wraps an angle in radians to [-π, π).
pub fn wrap_angle(angle: f64) -> f64 {
    // in-range angles are returned bit-for-bit
    if (-PI..PI).contains(&angle) {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid can round up to TAU for inputs just below a multiple of 2π
    if wrapped >= PI { wrapped - TAU } else { wrapped }
}

/// Direction of travel plus forward speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Angle in radians, always within [-π, π)
    pub angle: f64,
    /// Forward speed (m/s)
    pub speed: f64,
}

impl Heading {
    /// Creates a heading, wrapping the angle and flooring the speed at zero.
    pub fn new(angle: f64, speed: f64) -> Self {
        Heading {
            angle: wrap_angle(angle),
            speed: speed.max(0.0),
        }
    }

    /// Same direction, different speed.
    pub fn with_speed(self, speed: f64) -> Self {
        Heading::new(self.angle, speed)
    }
}

/// Motion command emitted once per tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionCommand {
    /// Forward velocity along the target heading (m/s)
    pub forward_velocity: f64,
    /// Heading the flight controller should hold (rad)
    pub target_heading: f64,
    /// Action that produced this command
    pub label: ActionState,
}

impl MotionCommand {
    /// Builds a command that flies along `heading` at its speed.
    pub fn from_heading(heading: Heading, label: ActionState) -> Self {
        MotionCommand {
            forward_velocity: heading.speed,
            target_heading: heading.angle,
            label,
        }
    }

    /// Zero-velocity command that keeps the given heading.
    pub fn hold(target_heading: f64, label: ActionState) -> Self {
        MotionCommand {
            forward_velocity: 0.0,
            target_heading: wrap_angle(target_heading),
            label,
        }
    }

    /// World-frame velocity components (vx, vy).
    pub fn velocity_components(&self) -> (f64, f64) {
        (
            self.forward_velocity * self.target_heading.cos(),
            self.forward_velocity * self.target_heading.sin(),
        )
    }
}
