// src/navigation/config.rs
// Tunable constants for the run-and-tumble controller, validated once at startup.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use thiserror::Error;

/// Slowest accepted sensing rate (Hz)
pub const MIN_TICK_RATE_HZ: f64 = 0.01;
/// Fastest accepted sensing rate (Hz)
pub const MAX_TICK_RATE_HZ: f64 = 1000.0;

/// How the tumble generator picks a new heading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TumbleDistribution {
    /// Any heading in [-π, π) with equal probability.
    #[default]
    Uniform,
    /// Turn left or right (coin flip) by up to `max_turn` radians from the current heading.
    Relative {
        /// Largest turn in radians.
        max_turn: f64,
    },
}

/// Controller configuration. Every field has a default, so a partial YAML section is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Clearance below which avoidance takes over (m)
    pub d_min: f64,
    /// Clearance below which forward velocity is forced to zero (m)
    pub d_min_hard: f64,
    /// Forward speed while running (m/s)
    pub v_run: f64,
    /// Crawl speed while tumbling (m/s)
    pub v_tumble: f64,
    /// Number of samples averaged by the intensity filter
    pub window_size: usize,
    /// Tumble heading distribution
    pub tumble: TumbleDistribution,
    /// Expected sensing rate (Hz); informational for the core, used by drivers to pace ticks
    pub tick_rate_hz: f64,
    /// Heading held at startup (rad)
    pub initial_heading: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            d_min: 0.3,
            d_min_hard: 0.1,
            v_run: 0.3,
            v_tumble: 0.0,
            window_size: 10,
            tumble: TumbleDistribution::Uniform,
            tick_rate_hz: 4.0,
            initial_heading: 0.0,
        }
    }
}

impl ControllerConfig {
    /// Checks the relationships between thresholds. The controller refuses to start otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("d_min", self.d_min), ("d_min_hard", self.d_min_hard)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDistance { name, value });
            }
        }
        if self.d_min_hard >= self.d_min {
            return Err(ConfigError::InvertedThresholds {
                d_min: self.d_min,
                d_min_hard: self.d_min_hard,
            });
        }
        for (name, value) in [("v_run", self.v_run), ("v_tumble", self.v_tumble)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidSpeed { name, value });
            }
        }
        if self.window_size == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        if !(MIN_TICK_RATE_HZ..=MAX_TICK_RATE_HZ).contains(&self.tick_rate_hz) {
            return Err(ConfigError::InvalidTickRate(self.tick_rate_hz));
        }
        if !self.initial_heading.is_finite() {
            return Err(ConfigError::InvalidHeading(self.initial_heading));
        }
        if let TumbleDistribution::Relative { max_turn } = self.tumble {
            if !(max_turn > 0.0 && max_turn <= TAU) {
                return Err(ConfigError::InvalidTurn(max_turn));
            }
        }
        Ok(())
    }

    /// Seconds between ticks at the expected sensing rate.
    pub fn tick_period(&self) -> f64 {
        1.0 / self.tick_rate_hz
    }
}

/// Fatal configuration problems, reported before the controller starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Hard-stop distance is not below the avoidance threshold
    #[error("d_min_hard ({d_min_hard}) must be smaller than d_min ({d_min})")]
    InvertedThresholds {
        /// Avoidance threshold
        d_min: f64,
        /// Hard-stop threshold
        d_min_hard: f64,
    },
    /// Distance that is negative or not finite
    #[error("{name} must be a finite, non-negative distance (got {value})")]
    InvalidDistance {
        /// Field name
        name: &'static str,
        /// Offending value
        value: f64,
    },
    /// Speed that is negative or not finite
    #[error("{name} must be a finite, non-negative speed (got {value})")]
    InvalidSpeed {
        /// Field name
        name: &'static str,
        /// Offending value
        value: f64,
    },
    /// Intensity window of zero samples
    #[error("intensity window must hold at least one sample")]
    EmptyWindow,
    /// Tick rate outside the accepted range
    #[error("tick rate must be within [0.01, 1000] Hz (got {0} Hz)")]
    InvalidTickRate(f64),
    /// Initial heading that is not finite
    #[error("initial heading must be finite (got {0})")]
    InvalidHeading(f64),
    /// Relative tumble turn outside (0, 2π]
    #[error("tumble max_turn must be within (0, 2π] (got {0})")]
    InvalidTurn(f64),
    /// Simulation or navigator setting out of range
    #[error("invalid setting: {0}")]
    InvalidSetting(String),
    /// Configuration file could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration file is not valid YAML for the expected layout
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_are_valid() {
        assert!(ControllerConfig::default().validate().is_ok());
    }

    #[rstest]
    #[case(0.3, 0.3)]
    #[case(0.3, 0.5)]
    fn rejects_hard_stop_at_or_above_threshold(#[case] d_min: f64, #[case] d_min_hard: f64) {
        let config = ControllerConfig { d_min, d_min_hard, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedThresholds { .. })
        ));
    }

    #[test]
    fn rejects_negative_speed() {
        let config = ControllerConfig { v_tumble: -0.1, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSpeed { name: "v_tumble", .. })
        ));
    }

    #[test]
    fn rejects_empty_window() {
        let config = ControllerConfig { window_size: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyWindow)));
    }

    #[rstest]
    #[case(0.0)]
    #[case(7.0)]
    fn rejects_out_of_range_turn(#[case] max_turn: f64) {
        let config = ControllerConfig {
            tumble: TumbleDistribution::Relative { max_turn },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTurn(_))));
    }

    #[rstest]
    #[case(0.0)]
    #[case(1e-300)]
    #[case(f64::INFINITY)]
    #[case(f64::NAN)]
    #[case(5000.0)]
    fn rejects_unusable_tick_rate(#[case] tick_rate_hz: f64) {
        let config = ControllerConfig { tick_rate_hz, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTickRate(_))));
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let config: ControllerConfig =
            serde_yaml::from_str("d_min: 0.5\ntumble:\n  kind: relative\n  max_turn: 1.5\n").unwrap();
        assert_eq!(config.d_min, 0.5);
        assert_eq!(config.d_min_hard, 0.1);
        assert_eq!(config.tumble, TumbleDistribution::Relative { max_turn: 1.5 });
        assert_eq!(config.window_size, 10);
    }
}
