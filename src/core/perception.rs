// core/perception.rs

// Per-tick sensor input: multi-ranger distances, the raw light sample and the optional
// position passthrough. Readings are sanitized here so the controller only sees numbers.

use log::warn;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

use super::localization::Position;

/// Horizontal multi-ranger beams, body frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Along the nose
    Front,
    /// Port side
    Left,
    /// Starboard side
    Right,
    /// Behind
    Back,
}

impl Direction {
    /// All beams, in tie-break order.
    pub const ALL: [Direction; 4] = [
        Direction::Front,
        Direction::Left,
        Direction::Right,
        Direction::Back,
    ];

    /// Beam angle relative to the nose; counter-clockwise positive, wrapped to [-π, π).
    pub fn bearing(self) -> f64 {
        match self {
            Direction::Front => 0.0,
            Direction::Left => FRAC_PI_2,
            Direction::Right => -FRAC_PI_2,
            Direction::Back => -PI,
        }
    }
}

/// Obstacle distances in meters; `f64::INFINITY` means no return
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeSnapshot {
    /// Nose beam
    pub front: f64,
    /// Port beam
    pub left: f64,
    /// Starboard beam
    pub right: f64,
    /// Tail beam
    pub back: f64,
    /// Upward beam, when the deck has one
    pub up: Option<f64>,
}

impl Default for RangeSnapshot {
    fn default() -> Self {
        RangeSnapshot::clear()
    }
}

impl RangeSnapshot {
    /// Snapshot with horizontal distances and no upward beam.
    pub fn new(front: f64, left: f64, right: f64, back: f64) -> Self {
        RangeSnapshot {
            front,
            left,
            right,
            back,
            up: None,
        }
    }

    /// Every beam reporting no return.
    pub fn clear() -> Self {
        RangeSnapshot::new(f64::INFINITY, f64::INFINITY, f64::INFINITY, f64::INFINITY)
    }

    /// Same distance on every horizontal beam.
    pub fn uniform(distance: f64) -> Self {
        RangeSnapshot::new(distance, distance, distance, distance)
    }

    /// Distance reported by one horizontal beam.
    pub fn distance(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Front => self.front,
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Back => self.back,
        }
    }

    /// (direction, distance) pairs in tie-break order.
    pub fn horizontal(&self) -> impl Iterator<Item = (Direction, f64)> + '_ {
        Direction::ALL.into_iter().map(|d| (d, self.distance(d)))
    }

    /// Replaces missing readings (NaN or negative) with "no obstacle".
    ///
    /// Fails open: a dead beam is treated as infinite clearance. Returns the beams that
    /// were substituted.
    pub fn sanitized(&self) -> (RangeSnapshot, Vec<Direction>) {
        let mut gaps = Vec::new();
        let mut fix = |direction: Direction, value: f64| {
            if is_valid_distance(value) {
                value
            } else {
                gaps.push(direction);
                f64::INFINITY
            }
        };

        let snapshot = RangeSnapshot {
            front: fix(Direction::Front, self.front),
            left: fix(Direction::Left, self.left),
            right: fix(Direction::Right, self.right),
            back: fix(Direction::Back, self.back),
            up: self.up.filter(|&d| is_valid_distance(d)),
        };
        (snapshot, gaps)
    }
}

fn is_valid_distance(value: f64) -> bool {
    !value.is_nan() && value >= 0.0
}

/// Readings that had to be substituted on one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorGaps {
    /// Range beams replaced with infinite clearance
    pub ranges: Vec<Direction>,
    /// Light sample missing or not a number
    pub intensity: bool,
}

impl SensorGaps {
    /// True when every reading was usable.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty() && !self.intensity
    }
}

/// Everything the controller consumes on one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorFrame {
    /// Multi-ranger distances
    pub ranges: RangeSnapshot,
    /// Raw light reading in sensor units
    pub intensity: Option<f64>,
    /// Vehicle position, carried through to telemetry only
    pub position: Option<Position>,
}

impl SensorFrame {
    /// Frame with ranges and a light sample, no position.
    pub fn new(ranges: RangeSnapshot, intensity: f64) -> Self {
        SensorFrame {
            ranges,
            intensity: Some(intensity),
            position: None,
        }
    }

    /// Attaches a position for telemetry.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Splits the frame into usable readings and the gaps that were papered over.
    pub fn sanitize(&self) -> (RangeSnapshot, Option<f64>, SensorGaps) {
        let (ranges, range_gaps) = self.ranges.sanitized();
        let intensity = self.intensity.filter(|i| i.is_finite());
        let gaps = SensorGaps {
            ranges: range_gaps,
            intensity: intensity.is_none(),
        };
        if !gaps.is_empty() {
            warn!(
                "Sensor gap: ranges {:?} treated as clear, intensity missing: {}",
                gaps.ranges, gaps.intensity
            );
        }
        (ranges, intensity, gaps)
    }
}
