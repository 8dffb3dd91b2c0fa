// src/navigation/avoidance.rs
// Reactive obstacle avoidance: turn toward the clearest beam and slow down near obstacles.

use crate::core::{Direction, RangeSnapshot};

/// Override computed when an obstacle is inside the safety threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvoidanceCommand {
    /// Heading change relative to the vehicle's nose (rad)
    pub bearing: f64,
    /// Ramped forward velocity (m/s)
    pub forward_velocity: f64,
    /// Beam with the closest return
    pub nearest: Direction,
    /// Distance on that beam (m)
    pub nearest_distance: f64,
    /// Beam the vehicle turns toward
    pub clearest: Direction,
}

/// Threshold policy over the horizontal multi-ranger beams
#[derive(Debug, Clone)]
pub struct AvoidancePolicy {
    d_min: f64,
    d_min_hard: f64,
    v_max: f64,
}

impl AvoidancePolicy {
    /// `d_min_hard < d_min` is checked by [`super::ControllerConfig::validate`].
    pub fn new(d_min: f64, d_min_hard: f64, v_max: f64) -> Self {
        AvoidancePolicy {
            d_min,
            d_min_hard,
            v_max,
        }
    }

    /// Returns an override when any horizontal beam reads below `d_min`.
    ///
    /// The upward beam never triggers avoidance: yawing cannot clear a ceiling.
    pub fn evaluate(&self, ranges: &RangeSnapshot) -> Option<AvoidanceCommand> {
        let (nearest, nearest_distance) = ranges
            .horizontal()
            .reduce(|best, candidate| if candidate.1 < best.1 { candidate } else { best })?;

        if nearest_distance >= self.d_min {
            return None;
        }

        let (clearest, _) = ranges
            .horizontal()
            .filter(|(direction, _)| *direction != nearest)
            .reduce(|best, candidate| if candidate.1 > best.1 { candidate } else { best })?;

        Some(AvoidanceCommand {
            bearing: clearest.bearing(),
            forward_velocity: self.ramp_velocity(nearest_distance),
            nearest,
            nearest_distance,
            clearest,
        })
    }

    /// Linear ramp from zero at `d_min_hard` to `v_max` at `d_min`.
    pub fn ramp_velocity(&self, closest: f64) -> f64 {
        let scale = (closest - self.d_min_hard) / (self.d_min - self.d_min_hard);
        self.v_max * scale.clamp(0.0, 1.0)
    }

    /// Avoidance threshold (m).
    pub fn d_min(&self) -> f64 {
        self.d_min
    }

    /// Hard-stop threshold (m).
    pub fn d_min_hard(&self) -> f64 {
        self.d_min_hard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::f64::consts::FRAC_PI_2;

    #[fixture]
    fn policy() -> AvoidancePolicy {
        AvoidancePolicy::new(0.3, 0.1, 0.3)
    }

    #[rstest]
    fn clear_surroundings_need_no_override(policy: AvoidancePolicy) {
        assert_eq!(policy.evaluate(&RangeSnapshot::uniform(1.0)), None);
        assert_eq!(policy.evaluate(&RangeSnapshot::uniform(0.3)), None);
        assert_eq!(policy.evaluate(&RangeSnapshot::clear()), None);
    }

    #[rstest]
    fn hard_stop_inside_inner_threshold(policy: AvoidancePolicy) {
        let ranges = RangeSnapshot::new(0.05, 1.0, 1.0, 1.0);
        let command = policy.evaluate(&ranges).unwrap();
        assert_eq!(command.forward_velocity, 0.0);
        assert_eq!(command.nearest, Direction::Front);
    }

    #[rstest]
    #[case(0.1, 0.0)]
    #[case(0.2, 0.15)]
    #[case(0.3, 0.3)]
    #[case(0.0, 0.0)]
    fn velocity_ramps_linearly(policy: AvoidancePolicy, #[case] closest: f64, #[case] expected: f64) {
        assert!((policy.ramp_velocity(closest) - expected).abs() < 1e-9);
    }

    #[rstest]
    fn turns_toward_widest_gap(policy: AvoidancePolicy) {
        let ranges = RangeSnapshot::new(0.2, 2.0, 0.8, 1.0);
        let command = policy.evaluate(&ranges).unwrap();
        assert_eq!(command.clearest, Direction::Left);
        assert!((command.bearing - FRAC_PI_2).abs() < 1e-12);
        assert!((command.forward_velocity - 0.15).abs() < 1e-9);
    }

    #[rstest]
    fn nearest_beam_is_never_the_escape(policy: AvoidancePolicy) {
        // Only the back is blocked: any other beam is clearer, front wins the tie
        let ranges = RangeSnapshot::new(f64::INFINITY, f64::INFINITY, f64::INFINITY, 0.15);
        let command = policy.evaluate(&ranges).unwrap();
        assert_eq!(command.nearest, Direction::Back);
        assert_eq!(command.clearest, Direction::Front);
        assert_eq!(command.bearing, 0.0);
    }

    #[rstest]
    fn ceiling_does_not_trigger(policy: AvoidancePolicy) {
        let mut ranges = RangeSnapshot::uniform(1.0);
        ranges.up = Some(0.05);
        assert_eq!(policy.evaluate(&ranges), None);
    }
}
