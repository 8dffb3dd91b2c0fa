// src/ros_interface/subscriber.rs
// Sensor-side topics. Messages are drained without blocking and folded into the latest
// readings; the link turns those into one frame per tick.

use futures::future::FutureExt;
use futures::stream::{BoxStream, StreamExt};
use log::debug;
use r2r::{Node, QosProfile};
use r2r::geometry_msgs::msg::Point;
use r2r::std_msgs::msg::{Float32, Float32MultiArray};

use crate::RosConfig;
use crate::core::{Position, RangeSnapshot};

/// Latest values seen on the sensor topics
pub struct SensorSubscribers {
    intensity: BoxStream<'static, Float32>,
    ranges: BoxStream<'static, Float32MultiArray>,
    state: BoxStream<'static, Point>,
    /// Light sample received since the last frame, if any
    fresh_intensity: Option<f64>,
    latest_ranges: Option<RangeSnapshot>,
    latest_position: Option<Position>,
}

impl SensorSubscribers {
    /// Subscribes to the light, range and state topics.
    pub fn new(node: &mut Node, config: &RosConfig, qos: QosProfile) -> Result<Self, r2r::Error> {
        let intensity = node
            .subscribe::<Float32>(&config.intensity_topic, qos.clone())?
            .boxed();
        let ranges = node
            .subscribe::<Float32MultiArray>(&config.range_topic, qos.clone())?
            .boxed();
        let state = node.subscribe::<Point>(&config.state_topic, qos)?.boxed();

        Ok(SensorSubscribers {
            intensity,
            ranges,
            state,
            fresh_intensity: None,
            latest_ranges: None,
            latest_position: None,
        })
    }

    /// Folds every queued message into the latest readings.
    pub fn drain(&mut self) {
        while let Some(Some(msg)) = self.intensity.next().now_or_never() {
            self.fresh_intensity = Some(f64::from(msg.data));
        }
        while let Some(Some(msg)) = self.ranges.next().now_or_never() {
            self.latest_ranges = Some(ranges_from_array(&msg.data));
        }
        while let Some(Some(msg)) = self.state.next().now_or_never() {
            self.latest_position = Some(Position::new(msg.x, msg.y, msg.z));
        }
    }

    /// Light sample received since the previous call. Consumed, so a silent sensor shows
    /// up as a gap instead of a repeated reading.
    pub fn take_intensity(&mut self) -> Option<f64> {
        self.fresh_intensity.take()
    }

    /// Most recent ranges. Before the first message every beam reads NaN and is treated as
    /// clear by the controller.
    pub fn ranges(&self) -> RangeSnapshot {
        self.latest_ranges.unwrap_or_else(|| {
            debug!("No range message yet");
            RangeSnapshot::uniform(f64::NAN)
        })
    }

    /// Most recent position estimate.
    pub fn position(&self) -> Option<Position> {
        self.latest_position
    }
}

/// Multi-ranger layout: left, front, right, back, then an optional upward beam. Missing
/// entries read as NaN.
pub fn ranges_from_array(data: &[f32]) -> RangeSnapshot {
    let beam = |i: usize| data.get(i).map_or(f64::NAN, |d| f64::from(*d));
    RangeSnapshot {
        left: beam(0),
        front: beam(1),
        right: beam(2),
        back: beam(3),
        up: data.get(4).map(|d| f64::from(*d)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_multiranger_order() {
        let ranges = ranges_from_array(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(ranges.left, 1.0);
        assert_eq!(ranges.front, 2.0);
        assert_eq!(ranges.right, 3.0);
        assert_eq!(ranges.back, 4.0);
        assert_eq!(ranges.up, Some(5.0));
    }

    #[test]
    fn short_array_leaves_gaps() {
        let ranges = ranges_from_array(&[1.0, 2.0]);
        assert!(ranges.right.is_nan());
        assert!(ranges.back.is_nan());
        assert_eq!(ranges.up, None);
    }
}
