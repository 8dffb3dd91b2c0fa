//! ROS 2 link for the run-and-tumble controller
//!
//! This module connects the navigator to a real vehicle over ROS 2:
//! - Subscribing to the light sensor, multi-ranger and position topics
//! - Publishing velocity, heading and action label per tick
//! - Pacing ticks at the configured sensing rate

mod publisher;
mod subscriber;

use log::{debug, info};
use r2r::{Context, Node, QosProfile};
use std::time::{Duration, Instant};

pub use publisher::*;
pub use subscriber::*;

use crate::core::{CommandSink, SensorFrame, SensorLink};
use crate::navigation::MotionCommand;
use crate::{BcfError, RosConfig};

/// Vehicle reached through ROS 2 topics
pub struct RosLink {
    node: Node,
    subscribers: SensorSubscribers,
    publishers: CommandPublishers,
    tick_period: Duration,
    next_tick: Instant,
}

impl RosLink {
    /// Creates the node, its subscriptions and publishers
    pub fn new(config: &RosConfig, tick_period: Duration) -> Result<Self, BcfError> {
        let context = Context::create()?;
        let mut node = Node::create(context, &config.node_name, &config.namespace)?;
        let qos = QosProfile::default().keep_last(config.qos_depth);

        let subscribers = SensorSubscribers::new(&mut node, config, qos.clone())?;
        let publishers = CommandPublishers::new(&mut node, config, qos)?;
        info!(
            "ROS link up: node '{}', sensing '{}' / '{}' / '{}', commanding '{}'",
            config.node_name,
            config.intensity_topic,
            config.range_topic,
            config.state_topic,
            config.cmd_vel_topic
        );

        Ok(RosLink {
            node,
            subscribers,
            publishers,
            tick_period,
            next_tick: Instant::now() + tick_period,
        })
    }
}

impl SensorLink for RosLink {
    /// Spins the node until the next tick is due, then assembles a frame from the latest
    /// readings.
    fn poll(&mut self) -> Result<Option<SensorFrame>, BcfError> {
        let mut now = Instant::now();
        while now < self.next_tick {
            self.node.spin_once(self.next_tick - now);
            self.subscribers.drain();
            now = Instant::now();
        }
        self.next_tick += self.tick_period;
        if self.next_tick < Instant::now() {
            // fell behind, resync
            self.next_tick = Instant::now() + self.tick_period;
        }
        self.subscribers.drain();

        let frame = SensorFrame {
            ranges: self.subscribers.ranges(),
            intensity: self.subscribers.take_intensity(),
            position: self.subscribers.position(),
        };
        debug!("Frame: {:?}", frame);
        Ok(Some(frame))
    }
}

impl CommandSink for RosLink {
    fn send(&mut self, command: &MotionCommand) -> Result<(), BcfError> {
        self.publishers.publish(command)?;
        Ok(())
    }
}
