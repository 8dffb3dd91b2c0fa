// src/ros_interface/publisher.rs
// Command-side topics: world-frame velocity, target heading and the action label.

use r2r::{Node, Publisher, QosProfile};
use r2r::geometry_msgs::msg::{Twist, Vector3};
use r2r::std_msgs::msg::{Float32, String as StringMsg};

use crate::RosConfig;
use crate::navigation::MotionCommand;

/// Publishers for the per-tick command topics
pub struct CommandPublishers {
    cmd_vel: Publisher<Twist>,
    heading: Publisher<Float32>,
    action: Publisher<StringMsg>,
}

impl CommandPublishers {
    /// Creates the three publishers on `node`.
    pub fn new(node: &mut Node, config: &RosConfig, qos: QosProfile) -> Result<Self, r2r::Error> {
        Ok(CommandPublishers {
            cmd_vel: node.create_publisher::<Twist>(&config.cmd_vel_topic, qos.clone())?,
            heading: node.create_publisher::<Float32>(&config.heading_topic, qos.clone())?,
            action: node.create_publisher::<StringMsg>(&config.action_topic, qos)?,
        })
    }

    /// Publishes velocity, heading and label for one command.
    pub fn publish(&self, command: &MotionCommand) -> Result<(), r2r::Error> {
        self.cmd_vel.publish(&to_twist(command))?;
        self.heading.publish(&Float32 {
            data: command.target_heading as f32,
        })?;
        self.action.publish(&StringMsg {
            data: command.label.as_str().to_string(),
        })
    }
}

/// Twist with the world-frame linear velocity; the flight controller holds the heading.
pub fn to_twist(command: &MotionCommand) -> Twist {
    let (vx, vy) = command.velocity_components();
    Twist {
        linear: Vector3 { x: vx, y: vy, z: 0.0 },
        angular: Vector3 { x: 0.0, y: 0.0, z: 0.0 },
    }
}
