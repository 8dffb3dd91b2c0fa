// src/apps/simulation.rs
// Planar test arena: a point light source with inverse-square falloff, circular obstacles
// and a four-beam multi-ranger. Stands in for the vehicle on both sides of the link.

use log::{debug, warn};
use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::BcfError;
use crate::core::{CommandSink, Direction, Position, RangeSnapshot, SensorFrame, SensorLink};
use crate::navigation::{ConfigError, MotionCommand, wrap_angle};

/// Clearance kept between random obstacles and the start point / light source (m)
const KEEP_OUT: f64 = 0.5;
const PLACEMENT_ATTEMPTS: usize = 100;

/// Arena settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Arena width (m)
    pub arena_width: f64,
    /// Arena height (m)
    pub arena_height: f64,
    /// Light source x (m)
    pub light_x: f64,
    /// Light source y (m)
    pub light_y: f64,
    /// Intensity at 1 m from the source
    pub intensity_scale: f64,
    /// Amplitude of uniform sensor noise
    pub intensity_noise: f64,
    /// Randomly placed obstacles
    pub obstacle_count: usize,
    /// Smallest obstacle radius (m)
    pub obstacle_min_radius: f64,
    /// Largest obstacle radius (m)
    pub obstacle_max_radius: f64,
    /// Start x (m)
    pub start_x: f64,
    /// Start y (m)
    pub start_y: f64,
    /// Start heading (rad)
    pub start_heading: f64,
    /// Multi-ranger reach; farther returns read as infinity (m)
    pub max_range: f64,
    /// Seconds integrated per command
    pub time_step: f64,
    /// Seed for obstacle placement and sensor noise
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            arena_width: 7.0,
            arena_height: 7.0,
            light_x: 3.5,
            light_y: 3.5,
            intensity_scale: 10.0,
            intensity_noise: 0.0,
            obstacle_count: 5,
            obstacle_min_radius: 0.2,
            obstacle_max_radius: 0.6,
            start_x: 1.0,
            start_y: 1.0,
            start_heading: 0.0,
            max_range: 4.0,
            time_step: 0.25,
            seed: 7,
        }
    }
}

impl SimulationConfig {
    /// Rejects arenas the simulator cannot step through.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::InvalidSetting(msg.to_string()));

        let fields = [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
            ("light_x", self.light_x),
            ("light_y", self.light_y),
            ("intensity_scale", self.intensity_scale),
            ("intensity_noise", self.intensity_noise),
            ("obstacle_min_radius", self.obstacle_min_radius),
            ("obstacle_max_radius", self.obstacle_max_radius),
            ("start_x", self.start_x),
            ("start_y", self.start_y),
            ("start_heading", self.start_heading),
            ("max_range", self.max_range),
            ("time_step", self.time_step),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::InvalidSetting(format!(
                "simulation.{name} must be finite (got {value})"
            )));
        }
        if !(self.arena_width > 0.0 && self.arena_height > 0.0) {
            return invalid("arena dimensions must be positive");
        }
        if !self.contains(self.start_x, self.start_y) {
            return invalid("start position lies outside the arena");
        }
        if !self.contains(self.light_x, self.light_y) {
            return invalid("light source lies outside the arena");
        }
        if !(self.intensity_scale > 0.0) || !(self.intensity_noise >= 0.0) {
            return invalid("intensity scale must be positive and noise non-negative");
        }
        if self.obstacle_count > 0
            && !(self.obstacle_min_radius > 0.0 && self.obstacle_min_radius <= self.obstacle_max_radius)
        {
            return invalid("obstacle radii must satisfy 0 < min <= max");
        }
        if !(self.max_range > 0.0) || !(self.time_step > 0.0) {
            return invalid("max_range and time_step must be positive");
        }
        Ok(())
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.arena_width).contains(&x) && (0.0..=self.arena_height).contains(&y)
    }
}

/// Circular obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleObstacle {
    /// Centre (m)
    pub center: Vector2<f64>,
    /// Radius (m)
    pub radius: f64,
}

impl CircleObstacle {
    /// Obstacle centred at (`x`, `y`).
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        CircleObstacle {
            center: Vector2::new(x, y),
            radius,
        }
    }

    fn contains(&self, point: &Vector2<f64>) -> bool {
        (point - self.center).norm() < self.radius
    }

    /// Distance along the unit ray to the first hit, if any.
    fn ray_hit(&self, origin: &Vector2<f64>, direction: &Vector2<f64>) -> Option<f64> {
        let offset = origin - self.center;
        let c = offset.norm_squared() - self.radius * self.radius;
        if c <= 0.0 {
            return Some(0.0); // origin inside the obstacle
        }
        let b = offset.dot(direction);
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let t = -b - discriminant.sqrt();
        (t >= 0.0).then_some(t)
    }
}

/// Simulated vehicle and its surroundings
pub struct SimulatedWorld {
    config: SimulationConfig,
    light: Vector2<f64>,
    obstacles: Vec<CircleObstacle>,
    position: Vector2<f64>,
    yaw: f64,
    rng: StdRng,
    collisions: u64,
}

impl SimulatedWorld {
    /// Builds a world with `obstacle_count` randomly placed obstacles.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let obstacles = Self::place_obstacles(&config, &mut rng);
        Ok(Self::assemble(config, obstacles, rng))
    }

    /// Builds a world with exactly the given obstacles.
    pub fn with_obstacles(
        config: SimulationConfig,
        obstacles: Vec<CircleObstacle>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self::assemble(config, obstacles, rng))
    }

    fn assemble(config: SimulationConfig, obstacles: Vec<CircleObstacle>, rng: StdRng) -> Self {
        SimulatedWorld {
            light: Vector2::new(config.light_x, config.light_y),
            position: Vector2::new(config.start_x, config.start_y),
            yaw: wrap_angle(config.start_heading),
            obstacles,
            rng,
            collisions: 0,
            config,
        }
    }

    fn place_obstacles(config: &SimulationConfig, rng: &mut StdRng) -> Vec<CircleObstacle> {
        let start = Vector2::new(config.start_x, config.start_y);
        let light = Vector2::new(config.light_x, config.light_y);
        let mut obstacles = Vec::with_capacity(config.obstacle_count);

        for _ in 0..config.obstacle_count {
            let placed = (0..PLACEMENT_ATTEMPTS).find_map(|_| {
                let radius = if config.obstacle_min_radius < config.obstacle_max_radius {
                    rng.gen_range(config.obstacle_min_radius..config.obstacle_max_radius)
                } else {
                    config.obstacle_min_radius
                };
                if 2.0 * radius >= config.arena_width.min(config.arena_height) {
                    return None;
                }
                let x = rng.gen_range(radius..config.arena_width - radius);
                let y = rng.gen_range(radius..config.arena_height - radius);
                let candidate = CircleObstacle::new(x, y, radius);
                let clear = [start, light]
                    .iter()
                    .all(|p| (p - candidate.center).norm() > radius + KEEP_OUT);
                clear.then_some(candidate)
            });
            match placed {
                Some(obstacle) => obstacles.push(obstacle),
                None => warn!("Could not place obstacle clear of start and light, skipping"),
            }
        }
        obstacles
    }

    /// Inverse-square light reading at the current position.
    pub fn light_intensity(&mut self) -> f64 {
        let distance_sq = (self.position - self.light).norm_squared().max(1e-6);
        let noise = if self.config.intensity_noise > 0.0 {
            let amplitude = self.config.intensity_noise;
            self.rng.gen_range(-amplitude..amplitude)
        } else {
            0.0
        };
        self.config.intensity_scale / distance_sq + noise
    }

    /// Distance along one multi-ranger beam, infinity beyond `max_range`.
    pub fn range(&self, direction: Direction) -> f64 {
        let angle = self.yaw + direction.bearing();
        let ray = Vector2::new(angle.cos(), angle.sin());

        let obstacle_hit = self
            .obstacles
            .iter()
            .filter_map(|o| o.ray_hit(&self.position, &ray))
            .fold(f64::INFINITY, f64::min);
        let distance = obstacle_hit.min(self.wall_distance(&ray));

        if distance > self.config.max_range {
            f64::INFINITY
        } else {
            distance
        }
    }

    fn wall_distance(&self, ray: &Vector2<f64>) -> f64 {
        let axis = |position: f64, component: f64, extent: f64| {
            if component > 1e-12 {
                (extent - position) / component
            } else if component < -1e-12 {
                -position / component
            } else {
                f64::INFINITY
            }
        };
        axis(self.position.x, ray.x, self.config.arena_width)
            .min(axis(self.position.y, ray.y, self.config.arena_height))
    }

    /// Multi-ranger snapshot in the body frame.
    pub fn ranges(&self) -> RangeSnapshot {
        RangeSnapshot::new(
            self.range(Direction::Front),
            self.range(Direction::Left),
            self.range(Direction::Right),
            self.range(Direction::Back),
        )
    }

    /// Applies one command for `time_step` seconds. The flight controller is assumed to
    /// hold the commanded heading; moves into an obstacle are refused and counted.
    pub fn apply(&mut self, command: &MotionCommand) {
        self.yaw = wrap_angle(command.target_heading);
        let step = command.forward_velocity * self.config.time_step;
        let mut next = self.position + Vector2::new(self.yaw.cos(), self.yaw.sin()) * step;
        next.x = next.x.clamp(0.0, self.config.arena_width);
        next.y = next.y.clamp(0.0, self.config.arena_height);

        if self.obstacles.iter().any(|o| o.contains(&next)) {
            self.collisions += 1;
            warn!("Refused move into obstacle at ({:.2}, {:.2})", next.x, next.y);
            return;
        }
        self.position = next;
        debug!(
            "{} -> ({:.3}, {:.3}) yaw {:.3}",
            command.label, self.position.x, self.position.y, self.yaw
        );
    }

    /// Current vehicle position.
    pub fn position(&self) -> Position {
        Position::from(self.position)
    }

    /// Current vehicle heading (rad).
    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    /// Planar distance to the light source (m).
    pub fn distance_to_light(&self) -> f64 {
        (self.position - self.light).norm()
    }

    /// Obstacles in the arena.
    pub fn obstacles(&self) -> &[CircleObstacle] {
        &self.obstacles
    }

    /// Moves refused because they ended inside an obstacle.
    pub fn collisions(&self) -> u64 {
        self.collisions
    }
}

impl SensorLink for SimulatedWorld {
    fn poll(&mut self) -> Result<Option<SensorFrame>, BcfError> {
        let intensity = self.light_intensity();
        let frame = SensorFrame::new(self.ranges(), intensity).with_position(self.position());
        Ok(Some(frame))
    }
}

impl CommandSink for SimulatedWorld {
    fn send(&mut self, command: &MotionCommand) -> Result<(), BcfError> {
        self.apply(command);
        Ok(())
    }
}
