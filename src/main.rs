// src/main.rs
// Entry point for bcf-nav: loads the configuration, wires the controller to a vehicle
// (simulated arena, or ROS 2 with `--ros`) and flies until the light is found.

use bcf_nav::{
    BcfConfig, BcfError, CommandSink, Navigator, RunTumbleController, SensorLink,
    SimulatedWorld,
};
use log::{error, info, warn};
use std::path::Path;

const DEFAULT_CONFIG: &str = "config/bcf.yaml";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("bcf-nav failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), BcfError> {
    let mut config_path = None;
    let mut use_ros = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--ros" => use_ros = true,
            other => config_path = Some(other.to_string()),
        }
    }

    let config = load_config(config_path.as_deref())?;
    let controller = RunTumbleController::with_seed(config.controller.clone(), config.navigator.seed)?;
    info!(
        "Starting bcf-nav: d_min={} d_min_hard={} v_run={} K={} at {} Hz",
        config.controller.d_min,
        config.controller.d_min_hard,
        config.controller.v_run,
        config.controller.window_size,
        config.controller.tick_rate_hz
    );

    if use_ros {
        return run_ros(&config, controller);
    }

    let world = SimulatedWorld::new(config.simulation.clone())?;
    info!(
        "Simulated arena {}x{} m with {} obstacles, light at ({}, {})",
        config.simulation.arena_width,
        config.simulation.arena_height,
        world.obstacles().len(),
        config.simulation.light_x,
        config.simulation.light_y
    );
    let mut navigator = Navigator::new(world, controller, config.navigator.clone());
    fly(&mut navigator)?;

    let world = navigator.vehicle();
    info!(
        "Final position ({:.2}, {:.2}), {:.2} m from the light, {} blocked moves",
        world.position().x,
        world.position().y,
        world.distance_to_light(),
        world.collisions()
    );
    Ok(())
}

fn load_config(path: Option<&str>) -> Result<BcfConfig, BcfError> {
    match path {
        Some(path) => Ok(BcfConfig::from_yaml_file(path)?),
        None if Path::new(DEFAULT_CONFIG).exists() => Ok(BcfConfig::from_yaml_file(DEFAULT_CONFIG)?),
        None => {
            warn!("No configuration found at {}, using defaults", DEFAULT_CONFIG);
            let config = BcfConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn fly<V: SensorLink + CommandSink>(navigator: &mut Navigator<V>) -> Result<(), BcfError> {
    navigator.initialize()?;
    let ticks = navigator.run_and_shutdown()?;

    let status = navigator.status();
    let trajectory = navigator.trajectory();
    info!(
        "Run finished after {} ticks: source found = {}, RUN {} / TUMBLE {} / AVOID {}, {} ticks with sensor gaps",
        ticks,
        status.source_found,
        trajectory.count(bcf_nav::ActionState::Run),
        trajectory.count(bcf_nav::ActionState::Tumble),
        trajectory.count(bcf_nav::ActionState::Avoid),
        status.gap_ticks
    );
    Ok(())
}

#[cfg(feature = "ros")]
fn run_ros(config: &BcfConfig, controller: RunTumbleController) -> Result<(), BcfError> {
    use bcf_nav::ros_interface::RosLink;
    use std::time::Duration;

    let period = Duration::from_secs_f64(config.controller.tick_period());
    let link = RosLink::new(&config.ros, period)?;
    let mut navigator = Navigator::new(link, controller, config.navigator.clone());
    fly(&mut navigator)
}

#[cfg(not(feature = "ros"))]
fn run_ros(_config: &BcfConfig, _controller: RunTumbleController) -> Result<(), BcfError> {
    Err(BcfError::FeatureDisabled("ros"))
}
