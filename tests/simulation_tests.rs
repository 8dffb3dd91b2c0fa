// tests/simulation_tests.rs
// Closed-loop runs of the navigator against the simulated arena.

use bcf_nav::apps::CircleObstacle;
use bcf_nav::{
    ActionState, ControllerConfig, Navigator, NavigatorConfig, RunTumbleController,
    SimulatedWorld, SimulationConfig, TrajectoryLog,
};
use std::f64::consts::FRAC_PI_2;

fn arena(start_x: f64) -> SimulationConfig {
    SimulationConfig {
        obstacle_count: 0,
        start_x,
        start_y: 3.5,
        start_heading: 0.0,
        ..Default::default()
    }
}

fn navigator(world: SimulatedWorld, config: NavigatorConfig) -> Navigator<SimulatedWorld> {
    let controller = RunTumbleController::with_seed(ControllerConfig::default(), 17).unwrap();
    let mut navigator = Navigator::new(world, controller, config);
    navigator.initialize().unwrap();
    navigator
}

fn unbounded() -> NavigatorConfig {
    NavigatorConfig {
        source_found_intensity: None,
        trajectory_path: None,
        ..Default::default()
    }
}

#[test]
fn runs_straight_at_the_light() {
    let world = SimulatedWorld::new(arena(1.0)).unwrap();
    let mut nav = navigator(world, unbounded());

    let mut distances = vec![nav.vehicle().distance_to_light()];
    for _ in 0..20 {
        let telemetry = nav.run_cycle().unwrap().unwrap();
        assert_eq!(telemetry.action(), ActionState::Run);
        distances.push(nav.vehicle().distance_to_light());
    }
    assert!(distances.windows(2).all(|w| w[1] < w[0]));
    assert_eq!(nav.trajectory().count(ActionState::Run), 20);
}

#[test]
fn turns_away_from_obstacle_ahead() {
    let obstacle = CircleObstacle::new(2.0, 3.5, 0.3);
    let world = SimulatedWorld::with_obstacles(arena(1.0), vec![obstacle]).unwrap();
    let mut nav = navigator(world, unbounded());

    let mut commands = Vec::new();
    for _ in 0..15 {
        let telemetry = nav.run_cycle().unwrap().unwrap();
        commands.push(telemetry.command);
        let position = nav.vehicle().position().planar();
        assert!((position - obstacle.center).norm() >= obstacle.radius);
    }

    // front clearance drops below 0.3 m on the seventh reading
    assert!(commands[..6].iter().all(|c| c.label == ActionState::Run));
    assert_eq!(commands[6].label, ActionState::Avoid);
    // left and right are equally clear, left wins
    assert!((commands[6].target_heading - FRAC_PI_2).abs() < 1e-9);
    assert!(commands[6].forward_velocity < 0.3);
}

#[test]
fn stops_when_source_found() {
    let world = SimulatedWorld::new(arena(2.5)).unwrap();
    let config = NavigatorConfig {
        source_found_intensity: Some(100.0),
        trajectory_path: None,
        ..Default::default()
    };
    let mut nav = navigator(world, config);

    let ticks = nav.run().unwrap();
    let status = nav.status();
    assert!(status.source_found);
    assert_eq!(ticks, 13);
    assert_eq!(nav.trajectory().last().unwrap().command.forward_velocity, 0.0);
    assert!(nav.vehicle().distance_to_light() < 0.2);
    assert!(nav.run_cycle().unwrap().is_none());
}

#[test]
fn shutdown_writes_trajectory() {
    let path = std::env::temp_dir().join(format!("bcf_trajectory_{}.yaml", std::process::id()));
    let world = SimulatedWorld::new(arena(1.0)).unwrap();
    let config = NavigatorConfig {
        source_found_intensity: None,
        max_ticks: 8,
        trajectory_path: Some(path.to_string_lossy().into_owned()),
        ..Default::default()
    };
    let mut nav = navigator(world, config);

    assert_eq!(nav.run().unwrap(), 8);
    nav.shutdown().unwrap();

    let saved = TrajectoryLog::load(&path).unwrap();
    assert_eq!(saved.len(), 8);
    assert_eq!(saved.records().front().unwrap().tick, 1);
    assert!(saved.records().iter().all(|t| t.position.is_some()));
    std::fs::remove_file(&path).unwrap();
}
