// tests/navigation_tests.rs
// End-to-end behaviour of the run-and-tumble controller, driven through its public API.

use bcf_nav::navigation::{ControllerConfig, IntensityFilter, RunTumbleController};
use bcf_nav::{ActionState, MotionCommand, RangeSnapshot, SensorFrame};
use rstest::{fixture, rstest};

#[fixture]
fn controller() -> RunTumbleController {
    RunTumbleController::with_seed(ControllerConfig::default(), 42).unwrap()
}

fn open(intensity: f64) -> SensorFrame {
    SensorFrame::new(RangeSnapshot::uniform(1.0), intensity)
}

fn labels(controller: &mut RunTumbleController, frames: &[SensorFrame]) -> Vec<ActionState> {
    frames.iter().map(|f| controller.tick(f).label).collect()
}

#[rstest]
fn rising_intensity_keeps_running(mut controller: RunTumbleController) {
    let commands: Vec<MotionCommand> = (1..=50)
        .map(|i| controller.tick(&open(i as f64)))
        .collect();
    assert!(commands.iter().all(|c| c.label == ActionState::Run));
    assert!(commands.iter().all(|c| c.target_heading == 0.0));
}

#[rstest]
fn falling_intensity_tumbles_then_runs(mut controller: RunTumbleController) {
    let run = controller.tick(&open(10.0));
    let tumble = controller.tick(&open(9.0));
    let resumed = controller.tick(&open(8.0));

    assert_eq!(run.label, ActionState::Run);
    assert_eq!(tumble.label, ActionState::Tumble);
    assert_ne!(tumble.target_heading, run.target_heading);
    assert_eq!(resumed.label, ActionState::Run);
    assert_eq!(resumed.target_heading, tumble.target_heading);
}

#[rstest]
#[case::front(RangeSnapshot::new(0.2, 1.0, 1.0, 1.0))]
#[case::left(RangeSnapshot::new(1.0, 0.2, 1.0, 1.0))]
#[case::right(RangeSnapshot::new(1.0, 1.0, 0.2, 1.0))]
#[case::back(RangeSnapshot::new(1.0, 1.0, 1.0, 0.2))]
fn obstacle_overrides_gradient(#[case] ranges: RangeSnapshot, #[values(1.0, -1.0, 0.0)] slope: f64) {
    let mut controller = RunTumbleController::with_seed(ControllerConfig::default(), 3).unwrap();
    for i in 0..5 {
        let intensity = 10.0 + slope * i as f64;
        let command = controller.tick(&SensorFrame::new(ranges, intensity));
        assert_eq!(command.label, ActionState::Avoid);
    }
}

#[test]
fn constant_readings_average_to_the_constant() {
    let k = 10;
    let mut filter = IntensityFilter::new(k);
    let mut last = 0.0;
    for _ in 0..=k {
        last = filter.observe(7.25).current;
    }
    assert_eq!(last, 7.25);
    assert_eq!(filter.len(), k);
}

#[test]
fn avoidance_resumes_held_heading() {
    let theta = 1.2;
    let config = ControllerConfig {
        initial_heading: theta,
        ..Default::default()
    };
    let mut controller = RunTumbleController::with_seed(config, 11).unwrap();
    let mut intensity = 1.0;
    let mut next = |ranges: RangeSnapshot| {
        intensity += 1.0;
        SensorFrame::new(ranges, intensity)
    };

    assert_eq!(controller.tick(&next(RangeSnapshot::clear())).label, ActionState::Run);
    assert_eq!(controller.tick(&next(RangeSnapshot::clear())).label, ActionState::Run);

    let blocked = RangeSnapshot::new(0.15, 2.0, 1.0, 1.0);
    for _ in 0..4 {
        let command = controller.tick(&next(blocked));
        assert_eq!(command.label, ActionState::Avoid);
        assert_eq!(controller.state().current_heading().angle, theta);
    }

    let resumed = controller.tick(&next(RangeSnapshot::clear()));
    assert_eq!(resumed.label, ActionState::Run);
    assert_eq!(resumed.target_heading, theta);
    assert_eq!(resumed.forward_velocity, 0.3);
    assert_eq!(controller.state().resume_action(), None);
}

#[test]
fn short_window_tumbles_on_fourth_reading() {
    let config = ControllerConfig {
        window_size: 3,
        ..Default::default()
    };
    let mut controller = RunTumbleController::with_seed(config, 5).unwrap();

    let mut smoothed = Vec::new();
    let mut actions = Vec::new();
    for raw in [10.0, 10.0, 10.0, 5.0] {
        actions.push(controller.tick(&open(raw)).label);
        smoothed.push(controller.smoothed_intensity().unwrap());
    }

    assert_eq!(smoothed[..3], [10.0, 10.0, 10.0]);
    assert!((smoothed[3] - 25.0 / 3.0).abs() < 1e-9);
    assert_eq!(actions[3], ActionState::Tumble);
}

#[rstest]
fn hard_stop_inside_inner_threshold(mut controller: RunTumbleController) {
    let command = controller.tick(&SensorFrame::new(RangeSnapshot::new(0.05, 1.0, 1.0, 1.0), 4.0));
    assert_eq!(command.label, ActionState::Avoid);
    assert_eq!(command.forward_velocity, 0.0);
}

#[rstest]
#[case(0.2, 0.15)]
#[case(0.1, 0.0)]
#[case(0.25, 0.225)]
fn avoidance_speed_ramps_with_clearance(
    mut controller: RunTumbleController,
    #[case] front: f64,
    #[case] expected: f64,
) {
    let command = controller.tick(&SensorFrame::new(RangeSnapshot::new(front, 1.0, 1.0, 1.0), 4.0));
    assert!((command.forward_velocity - expected).abs() < 1e-9);
}

#[rstest]
fn flat_intensity_alternates(mut controller: RunTumbleController) {
    let frames = vec![open(3.0); 8];
    assert_eq!(
        labels(&mut controller, &frames),
        [
            ActionState::Run,
            ActionState::Tumble,
            ActionState::Run,
            ActionState::Tumble,
            ActionState::Run,
            ActionState::Tumble,
            ActionState::Run,
            ActionState::Tumble,
        ]
    );
}

#[test]
fn same_seed_same_headings() {
    let run = |seed| {
        let mut controller = RunTumbleController::with_seed(ControllerConfig::default(), seed).unwrap();
        (0..20)
            .map(|_| controller.tick(&open(1.0)).target_heading)
            .collect::<Vec<_>>()
    };
    assert_eq!(run(8), run(8));
    assert_ne!(run(8), run(9));
}

#[rstest]
fn intensity_history_advances_while_avoiding(mut controller: RunTumbleController) {
    let blocked = RangeSnapshot::new(0.2, 1.0, 1.0, 1.0);
    controller.tick(&open(2.0));
    assert_eq!(controller.state().last_intensity_avg(), Some(2.0));

    assert_eq!(controller.tick(&SensorFrame::new(blocked, 4.0)).label, ActionState::Avoid);
    assert_eq!(controller.state().previous_intensity_avg(), Some(2.0));
    assert_eq!(controller.state().last_intensity_avg(), Some(3.0));

    assert_eq!(controller.tick(&SensorFrame::new(blocked, 6.0)).label, ActionState::Avoid);
    assert_eq!(controller.state().previous_intensity_avg(), Some(3.0));
    assert_eq!(controller.state().last_intensity_avg(), Some(4.0));
}

#[rstest]
fn avoidance_during_tumble_resumes_tumble(mut controller: RunTumbleController) {
    controller.tick(&open(5.0));
    let tumble = controller.tick(&open(5.0));
    assert_eq!(tumble.label, ActionState::Tumble);

    let avoid = controller.tick(&SensorFrame::new(RangeSnapshot::new(1.0, 0.2, 1.0, 1.0), 5.0));
    assert_eq!(avoid.label, ActionState::Avoid);
    assert_eq!(controller.state().resume_action(), Some(ActionState::Tumble));

    let resumed = controller.tick(&open(5.0));
    assert_eq!(resumed.label, ActionState::Tumble);
    assert_eq!(resumed.target_heading, tumble.target_heading);
    assert_eq!(resumed.forward_velocity, 0.0);

    let run = controller.tick(&open(5.0));
    assert_eq!(run.label, ActionState::Run);
    assert_eq!(run.target_heading, tumble.target_heading);
    assert_eq!(run.forward_velocity, 0.3);
}
