//! Unit tests for TOML configuration parsing.

use stepper_cycle::config::{load_config, parse_config, EndStrategy, ProgramKind, SystemConfig};
use stepper_cycle::{CalibrateMode, Direction, ErrorAction};

/// Test parsing a valid motor configuration from TOML.
#[test]
fn test_parse_motor_config() {
    let toml_str = r#"
[timer]
period_us = 250

[motors.x]
step_pin = 10
dir_pin = 11
enable_pin = 12
invert_direction = true
pulse_delay_us = 1000
distance_per_step = 5
current_pos = -40

[motors.x.ends]
min_pin = 20
max_pin = 21
min_strategy = "const"
min_pos = -100
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let motor = config.motor("x").expect("Motor not found");

    assert_eq!(motor.step_pin, 10);
    assert_eq!(motor.dir_pin, 11);
    assert_eq!(motor.enable_pin, Some(12));
    assert!(motor.invert_direction);
    assert_eq!(motor.pulse_delay_us, 1000);
    assert_eq!(motor.distance_per_step, 5);
    assert_eq!(motor.current_pos, -40);
    assert_eq!(motor.ends.min_pin, Some(20));
    assert_eq!(motor.ends.min_strategy, EndStrategy::Const);
    assert_eq!(motor.ends.max_strategy, EndStrategy::Inf);
    assert_eq!(motor.ends.min_pos, -100);
}

/// Test parsing every program kind.
#[test]
fn test_parse_programs() {
    let toml_str = r#"
[timer]
period_us = 100

[motors.z]
step_pin = 1
dir_pin = 2
pulse_delay_us = 300

[programs.jog]
motor = "z"
kind = "steps"
count = -250
delay_us = 600

[programs.seek_top]
motor = "z"
kind = "whirl"
dir = "forward"
calibrate = "calibrate_bounds_max_pos"

[programs.accel]
motor = "z"
kind = "simple_buffered"
delays_us = [1200, 900, 600, 300]
scale = 8

[programs.profile]
motor = "z"
kind = "buffered"
delays_us = [900, 300, 900]
repeats = [10, 100, 10]
"#;

    let config = parse_config(toml_str).expect("valid config");

    let jog = config.program("jog").unwrap();
    assert_eq!(jog.kind, ProgramKind::Steps);
    assert_eq!(jog.count, Some(-250));
    assert_eq!(jog.delay_us, 600);

    let seek = config.program("seek_top").unwrap();
    assert_eq!(seek.dir, Some(Direction::Forward));
    assert_eq!(seek.calibrate, CalibrateMode::CalibrateBoundsMaxPos);

    let accel = config.program("accel").unwrap();
    assert_eq!(accel.scale, Some(8));
    assert_eq!(accel.to_program("accel").unwrap().remaining_steps(), Some(32));

    let profile = config.program("profile").unwrap();
    assert_eq!(profile.to_program("profile").unwrap().remaining_steps(), Some(120));

    assert_eq!(config.program_names().count(), 4);
}

/// Test the error policy table defaults to "keep".
#[test]
fn test_parse_error_policy() {
    let toml_str = r#"
[timer]
period_us = 100

[error_policy]
hard_end = "stop_motor"
cycle_timing_exceeded = "ignore"

[motors.x]
step_pin = 1
dir_pin = 2
pulse_delay_us = 300
"#;

    let config = parse_config(toml_str).unwrap();
    assert_eq!(config.error_policy.hard_end, ErrorAction::StopMotor);
    assert_eq!(config.error_policy.soft_end, ErrorAction::DontChange);
    assert_eq!(config.error_policy.cycle_timing_exceeded, ErrorAction::Ignore);
}

/// Test that a missing timer section is a parse error.
#[test]
fn test_missing_timer() {
    let toml_str = r#"
[motors.x]
step_pin = 1
dir_pin = 2
pulse_delay_us = 300
"#;

    assert!(toml::from_str::<SystemConfig>(toml_str).is_err());
}

/// Test loading from a file on disk.
#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join(format!("stepper-cycle-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        "[timer]\nperiod_us = 200\n\n[motors.a]\nstep_pin = 1\ndir_pin = 2\npulse_delay_us = 600\n",
    )
    .unwrap();

    let config = load_config(&path).expect("config loads");
    std::fs::remove_file(&path).ok();

    assert_eq!(config.timer.period_us, 200);
    assert!(config.motor("a").is_some());
}

#[test]
fn test_load_missing_file() {
    assert!(load_config("/nonexistent/stepper-cycle.toml").is_err());
}
