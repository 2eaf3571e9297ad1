//! Unit tests for configuration validation.

use stepper_cycle::config::{parse_config, validate_config, EndsConfig, MotorConfig, SystemConfig};
use stepper_cycle::error::{ConfigError, Error, MotorError, PolicyError};
use stepper_cycle::{CycleError, TimerSettings};

fn with_motor(key: &str, motor: MotorConfig, period_us: u32) -> SystemConfig {
    let mut config = SystemConfig::new(TimerSettings::new(period_us));
    config
        .motors
        .insert(heapless::String::try_from(key).unwrap(), motor)
        .unwrap();
    config
}

/// Test that reversed CONST ends are rejected.
#[test]
fn test_reversed_ends() {
    let mut motor = MotorConfig::new(1, 2, 1000);
    motor.ends = EndsConfig::bounded(100, -100);

    let result = validate_config(&with_motor("x", motor, 200));
    assert!(matches!(
        result,
        Err(Error::Motor(MotorError::InvalidEnds { motor: 'x', min: 100, max: -100 }))
    ));
}

/// Test that a start position outside the ends is rejected.
#[test]
fn test_position_outside_ends() {
    let mut motor = MotorConfig::new(1, 2, 1000);
    motor.ends = EndsConfig::bounded(0, 100);
    motor.current_pos = 101;

    assert!(matches!(
        validate_config(&with_motor("x", motor, 200)),
        Err(Error::Motor(MotorError::PositionOutOfBounds { position: 101, .. }))
    ));
}

/// Test that a zero distance per step is rejected.
#[test]
fn test_zero_distance() {
    let mut motor = MotorConfig::new(1, 2, 1000);
    motor.distance_per_step = 0;

    assert!(matches!(
        validate_config(&with_motor("x", motor, 200)),
        Err(Error::Motor(MotorError::InvalidDistancePerStep('x')))
    ));
}

/// Test the tick period checks, in the order `start` applies them.
#[test]
fn test_tick_period() {
    let config = with_motor("x", MotorConfig::new(1, 2, 1000), 0);
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidTickPeriod(0)))
    ));

    let config = with_motor("x", MotorConfig::new(1, 2, 400), 200);
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::TimerMismatch {
            motor: 'x',
            error: CycleError::TimerPeriodTooLong,
        }))
    ));
}

/// Test that a disallowed policy action fails validation.
#[test]
fn test_disallowed_policy() {
    let toml_str = r#"
[timer]
period_us = 100

[error_policy]
soft_end = "fix"

[motors.x]
step_pin = 1
dir_pin = 2
pulse_delay_us = 300
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Policy(PolicyError::Disallowed { .. }))
    ));
}

/// Test that a program missing its kind's field is rejected.
#[test]
fn test_program_missing_field() {
    let toml_str = r#"
[timer]
period_us = 100

[motors.x]
step_pin = 1
dir_pin = 2
pulse_delay_us = 300

[programs.spin]
motor = "x"
kind = "whirl"
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::MissingProgramField { field: "dir", .. }))
    ));
}

/// Test that a valid config passes.
#[test]
fn test_valid_config() {
    let mut motor = MotorConfig::new(1, 2, 1000);
    motor.ends = EndsConfig::bounded(-500, 500).with_sensors(Some(3), Some(4));
    assert!(validate_config(&with_motor("x", motor, 250)).is_ok());
}
