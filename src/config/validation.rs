//! Configuration validation.

use crate::error::{ConfigError, Error, Result};
use crate::motor::MotorDescriptor;

use super::system::motor_name;
use super::SystemConfig;

/// Validate a system configuration.
///
/// Checks:
/// - Tick period is non-zero and can drive every motor
/// - Motor keys are single characters and motor fields are valid
/// - Error policy update only uses allowed actions
/// - Programs reference existing motors and carry the fields their kind needs
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    if config.timer.period_us == 0 {
        return Err(Error::Config(ConfigError::InvalidTickPeriod(0)));
    }

    config.error_policy.validate()?;

    for (key, motor) in config.motors.iter() {
        let name = motor_name(key.as_str())
            .ok_or_else(|| Error::Config(ConfigError::InvalidMotorName(key.clone())))?;

        let descriptor = MotorDescriptor::from_config(name, motor)?;

        config
            .timer
            .check_pulse_delay(descriptor.pulse_delay_us())
            .map_err(|error| Error::Config(ConfigError::TimerMismatch { motor: name, error }))?;
    }

    for (name, program) in config.programs.iter() {
        if config.motor(program.motor.as_str()).is_none() {
            return Err(Error::Config(ConfigError::MotorNotFound(program.motor.clone())));
        }
        program.validate(name.as_str())?;
    }

    Ok(())
}
