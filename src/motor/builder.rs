//! Builder pattern for MotorDescriptor.

use crate::config::{EndsConfig, MotorConfig};
use crate::error::{MotorError, Result};
use crate::hal::PinId;

use super::descriptor::{MotorDescriptor, MotorPins};

/// Builder for creating MotorDescriptor instances.
#[derive(Debug, Clone)]
pub struct MotorDescriptorBuilder {
    name: char,
    step_pin: Option<PinId>,
    dir_pin: Option<PinId>,
    enable_pin: Option<PinId>,
    invert_direction: bool,
    pulse_delay_us: Option<u32>,
    distance_per_step: i32,
    current_pos: i64,
    ends: EndsConfig,
}

impl MotorDescriptorBuilder {
    /// Create a new builder for the motor called `name`.
    pub fn new(name: char) -> Self {
        Self {
            name,
            step_pin: None,
            dir_pin: None,
            enable_pin: None,
            invert_direction: false,
            pulse_delay_us: None,
            distance_per_step: 1,
            current_pos: 0,
            ends: EndsConfig::default(),
        }
    }

    /// Set the STEP pin.
    pub fn step_pin(mut self, pin: PinId) -> Self {
        self.step_pin = Some(pin);
        self
    }

    /// Set the DIR pin.
    pub fn dir_pin(mut self, pin: PinId) -> Self {
        self.dir_pin = Some(pin);
        self
    }

    /// Set the active-low enable pin.
    pub fn enable_pin(mut self, pin: PinId) -> Self {
        self.enable_pin = Some(pin);
        self
    }

    /// Set direction inversion.
    pub fn invert_direction(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Set the minimum delay between pulses.
    pub fn pulse_delay_us(mut self, delay_us: u32) -> Self {
        self.pulse_delay_us = Some(delay_us);
        self
    }

    /// Set the signed position change per step.
    pub fn distance_per_step(mut self, distance: i32) -> Self {
        self.distance_per_step = distance;
        self
    }

    /// Set the starting position.
    pub fn current_pos(mut self, position: i64) -> Self {
        self.current_pos = position;
        self
    }

    /// Set limit sensors and soft ends.
    pub fn ends(mut self, ends: EndsConfig) -> Self {
        self.ends = ends;
        self
    }

    /// Configure from a MotorConfig.
    pub fn from_motor_config(mut self, config: &MotorConfig) -> Self {
        self.step_pin = Some(config.step_pin);
        self.dir_pin = Some(config.dir_pin);
        self.enable_pin = config.enable_pin;
        self.invert_direction = config.invert_direction;
        self.pulse_delay_us = Some(config.pulse_delay_us);
        self.distance_per_step = config.distance_per_step;
        self.current_pos = config.current_pos;
        self.ends = config.ends;
        self
    }

    /// Build the MotorDescriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if a pin or the pulse delay is missing, or a field
    /// is invalid.
    pub fn build(self) -> Result<MotorDescriptor> {
        let step = self.step_pin.ok_or(MotorError::MissingPin("step_pin"))?;
        let dir = self.dir_pin.ok_or(MotorError::MissingPin("dir_pin"))?;
        let pulse_delay_us = self
            .pulse_delay_us
            .ok_or(MotorError::InvalidPulseDelay(self.name))?;

        let pins = MotorPins {
            step,
            dir,
            enable: self.enable_pin,
            min_end: None,
            max_end: None,
        };

        MotorDescriptor::new(
            self.name,
            pins,
            self.invert_direction,
            pulse_delay_us,
            self.distance_per_step,
            self.current_pos,
            self.ends,
        )
    }
}
