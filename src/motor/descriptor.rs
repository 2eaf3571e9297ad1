//! Static configuration and position of one motor.

use embedded_hal::digital::PinState;

use crate::config::{EndSide, EndStrategy, EndsConfig, MotorConfig};
use crate::error::{MotorError, Result};
use crate::hal::PinId;
use crate::program::Direction;

use super::position::Position;

/// Pin connections of one motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorPins {
    /// STEP output.
    pub step: PinId,
    /// DIR output.
    pub dir: PinId,
    /// Active-low enable output; `None` means always enabled.
    pub enable: Option<PinId>,
    /// Min-side limit sensor.
    pub min_end: Option<PinId>,
    /// Max-side limit sensor.
    pub max_end: Option<PinId>,
}

/// One physical axis.
///
/// Created once and reused across runs. Only the tick handler moves
/// `position` while a cycle runs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorDescriptor {
    name: char,
    pins: MotorPins,
    dir_inv: i8,
    pulse_delay_us: u32,
    distance_per_step: i32,
    min_strategy: EndStrategy,
    max_strategy: EndStrategy,
    position: Position,
}

impl MotorDescriptor {
    pub(crate) fn new(
        name: char,
        pins: MotorPins,
        invert_direction: bool,
        pulse_delay_us: u32,
        distance_per_step: i32,
        current_pos: i64,
        ends: EndsConfig,
    ) -> Result<Self> {
        let mut motor = Self {
            name,
            pins,
            dir_inv: if invert_direction { -1 } else { 1 },
            pulse_delay_us,
            distance_per_step,
            min_strategy: EndStrategy::Inf,
            max_strategy: EndStrategy::Inf,
            position: Position::new(current_pos, 0, 0),
        };

        if pulse_delay_us == 0 {
            return Err(MotorError::InvalidPulseDelay(name).into());
        }
        if distance_per_step == 0 {
            return Err(MotorError::InvalidDistancePerStep(name).into());
        }
        motor.set_ends(ends)?;
        Ok(motor)
    }

    /// Build a descriptor from its configuration entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the pulse delay or distance per step is zero, or
    /// the ends are inconsistent with each other or with `current_pos`.
    pub fn from_config(name: char, config: &MotorConfig) -> Result<Self> {
        let pins = MotorPins {
            step: config.step_pin,
            dir: config.dir_pin,
            enable: config.enable_pin,
            min_end: None,
            max_end: None,
        };
        Self::new(
            name,
            pins,
            config.invert_direction,
            config.pulse_delay_us,
            config.distance_per_step,
            config.current_pos,
            config.ends,
        )
    }

    /// Replace limit sensors, strategies and soft ends.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the descriptor unchanged, if CONST/CONST
    /// ends are reversed or the current position lies outside them.
    pub fn set_ends(&mut self, ends: EndsConfig) -> Result<()> {
        if !ends.is_valid() {
            return Err(MotorError::InvalidEnds {
                motor: self.name,
                min: ends.min_pos,
                max: ends.max_pos,
            }
            .into());
        }
        if !ends.contains(self.position.current) {
            return Err(MotorError::PositionOutOfBounds {
                motor: self.name,
                position: self.position.current,
            }
            .into());
        }

        self.pins.min_end = ends.min_pin;
        self.pins.max_end = ends.max_pin;
        self.min_strategy = ends.min_strategy;
        self.max_strategy = ends.max_strategy;
        self.position.min = ends.min_pos;
        self.position.max = ends.max_pos;
        Ok(())
    }

    /// Current boundary configuration.
    pub fn ends(&self) -> EndsConfig {
        EndsConfig {
            min_pin: self.pins.min_end,
            max_pin: self.pins.max_end,
            min_strategy: self.min_strategy,
            max_strategy: self.max_strategy,
            min_pos: self.position.min,
            max_pos: self.position.max,
        }
    }

    /// Single-character motor name.
    #[inline]
    pub fn name(&self) -> char {
        self.name
    }

    /// Pin connections.
    #[inline]
    pub fn pins(&self) -> &MotorPins {
        &self.pins
    }

    /// Direction inversion sign, `1` or `-1`.
    #[inline]
    pub fn dir_inv(&self) -> i8 {
        self.dir_inv
    }

    /// Minimum delay between two pulses in microseconds.
    #[inline]
    pub fn pulse_delay_us(&self) -> u32 {
        self.pulse_delay_us
    }

    /// Signed position change per step.
    #[inline]
    pub fn distance_per_step(&self) -> i32 {
        self.distance_per_step
    }

    /// Position and soft ends.
    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub(crate) fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    /// Current position.
    #[inline]
    pub fn current_pos(&self) -> i64 {
        self.position.current
    }

    /// Overwrite the current position (e.g. after homing).
    ///
    /// # Errors
    ///
    /// Returns an error if the position lies outside CONST ends.
    pub fn set_current_pos(&mut self, position: i64) -> Result<()> {
        if !self.ends().contains(position) {
            return Err(MotorError::PositionOutOfBounds {
                motor: self.name,
                position,
            }
            .into());
        }
        self.position.current = position;
        Ok(())
    }

    /// DIR pin level for a direction.
    #[inline]
    pub fn dir_level(&self, dir: Direction) -> PinState {
        PinState::from(dir.sign() * self.dir_inv as i64 > 0)
    }

    /// Position change of one step in `dir`.
    #[inline]
    pub fn step_delta(&self, dir: Direction) -> i64 {
        dir.sign() * self.distance_per_step as i64
    }

    /// Strategy of one side.
    #[inline]
    pub fn strategy(&self, side: EndSide) -> EndStrategy {
        match side {
            EndSide::Min => self.min_strategy,
            EndSide::Max => self.max_strategy,
        }
    }

    /// Limit sensor of one side.
    #[inline]
    pub fn sensor(&self, side: EndSide) -> Option<PinId> {
        match side {
            EndSide::Min => self.pins.min_end,
            EndSide::Max => self.pins.max_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MotorConfig {
        MotorConfig::new(2, 3, 1000)
    }

    #[test]
    fn test_dir_level_follows_inversion() {
        let mut cfg = config();
        let motor = MotorDescriptor::from_config('x', &cfg).unwrap();
        assert_eq!(motor.dir_level(Direction::Forward), PinState::High);
        assert_eq!(motor.dir_level(Direction::Backward), PinState::Low);

        cfg.invert_direction = true;
        let motor = MotorDescriptor::from_config('x', &cfg).unwrap();
        assert_eq!(motor.dir_inv(), -1);
        assert_eq!(motor.dir_level(Direction::Forward), PinState::Low);
    }

    #[test]
    fn test_negative_distance_flips_side() {
        let mut cfg = config();
        cfg.distance_per_step = -10;
        let motor = MotorDescriptor::from_config('x', &cfg).unwrap();

        let delta = motor.step_delta(Direction::Forward);
        assert_eq!(delta, -10);
        assert_eq!(EndSide::of_delta(delta), EndSide::Min);
    }

    #[test]
    fn test_rejects_invalid_fields() {
        let mut cfg = config();
        cfg.distance_per_step = 0;
        assert!(matches!(
            MotorDescriptor::from_config('x', &cfg),
            Err(crate::Error::Motor(MotorError::InvalidDistancePerStep('x')))
        ));

        let mut cfg = config();
        cfg.current_pos = 500;
        cfg.ends = EndsConfig::bounded(0, 100);
        assert!(matches!(
            MotorDescriptor::from_config('x', &cfg),
            Err(crate::Error::Motor(MotorError::PositionOutOfBounds { position: 500, .. }))
        ));
    }

    #[test]
    fn test_set_ends_is_atomic() {
        let mut motor = MotorDescriptor::from_config('x', &config()).unwrap();
        let before = motor.clone();

        assert!(motor.set_ends(EndsConfig::bounded(10, -10)).is_err());
        assert_eq!(motor, before);

        motor
            .set_ends(EndsConfig::bounded(-50, 50).with_sensors(Some(7), None))
            .unwrap();
        assert_eq!(motor.sensor(EndSide::Min), Some(7));
        assert_eq!(motor.strategy(EndSide::Max), EndStrategy::Const);
        assert_eq!(motor.position().max, 50);
    }
}
