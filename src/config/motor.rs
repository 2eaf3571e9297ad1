//! Motor configuration from TOML.

use serde::Deserialize;

use crate::hal::PinId;

use super::ends::EndsConfig;

/// Complete motor configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MotorConfig {
    /// STEP output pin.
    pub step_pin: PinId,

    /// DIR output pin.
    pub dir_pin: PinId,

    /// Driver enable output (active low), if wired.
    #[serde(default)]
    pub enable_pin: Option<PinId>,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Minimum delay between two step pulses in microseconds.
    pub pulse_delay_us: u32,

    /// Position change per step in base units. Negative values flip the
    /// logical direction without touching the DIR pin polarity.
    #[serde(default = "default_distance_per_step")]
    pub distance_per_step: i32,

    /// Position at power-up.
    #[serde(default)]
    pub current_pos: i64,

    /// Travel boundaries.
    #[serde(default)]
    pub ends: EndsConfig,
}

fn default_distance_per_step() -> i32 {
    1
}

impl MotorConfig {
    /// Configuration with default ends, positioned at 0.
    pub fn new(step_pin: PinId, dir_pin: PinId, pulse_delay_us: u32) -> Self {
        Self {
            step_pin,
            dir_pin,
            enable_pin: None,
            invert_direction: false,
            pulse_delay_us,
            distance_per_step: default_distance_per_step(),
            current_pos: 0,
            ends: EndsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MotorConfig::new(2, 3, 1000);
        assert_eq!(config.distance_per_step, 1);
        assert_eq!(config.enable_pin, None);
        assert!(config.ends.contains(i64::MAX));
    }
}
