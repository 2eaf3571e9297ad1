//! Tick timer settings.

use serde::Deserialize;

use crate::cycle::CycleError;

/// A motor's pulse delay must span at least this many tick periods.
pub const MIN_TICKS_PER_PULSE: u64 = 3;

/// Tick timer configuration.
///
/// The engine only uses `period_us`. The hardware fields are handed to
/// [`crate::hal::TickTimer::configure`] untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerSettings {
    /// Tick period in microseconds.
    pub period_us: u32,

    /// Hardware timer index.
    #[serde(default)]
    pub timer: u8,

    /// Prescaler register value.
    #[serde(default)]
    pub prescaler: u32,

    /// Period (auto-reload) register value.
    #[serde(default)]
    pub divisor: u32,
}

impl TimerSettings {
    /// Settings with only a tick period.
    pub const fn new(period_us: u32) -> Self {
        Self {
            period_us,
            timer: 0,
            prescaler: 0,
            divisor: 0,
        }
    }

    /// Settings with hardware register values.
    pub const fn with_hardware(period_us: u32, timer: u8, prescaler: u32, divisor: u32) -> Self {
        Self {
            period_us,
            timer,
            prescaler,
            divisor,
        }
    }

    /// Check that this tick period can drive a motor with `pulse_delay_us`.
    ///
    /// The period must divide the pulse delay, then the pulse delay must
    /// span [`MIN_TICKS_PER_PULSE`] periods.
    pub fn check_pulse_delay(&self, pulse_delay_us: u32) -> Result<(), CycleError> {
        if self.period_us == 0 || pulse_delay_us % self.period_us != 0 {
            return Err(CycleError::TimerPeriodAliquantMotorPulse);
        }
        if (pulse_delay_us as u64) < MIN_TICKS_PER_PULSE * self.period_us as u64 {
            return Err(CycleError::TimerPeriodTooLong);
        }
        Ok(())
    }
}
