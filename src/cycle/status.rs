//! Cycle-level status, error code and handler timing statistics.

/// Global cycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CycleStatus {
    /// No cycle started, or finished by `finish`.
    #[default]
    Idle = 0,
    /// Ticking; may be paused.
    Running = 1,
    /// Every motor finished; the timer has been stopped.
    Finished = 2,
}

impl CycleStatus {
    /// Decode a stored status byte.
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => CycleStatus::Running,
            2 => CycleStatus::Finished,
            _ => CycleStatus::Idle,
        }
    }
}

/// Global cycle error code, readable until the next start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CycleError {
    /// No error.
    #[default]
    None = 0,
    /// A motor's pulse delay is shorter than 3 tick periods.
    TimerPeriodTooLong = 1,
    /// The tick period does not divide a motor's pulse delay.
    TimerPeriodAliquantMotorPulse = 2,
    /// A motor fault escalated through CANCEL_CYCLE.
    MotorError = 3,
    /// The tick handler overran its period under CANCEL_CYCLE.
    HandlerTimingExceeded = 4,
}

impl CycleError {
    /// Decode a stored error byte.
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => CycleError::TimerPeriodTooLong,
            2 => CycleError::TimerPeriodAliquantMotorPulse,
            3 => CycleError::MotorError,
            4 => CycleError::HandlerTimingExceeded,
            _ => CycleError::None,
        }
    }

    /// Whether an error is recorded.
    #[inline]
    pub fn is_err(self) -> bool {
        self != CycleError::None
    }
}

/// Tick handler timing statistics for the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickStats {
    /// Ticks handled while running and not paused.
    pub ticks: u64,
    /// Ticks whose handler ran longer than the tick period.
    pub overruns: u64,
    /// Longest observed handler duration.
    pub max_handler_us: u64,
}

impl TickStats {
    pub(crate) fn record(&mut self, elapsed_us: u64, period_us: u32) -> bool {
        self.ticks += 1;
        self.max_handler_us = self.max_handler_us.max(elapsed_us);
        let overrun = elapsed_us > period_us as u64;
        if overrun {
            self.overruns += 1;
        }
        overrun
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_round_trip() {
        for error in [
            CycleError::None,
            CycleError::TimerPeriodTooLong,
            CycleError::TimerPeriodAliquantMotorPulse,
            CycleError::MotorError,
            CycleError::HandlerTimingExceeded,
        ] {
            assert_eq!(CycleError::from_u8(error as u8), error);
        }
    }

    #[test]
    fn test_stats_record() {
        let mut stats = TickStats::default();
        assert!(!stats.record(80, 100));
        assert!(!stats.record(100, 100));
        assert!(stats.record(140, 100));
        assert_eq!(stats, TickStats { ticks: 3, overruns: 1, max_handler_us: 140 });
    }
}
