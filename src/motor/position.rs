//! Position tracking for stepper motors.
//!
//! Positions are signed integers in base length units. `min` and `max` are
//! the soft ends; they are only enforced on sides with a CONST strategy.

use crate::config::EndSide;
use crate::program::CalibrateMode;

/// Motor position and soft ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    /// Current position.
    pub current: i64,
    /// Soft end on the min side.
    pub min: i64,
    /// Soft end on the max side.
    pub max: i64,
}

impl Position {
    /// Create a position tracker.
    #[inline]
    pub const fn new(current: i64, min: i64, max: i64) -> Self {
        Self { current, min, max }
    }

    /// Position after moving by `delta`.
    #[inline]
    pub fn target(&self, delta: i64) -> i64 {
        self.current.saturating_add(delta)
    }

    /// Whether `target` lies beyond the soft end of `side`.
    #[inline]
    pub fn crosses(&self, target: i64, side: EndSide) -> bool {
        match side {
            EndSide::Min => target < self.min,
            EndSide::Max => target > self.max,
        }
    }

    /// Apply one issued step and the calibration side effect.
    #[inline]
    pub fn advance(&mut self, delta: i64, mode: CalibrateMode) {
        self.current = self.target(delta);
        match mode {
            CalibrateMode::None => {}
            CalibrateMode::CalibrateStartMinPos => self.min = self.current,
            CalibrateMode::CalibrateBoundsMaxPos => self.max = self.current,
        }
    }
}
