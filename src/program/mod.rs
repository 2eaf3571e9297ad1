//! Step programs: where each hardware step's direction and delay come from.
//!
//! A program is attached to one motor for one run by the engine's
//! `prepare_*` calls and yields [`StepTiming`]s until it is exhausted.

mod steps;

use serde::Deserialize;

pub use steps::{SegmentRepeats, StepProgram};

/// Direction of motion along the motor's virtual coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards larger coordinate values (for a positive distance per step).
    Forward,
    /// Towards smaller coordinate values (for a positive distance per step).
    Backward,
}

impl Direction {
    /// Get direction from a signed count.
    #[inline]
    pub fn from_sign(value: i64) -> Self {
        if value >= 0 {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Calibration behaviour applied after every issued step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum CalibrateMode {
    /// Enforce soft ends.
    #[default]
    None,
    /// Soft ends are not enforced; `min_pos` follows `current_pos`.
    CalibrateStartMinPos,
    /// Soft ends are not enforced; `max_pos` follows `current_pos`.
    CalibrateBoundsMaxPos,
}

/// Direction and delay of the next hardware step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepTiming {
    /// Direction of the step.
    pub dir: Direction,
    /// Delay before the step in microseconds, `0` for the motor's fastest rate.
    pub delay_us: u32,
}

/// Delay source of dynamic programs: hardware step index to delay in microseconds.
///
/// Called from the tick handler, once per step, so it must not block. The
/// caller owns any context it captures.
pub type DelayFn = dyn Fn(u32) -> u32 + Sync;
