//! Travel boundary configuration.

use serde::Deserialize;

use crate::hal::PinId;

/// How a side of the travel range is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum EndStrategy {
    /// Bounded by the stored `min_pos`/`max_pos` (soft end).
    Const,
    /// Unbounded; only a limit sensor can stop the motor.
    #[default]
    Inf,
}

/// One side of the travel range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EndSide {
    /// Towards smaller positions.
    Min,
    /// Towards larger positions.
    Max,
}

impl EndSide {
    /// Side reached by a position change of `delta`.
    #[inline]
    pub fn of_delta(delta: i64) -> Self {
        if delta < 0 {
            EndSide::Min
        } else {
            EndSide::Max
        }
    }
}

/// Limit sensors and soft ends of one motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EndsConfig {
    /// Limit sensor on the min side.
    #[serde(default)]
    pub min_pin: Option<PinId>,

    /// Limit sensor on the max side.
    #[serde(default)]
    pub max_pin: Option<PinId>,

    /// Min side strategy.
    #[serde(default)]
    pub min_strategy: EndStrategy,

    /// Max side strategy.
    #[serde(default)]
    pub max_strategy: EndStrategy,

    /// Soft end on the min side, used with [`EndStrategy::Const`].
    #[serde(default)]
    pub min_pos: i64,

    /// Soft end on the max side, used with [`EndStrategy::Const`].
    #[serde(default)]
    pub max_pos: i64,
}

impl EndsConfig {
    /// Create ends without sensors.
    pub const fn new(
        min_strategy: EndStrategy,
        max_strategy: EndStrategy,
        min_pos: i64,
        max_pos: i64,
    ) -> Self {
        Self {
            min_pin: None,
            max_pin: None,
            min_strategy,
            max_strategy,
            min_pos,
            max_pos,
        }
    }

    /// Both sides bounded by `[min_pos, max_pos]`.
    pub const fn bounded(min_pos: i64, max_pos: i64) -> Self {
        Self::new(EndStrategy::Const, EndStrategy::Const, min_pos, max_pos)
    }

    /// Attach limit sensors.
    pub const fn with_sensors(mut self, min_pin: Option<PinId>, max_pin: Option<PinId>) -> Self {
        self.min_pin = min_pin;
        self.max_pin = max_pin;
        self
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
            EndSide::Min => self.min_pin,
            EndSide::Max => self.max_pin,
        }
    }

    /// Check that CONST/CONST ends are ordered.
    pub fn is_valid(&self) -> bool {
        !(self.min_strategy == EndStrategy::Const
            && self.max_strategy == EndStrategy::Const
            && self.min_pos > self.max_pos)
    }

    /// Check a position against the CONST sides.
    pub fn contains(&self, position: i64) -> bool {
        let above_min = self.min_strategy == EndStrategy::Inf || position >= self.min_pos;
        let below_max = self.max_strategy == EndStrategy::Inf || position <= self.max_pos;
        above_min && below_max
    }
}
