//! Error policy: what the cycle engine does when a run-time condition fires.
//!
//! Each [`Condition`] has a restricted set of [`ErrorAction`]s. Updates are
//! validated as a whole: one disallowed slot rejects the entire update and
//! the current policy stays as it was.

use serde::Deserialize;

use crate::error::{PolicyError, Result};

/// Reaction to an exceptional condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum ErrorAction {
    /// Keep the current value (only meaningful in a [`PolicyUpdate`]).
    #[default]
    DontChange,
    /// Ignore the condition and continue.
    Ignore,
    /// Correct the offending value and continue.
    Fix,
    /// Stop the affected motor, keep the others running.
    StopMotor,
    /// Stop every motor and end the cycle with an error.
    CancelCycle,
}

/// Condition kinds handled by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Condition {
    /// A limit sensor fired on the side the motor is moving to.
    HardEnd,
    /// The next step would leave the configured `[min_pos, max_pos]` range.
    SoftEnd,
    /// A program asked for a delay shorter than the motor's pulse delay.
    SmallPulseDelay,
    /// The tick handler ran longer than one tick period.
    CycleTimingExceeded,
}

impl Condition {
    /// Actions this condition may be configured with.
    pub const fn allowed(self) -> &'static [ErrorAction] {
        match self {
            Condition::HardEnd | Condition::SoftEnd => {
                &[ErrorAction::StopMotor, ErrorAction::CancelCycle]
            }
            Condition::SmallPulseDelay => &[
                ErrorAction::Fix,
                ErrorAction::StopMotor,
                ErrorAction::CancelCycle,
            ],
            Condition::CycleTimingExceeded => &[ErrorAction::Ignore, ErrorAction::CancelCycle],
        }
    }

    /// Check whether `action` may be stored for this condition.
    pub fn allows(self, action: ErrorAction) -> bool {
        self.allowed().contains(&action)
    }
}

/// Requested change to an [`ErrorPolicy`], one action per condition.
///
/// Fields left at [`ErrorAction::DontChange`] keep the current action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct PolicyUpdate {
    /// Hard end (limit sensor) reaction.
    #[serde(default)]
    pub hard_end: ErrorAction,
    /// Soft end (`min_pos`/`max_pos`) reaction.
    #[serde(default)]
    pub soft_end: ErrorAction,
    /// Too-small pulse delay reaction.
    #[serde(default)]
    pub small_pulse_delay: ErrorAction,
    /// Tick handler overrun reaction.
    #[serde(default)]
    pub cycle_timing_exceeded: ErrorAction,
}

impl PolicyUpdate {
    /// Build an update from the four actions.
    pub const fn new(
        hard_end: ErrorAction,
        soft_end: ErrorAction,
        small_pulse_delay: ErrorAction,
        cycle_timing_exceeded: ErrorAction,
    ) -> Self {
        Self {
            hard_end,
            soft_end,
            small_pulse_delay,
            cycle_timing_exceeded,
        }
    }

    /// Validate every slot without applying anything.
    pub fn validate(&self) -> Result<()> {
        for (condition, action) in self.slots() {
            if action != ErrorAction::DontChange && !condition.allows(action) {
                return Err(PolicyError::Disallowed { condition, action }.into());
            }
        }
        Ok(())
    }

    fn slots(&self) -> [(Condition, ErrorAction); 4] {
        [
            (Condition::HardEnd, self.hard_end),
            (Condition::SoftEnd, self.soft_end),
            (Condition::SmallPulseDelay, self.small_pulse_delay),
            (Condition::CycleTimingExceeded, self.cycle_timing_exceeded),
        ]
    }
}

/// Per-condition action table used by the cycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorPolicy {
    hard_end: ErrorAction,
    soft_end: ErrorAction,
    small_pulse_delay: ErrorAction,
    cycle_timing_exceeded: ErrorAction,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            hard_end: ErrorAction::CancelCycle,
            soft_end: ErrorAction::CancelCycle,
            small_pulse_delay: ErrorAction::CancelCycle,
            cycle_timing_exceeded: ErrorAction::CancelCycle,
        }
    }
}

impl ErrorPolicy {
    /// Apply an update.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::Disallowed` for the first slot holding an action
    /// outside its condition's allowed set; the policy is left unchanged.
    pub fn apply(&mut self, update: PolicyUpdate) -> Result<()> {
        update.validate()?;

        let keep = |current: ErrorAction, requested: ErrorAction| {
            if requested == ErrorAction::DontChange {
                current
            } else {
                requested
            }
        };
        self.hard_end = keep(self.hard_end, update.hard_end);
        self.soft_end = keep(self.soft_end, update.soft_end);
        self.small_pulse_delay = keep(self.small_pulse_delay, update.small_pulse_delay);
        self.cycle_timing_exceeded = keep(self.cycle_timing_exceeded, update.cycle_timing_exceeded);
        Ok(())
    }

    /// Action stored for a condition.
    #[inline]
    pub fn action(&self, condition: Condition) -> ErrorAction {
        match condition {
            Condition::HardEnd => self.hard_end,
            Condition::SoftEnd => self.soft_end,
            Condition::SmallPulseDelay => self.small_pulse_delay,
            Condition::CycleTimingExceeded => self.cycle_timing_exceeded,
        }
    }
}
