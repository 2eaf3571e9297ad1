//! Per-motor run status and fault flags.
//!
//! [`RunInfo`] is the engine's own copy. [`SharedRunInfo`] is the optional
//! caller-owned handle the engine mirrors every change into, so a control
//! context can poll a motor without locking the engine.

use core::sync::atomic::{AtomicU8, Ordering};

use bitflags::bitflags;

use crate::config::EndSide;

/// Run status of one motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StepperStatus {
    /// Not part of a run yet.
    #[default]
    Idle = 0,
    /// Stepping.
    Running = 1,
    /// Done, either normally or by a fault (see [`MotorFaults`]).
    Finished = 2,
}

impl StepperStatus {
    /// Decode a stored status byte.
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => StepperStatus::Running,
            2 => StepperStatus::Finished,
            _ => StepperStatus::Idle,
        }
    }
}

bitflags! {
    /// Sticky fault flags of one run; cleared only when the next run starts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MotorFaults: u8 {
        /// Next step would have crossed `min_pos`.
        const SOFT_END_MIN      = 0x01;
        /// Next step would have crossed `max_pos`.
        const SOFT_END_MAX      = 0x02;
        /// Min-side limit sensor triggered.
        const HARD_END_MIN      = 0x04;
        /// Max-side limit sensor triggered.
        const HARD_END_MAX      = 0x08;
        /// Program delay below the motor's pulse delay.
        const PULSE_DELAY_SMALL = 0x10;
    }
}

impl MotorFaults {
    /// Soft end flag of a side.
    #[inline]
    pub const fn soft_end(side: EndSide) -> Self {
        match side {
            EndSide::Min => Self::SOFT_END_MIN,
            EndSide::Max => Self::SOFT_END_MAX,
        }
    }

    /// Hard end flag of a side.
    #[inline]
    pub const fn hard_end(side: EndSide) -> Self {
        match side {
            EndSide::Min => Self::HARD_END_MIN,
            EndSide::Max => Self::HARD_END_MAX,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MotorFaults {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "MotorFaults({=u8:#x})", self.bits())
    }
}

/// Status and faults of one motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunInfo {
    /// Run status.
    pub status: StepperStatus,
    /// Faults recorded during the run.
    pub faults: MotorFaults,
}

impl RunInfo {
    /// Whether the motor finished without faults.
    pub fn finished_cleanly(&self) -> bool {
        self.status == StepperStatus::Finished && self.faults.is_empty()
    }
}

/// Caller-owned run info updated in place by the engine.
///
/// Usually placed in a `static`:
///
/// ```rust
/// use stepper_cycle::motor::{SharedRunInfo, StepperStatus};
///
/// static X_INFO: SharedRunInfo = SharedRunInfo::new();
/// assert_eq!(X_INFO.status(), StepperStatus::Idle);
/// ```
#[derive(Debug, Default)]
pub struct SharedRunInfo {
    status: AtomicU8,
    faults: AtomicU8,
}

impl SharedRunInfo {
    /// Idle, no faults.
    pub const fn new() -> Self {
        Self {
            status: AtomicU8::new(StepperStatus::Idle as u8),
            faults: AtomicU8::new(0),
        }
    }

    /// Current status.
    #[inline]
    pub fn status(&self) -> StepperStatus {
        StepperStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Current fault flags.
    #[inline]
    pub fn faults(&self) -> MotorFaults {
        MotorFaults::from_bits_truncate(self.faults.load(Ordering::Acquire))
    }

    /// Both fields.
    pub fn snapshot(&self) -> RunInfo {
        RunInfo {
            faults: self.faults(),
            status: self.status(),
        }
    }

    // Faults first: a reader that sees FINISHED also sees the flags.
    pub(crate) fn store(&self, info: RunInfo) {
        self.faults.store(info.faults.bits(), Ordering::Release);
        self.status.store(info.status as u8, Ordering::Release);
    }
}
