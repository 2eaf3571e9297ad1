//! Named step programs from TOML.

use heapless::{String, Vec};
use serde::Deserialize;

use crate::error::{ConfigError, Error, Result};
use crate::program::{CalibrateMode, Direction, StepProgram};

/// Maximum entries of a configured delay table.
pub const MAX_TABLE_LEN: usize = 64;

/// Program variant of a configured program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum ProgramKind {
    /// Fixed number of steps at a constant delay (`count`, `delay_us`).
    Steps,
    /// Endless rotation at a constant delay (`dir`, `delay_us`).
    Whirl,
    /// Delay table with one shared repeat factor (`delays_us`, `scale`).
    SimpleBuffered,
    /// Delay table with per-entry repeat counts (`delays_us`, `repeats`).
    Buffered,
}

/// A named program from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramConfig {
    /// Target motor name (must match a motor in config).
    pub motor: String<8>,

    /// Program variant.
    pub kind: ProgramKind,

    /// Signed step count for `steps`.
    #[serde(default)]
    pub count: Option<i64>,

    /// Direction for `whirl`.
    #[serde(default)]
    pub dir: Option<Direction>,

    /// Constant delay for `steps` and `whirl`; 0 runs at the pulse delay.
    #[serde(default)]
    pub delay_us: u32,

    /// Calibration mode for `steps` and `whirl`.
    #[serde(default)]
    pub calibrate: CalibrateMode,

    /// Delay table for the buffered kinds.
    #[serde(default)]
    pub delays_us: Vec<u32, MAX_TABLE_LEN>,

    /// Repeat table for `buffered`.
    #[serde(default)]
    pub repeats: Vec<i32, MAX_TABLE_LEN>,

    /// Shared repeat factor for `simple_buffered`.
    #[serde(default)]
    pub scale: Option<i32>,
}

impl ProgramConfig {
    /// Check that the fields required by `kind` are present and well formed.
    pub fn validate(&self, name: &str) -> Result<()> {
        self.to_program(name).map(|_| ())
    }

    /// Build the step program described by this entry.
    ///
    /// # Errors
    ///
    /// Returns an error if a field required by `kind` is missing or the
    /// tables are malformed.
    pub fn to_program(&self, name: &str) -> Result<StepProgram<'_>> {
        let missing = |field: &'static str| {
            Error::Config(ConfigError::MissingProgramField {
                program: String::try_from(name).unwrap_or_default(),
                field,
            })
        };

        match self.kind {
            ProgramKind::Steps => {
                let count = self.count.ok_or_else(|| missing("count"))?;
                Ok(StepProgram::fixed(count, self.delay_us))
            }
            ProgramKind::Whirl => {
                let dir = self.dir.ok_or_else(|| missing("dir"))?;
                Ok(StepProgram::whirl(dir, self.delay_us))
            }
            ProgramKind::SimpleBuffered => {
                let scale = self.scale.ok_or_else(|| missing("scale"))?;
                StepProgram::simple_buffered(&self.delays_us, scale)
            }
            ProgramKind::Buffered => StepProgram::buffered(&self.delays_us, &self.repeats),
        }
    }

    /// Calibration mode the program runs with.
    ///
    /// Only `steps` and `whirl` programs calibrate.
    pub fn calibrate_mode(&self) -> CalibrateMode {
        match self.kind {
            ProgramKind::Steps | ProgramKind::Whirl => self.calibrate,
            ProgramKind::SimpleBuffered | ProgramKind::Buffered => CalibrateMode::None,
        }
    }
}
