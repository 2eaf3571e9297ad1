//! Error types for stepper-cycle.
//!
//! Only configuration-time failures are reported as [`Error`]. Faults that
//! happen while a cycle runs are recorded in the motor run info and the cycle
//! error code instead (see [`crate::cycle::CycleError`]).

use core::fmt;

use crate::cycle::CycleError;
use crate::policy::{Condition, ErrorAction};

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-cycle operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motor descriptor or motor registry error
    Motor(MotorError),
    /// Step program validation error
    Program(ProgramError),
    /// Error policy validation error
    Policy(PolicyError),
    /// Cycle control error
    Control(ControlError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Motor key is not exactly one character
    InvalidMotorName(heapless::String<8>),
    /// Motor name not found in configuration
    MotorNotFound(heapless::String<8>),
    /// Program name not found in configuration
    ProgramNotFound(heapless::String<32>),
    /// Program is missing a field required by its kind
    MissingProgramField {
        /// Program name
        program: heapless::String<32>,
        /// Name of the missing field
        field: &'static str,
    },
    /// Tick period must be > 0
    InvalidTickPeriod(u32),
    /// Tick period cannot drive one of the motors
    TimerMismatch {
        /// Motor name
        motor: char,
        /// Cycle error `start` would report
        error: CycleError,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motor descriptor and registry errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotorError {
    /// No motor registered under this slot
    UnknownMotor(usize),
    /// Motor arena is full
    CapacityExceeded(usize),
    /// Another motor already uses this name
    DuplicateName(char),
    /// A required pin was not supplied to the builder
    MissingPin(&'static str),
    /// Minimum pulse delay must be > 0
    InvalidPulseDelay(char),
    /// Distance per step must be non-zero
    InvalidDistancePerStep(char),
    /// CONST/CONST ends with min above max
    InvalidEnds {
        /// Motor name
        motor: char,
        /// Configured minimum position
        min: i64,
        /// Configured maximum position
        max: i64,
    },
    /// Current position lies outside CONST ends
    PositionOutOfBounds {
        /// Motor name
        motor: char,
        /// Offending position
        position: i64,
    },
}

/// Step program validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgramError {
    /// Delay table has no entries
    EmptyTable,
    /// Delay and repeat tables differ in length
    LengthMismatch {
        /// Delay table length
        delays: usize,
        /// Repeat table length
        repeats: usize,
    },
    /// Uniform repeat factor of zero would issue no steps
    ZeroScale,
}

/// Error policy validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyError {
    /// Action is not in the allowed set of the condition
    Disallowed {
        /// Condition kind being configured
        condition: Condition,
        /// Rejected action
        action: ErrorAction,
    },
}

/// Cycle control errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlError {
    /// Cycle is already running
    AlreadyRunning,
    /// A motor's minimum pulse delay does not span 3 tick periods
    TimerPeriodTooLong {
        /// Motor name
        motor: char,
        /// Motor minimum pulse delay
        pulse_delay_us: u32,
        /// Tick period
        period_us: u32,
    },
    /// Tick period does not divide a motor's minimum pulse delay
    TimerPeriodAliquant {
        /// Motor name
        motor: char,
        /// Motor minimum pulse delay
        pulse_delay_us: u32,
        /// Tick period
        period_us: u32,
    },
    /// Engine is borrowed by the current execution context
    EngineBusy,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Program(e) => write!(f, "Program error: {}", e),
            Error::Policy(e) => write!(f, "Policy error: {}", e),
            Error::Control(e) => write!(f, "Cycle control error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMotorName(name) => {
                write!(f, "Invalid motor name '{}': must be a single character", name)
            }
            ConfigError::MotorNotFound(name) => write!(f, "Motor '{}' not found", name),
            ConfigError::ProgramNotFound(name) => write!(f, "Program '{}' not found", name),
            ConfigError::MissingProgramField { program, field } => {
                write!(f, "Program '{}' requires field '{}'", program, field)
            }
            ConfigError::InvalidTickPeriod(v) => {
                write!(f, "Invalid tick period: {}us. Must be > 0", v)
            }
            ConfigError::TimerMismatch { motor, error } => {
                write!(f, "Tick period cannot drive motor '{}': {:?}", motor, error)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::UnknownMotor(id) => write!(f, "No motor in slot {}", id),
            MotorError::CapacityExceeded(cap) => write!(f, "Motor capacity ({}) exceeded", cap),
            MotorError::DuplicateName(name) => write!(f, "Duplicate motor name: '{}'", name),
            MotorError::MissingPin(pin) => write!(f, "{} is required", pin),
            MotorError::InvalidPulseDelay(name) => {
                write!(f, "Motor '{}': pulse delay must be > 0", name)
            }
            MotorError::InvalidDistancePerStep(name) => {
                write!(f, "Motor '{}': distance per step must be non-zero", name)
            }
            MotorError::InvalidEnds { motor, min, max } => {
                write!(f, "Motor '{}': min_pos ({}) must be <= max_pos ({})", motor, min, max)
            }
            MotorError::PositionOutOfBounds { motor, position } => {
                write!(f, "Motor '{}': position {} lies outside its ends", motor, position)
            }
        }
    }
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramError::EmptyTable => write!(f, "Delay table is empty"),
            ProgramError::LengthMismatch { delays, repeats } => write!(
                f,
                "Delay table has {} entries but repeat table has {}",
                delays, repeats
            ),
            ProgramError::ZeroScale => write!(f, "Step scale must be non-zero"),
        }
    }
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::Disallowed { condition, action } => {
                write!(f, "Action {:?} is not allowed for {:?}", action, condition)
            }
        }
    }
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::AlreadyRunning => write!(f, "Cycle is already running"),
            ControlError::TimerPeriodTooLong {
                motor,
                pulse_delay_us,
                period_us,
            } => write!(
                f,
                "Motor '{}': pulse delay {}us does not fit 3 tick periods of {}us",
                motor, pulse_delay_us, period_us
            ),
            ControlError::TimerPeriodAliquant {
                motor,
                pulse_delay_us,
                period_us,
            } => write!(
                f,
                "Motor '{}': pulse delay {}us is not a multiple of the {}us tick",
                motor, pulse_delay_us, period_us
            ),
            ControlError::EngineBusy => write!(f, "Cycle engine is in use by this context"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<ProgramError> for Error {
    fn from(e: ProgramError) -> Self {
        Error::Program(e)
    }
}

impl From<PolicyError> for Error {
    fn from(e: PolicyError) -> Self {
        Error::Policy(e)
    }
}

impl From<ControlError> for Error {
    fn from(e: ControlError) -> Self {
        Error::Control(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for ProgramError {}

#[cfg(feature = "std")]
impl std::error::Error for PolicyError {}

#[cfg(feature = "std")]
impl std::error::Error for ControlError {}
