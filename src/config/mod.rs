//! Configuration module for stepper-cycle.
//!
//! Provides types for loading and validating timer, motor, policy and program
//! configurations from TOML files (with `std` feature) or pre-parsed data.

mod ends;
#[cfg(feature = "std")]
mod loader;
mod motor;
mod program;
mod system;
mod timer;
mod validation;

pub use ends::{EndSide, EndStrategy, EndsConfig};
pub use motor::MotorConfig;
pub use program::{ProgramConfig, ProgramKind, MAX_TABLE_LEN};
pub use system::{motor_name, SystemConfig};
pub use timer::{TimerSettings, MIN_TICKS_PER_PULSE};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};
