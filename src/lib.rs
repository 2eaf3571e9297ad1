//! # stepper-cycle
//!
//! Timer-tick driven step-dir stepper motor cycles with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **One tick, many motors**: every motor is advanced from a single periodic timer
//! - **Step programs**: fixed count, endless whirl, buffered delay tables, computed delays
//! - **Travel limits**: limit sensors and soft ends, with calibration modes
//! - **Error policy**: per-condition reactions (fix, stop the motor, cancel the cycle)
//! - **no_std compatible**: fixed-capacity storage, no allocation on the tick path
//! - **Configuration-driven**: define the timer, motors and programs in TOML files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_cycle::{CalibrateMode, CycleEngine, MotorDescriptorBuilder, TimerSettings};
//!
//! let mut engine: CycleEngine<_, _, _> =
//!     CycleEngine::new(pins, timer, clock, TimerSettings::new(200))?;
//!
//! let x = engine.add_motor(
//!     MotorDescriptorBuilder::new('x')
//!         .step_pin(2)
//!         .dir_pin(3)
//!         .pulse_delay_us(1000)
//!         .build()?,
//! )?;
//!
//! engine.prepare_steps(x, 400, 1000, CalibrateMode::None, None)?;
//! engine.start()?;
//!
//! // From the timer interrupt:
//! engine.tick();
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and `StdClock`
//! - `alloc`: Enables serde's alloc support for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets
//! - `tracing`: Enables tracing logging for hosted targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Must come first: the logging macros are used by every other module.
#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod cycle;
pub mod error;
pub mod hal;
pub mod motor;
pub mod policy;
pub mod program;

// Re-exports for ergonomic API
pub use config::{
    validate_config, EndStrategy, EndsConfig, MotorConfig, SystemConfig, TimerSettings,
};
pub use cycle::{CycleEngine, CycleError, CycleStatus, MotorId, SharedCycle, TickStats};
pub use error::{Error, Result};
pub use hal::{DigitalIo, HandlerClock, PinBank, PinId, TickTimer};
pub use motor::{
    MotorDescriptor, MotorDescriptorBuilder, MotorFaults, RunInfo, SharedRunInfo, StepperStatus,
};
pub use policy::{Condition, ErrorAction, ErrorPolicy, PolicyUpdate};
pub use program::{CalibrateMode, DelayFn, Direction, StepProgram};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

#[cfg(feature = "std")]
pub use hal::StdClock;
