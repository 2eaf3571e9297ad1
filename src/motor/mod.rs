//! Motor module for stepper-cycle.
//!
//! Provides the motor descriptor, its position tracking and run status.

mod builder;
mod descriptor;
mod position;
pub mod state;

pub use builder::MotorDescriptorBuilder;
pub use descriptor::{MotorDescriptor, MotorPins};
pub use position::Position;
pub use state::{MotorFaults, RunInfo, SharedRunInfo, StepperStatus};
