//! Unit test harness for stepper-cycle.
//!
//! This module organizes unit tests for each component of the library.

pub mod fakes;

mod config_parsing;
mod config_validation;
mod shared_cycle;
