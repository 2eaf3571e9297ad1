//! Cycle engine and its control surface.
//!
//! [`CycleEngine`] owns the motors and runs the tick algorithm. Wrap it in a
//! [`SharedCycle`] when the tick handler and the control flow run on
//! different contexts.

mod engine;
mod shared;
mod slot;
mod status;

pub use engine::CycleEngine;
pub use shared::SharedCycle;
pub use slot::MotorId;
pub use status::{CycleError, CycleStatus, TickStats};
