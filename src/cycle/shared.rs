//! Engine shared between the tick context and the control context.
//!
//! Every access to the engine runs inside `critical_section::with`, which
//! masks the tick interrupt on bare metal and takes a global lock on hosted
//! targets. Status, pause flag and cycle error are mirrored into atomics
//! after each access so queries never enter the critical section.
//!
//! A `finish` issued while the engine is already borrowed on the same
//! context (from a [`SharedCycle::with`] closure, or from a delay function
//! running inside `tick`) cannot take the engine a second time. It is
//! recorded and applied as soon as the outer borrow ends.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use critical_section::Mutex;

use crate::error::{ControlError, Result};
use crate::hal::{DigitalIo, HandlerClock, TickTimer};

use super::engine::CycleEngine;
use super::status::{CycleError, CycleStatus};

/// A [`CycleEngine`] that can be placed in a `static` and driven from an
/// interrupt and the main flow at once.
pub struct SharedCycle<'a, IO, T, C, const N: usize = 8> {
    engine: Mutex<RefCell<CycleEngine<'a, IO, T, C, N>>>,
    status: AtomicU8,
    paused: AtomicBool,
    error: AtomicU8,
    finish_requested: AtomicBool,
}

impl<'a, IO, T, C, const N: usize> SharedCycle<'a, IO, T, C, N>
where
    IO: DigitalIo,
    T: TickTimer,
    C: HandlerClock,
{
    /// Wrap an engine.
    pub fn new(engine: CycleEngine<'a, IO, T, C, N>) -> Self {
        Self {
            status: AtomicU8::new(engine.cycle_status() as u8),
            paused: AtomicBool::new(engine.is_paused()),
            error: AtomicU8::new(engine.cycle_error() as u8),
            engine: Mutex::new(RefCell::new(engine)),
            finish_requested: AtomicBool::new(false),
        }
    }

    /// Run `f` with exclusive access to the engine.
    ///
    /// # Errors
    ///
    /// Returns `EngineBusy` if called while the engine is already borrowed
    /// on this context.
    pub fn with<R>(&self, f: impl FnOnce(&mut CycleEngine<'a, IO, T, C, N>) -> R) -> Result<R> {
        critical_section::with(|cs| {
            let mut engine = self
                .engine
                .borrow(cs)
                .try_borrow_mut()
                .map_err(|_| ControlError::EngineBusy)?;
            let result = f(&mut engine);
            self.settle(&mut engine);
            Ok(result)
        })
    }

    /// Tick handler entry point.
    ///
    /// A tick that finds the engine borrowed is skipped.
    pub fn tick(&self) {
        if self.with(CycleEngine::tick).is_err() {
            trace!("tick skipped, engine busy");
        }
    }

    /// See [`CycleEngine::start`].
    pub fn start(&self) -> Result<()> {
        self.with(CycleEngine::start)?
    }

    /// See [`CycleEngine::pause`].
    pub fn pause(&self) -> Result<()> {
        self.with(CycleEngine::pause)
    }

    /// See [`CycleEngine::resume`].
    pub fn resume(&self) -> Result<()> {
        self.with(CycleEngine::resume)
    }

    /// See [`CycleEngine::finish`].
    ///
    /// Never fails: if the engine is borrowed on this context the request is
    /// deferred until that borrow ends.
    pub fn finish(&self) {
        self.finish_requested.store(true, Ordering::Release);
        // Busy means the outer borrow will apply the request on release.
        let _ = self.with(|_| ());
    }

    /// Whether the cycle is RUNNING (paused or not).
    #[inline]
    pub fn is_running(&self) -> bool {
        self.cycle_status() == CycleStatus::Running
    }

    /// Whether the cycle is paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Global cycle status.
    #[inline]
    pub fn cycle_status(&self) -> CycleStatus {
        CycleStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Global cycle error.
    #[inline]
    pub fn cycle_error(&self) -> CycleError {
        CycleError::from_u8(self.error.load(Ordering::Acquire))
    }

    /// Unwrap the engine.
    pub fn into_inner(self) -> CycleEngine<'a, IO, T, C, N> {
        self.engine.into_inner().into_inner()
    }

    fn settle(&self, engine: &mut CycleEngine<'a, IO, T, C, N>) {
        // Load/store pair: we are inside the critical section.
        if self.finish_requested.load(Ordering::Acquire) {
            self.finish_requested.store(false, Ordering::Release);
            engine.finish();
        }
        self.paused.store(engine.is_paused(), Ordering::Release);
        self.error.store(engine.cycle_error() as u8, Ordering::Release);
        self.status.store(engine.cycle_status() as u8, Ordering::Release);
    }
}
