//! The cycle engine: motor arena, control surface and the tick algorithm.

use heapless::Vec;

use crate::config::{motor_name, validate_config, SystemConfig, TimerSettings};
use crate::error::{ConfigError, ControlError, MotorError, Result};
use crate::hal::{DigitalIo, HandlerClock, TickTimer};
use crate::motor::{MotorDescriptor, MotorFaults, RunInfo, SharedRunInfo};
use crate::policy::{Condition, ErrorAction, ErrorPolicy, PolicyUpdate};
use crate::program::{CalibrateMode, DelayFn, Direction, StepProgram};

use super::slot::{MotorId, MotorSlot, Outcome};
use super::status::{CycleError, CycleStatus, TickStats};

#[derive(Debug, Default)]
struct CycleState {
    status: CycleStatus,
    paused: bool,
    error: CycleError,
}

/// Drives up to `N` step-dir motors from one periodic tick.
///
/// Motors are registered once with [`add_motor`](Self::add_motor) and keep
/// their slot for the engine's lifetime. A run is set up with the `prepare_*`
/// calls, started with [`start`](Self::start) and advanced by calling
/// [`tick`](Self::tick) once per timer period.
///
/// Borrowed step tables, delay functions and run-info handles must outlive
/// the engine (`'a`).
///
/// # Example
///
/// ```rust,ignore
/// let mut engine: CycleEngine<_, _, _> =
///     CycleEngine::new(io, timer, clock, TimerSettings::new(200))?;
/// let x = engine.add_motor(motor)?;
/// engine.prepare_steps(x, 5, 1000, CalibrateMode::None, None)?;
/// engine.start()?;
/// ```
#[derive(Debug)]
pub struct CycleEngine<'a, IO, T, C, const N: usize = 8> {
    io: IO,
    timer: T,
    clock: C,
    settings: TimerSettings,
    policy: ErrorPolicy,
    slots: Vec<MotorSlot<'a>, N>,
    state: CycleState,
    stats: TickStats,
}

impl<'a, IO, T, C, const N: usize> CycleEngine<'a, IO, T, C, N>
where
    IO: DigitalIo,
    T: TickTimer,
    C: HandlerClock,
{
    /// Create an engine with no motors and the default error policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the tick period is zero.
    pub fn new(io: IO, mut timer: T, clock: C, settings: TimerSettings) -> Result<Self> {
        if settings.period_us == 0 {
            return Err(ConfigError::InvalidTickPeriod(0).into());
        }
        timer.configure(&settings);

        Ok(Self {
            io,
            timer,
            clock,
            settings,
            policy: ErrorPolicy::default(),
            slots: Vec::new(),
            state: CycleState::default(),
            stats: TickStats::default(),
        })
    }

    /// Create an engine from a configuration: timer, error policy and every
    /// motor, registered in configuration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or holds more than
    /// `N` motors.
    pub fn from_config(io: IO, timer: T, clock: C, config: &SystemConfig) -> Result<Self> {
        validate_config(config)?;

        let mut engine = Self::new(io, timer, clock, config.timer)?;
        engine.policy.apply(config.error_policy)?;

        for (key, motor) in config.motors.iter() {
            let name = motor_name(key.as_str())
                .ok_or_else(|| ConfigError::InvalidMotorName(key.clone()))?;
            engine.add_motor(MotorDescriptor::from_config(name, motor)?)?;
        }

        info!(
            "engine configured: {} motors, tick {}us",
            engine.slots.len(),
            engine.settings.period_us
        );
        Ok(engine)
    }

    // ------------------------------------------------------------------
    // Motor registry
    // ------------------------------------------------------------------

    /// Register a motor.
    ///
    /// # Errors
    ///
    /// Returns an error while a cycle is running, if another motor has the
    /// same name, or if the arena is full.
    pub fn add_motor(&mut self, motor: MotorDescriptor) -> Result<MotorId> {
        self.ensure_not_running()?;
        if self.find_motor(motor.name()).is_some() {
            return Err(MotorError::DuplicateName(motor.name()).into());
        }

        let id = MotorId(self.slots.len());
        self.slots
            .push(MotorSlot::new(motor))
            .map_err(|_| MotorError::CapacityExceeded(N))?;
        debug!("motor registered in slot {}", id.0);
        Ok(id)
    }

    /// Look up a motor by name.
    pub fn find_motor(&self, name: char) -> Option<MotorId> {
        self.slots
            .iter()
            .position(|slot| slot.motor.name() == name)
            .map(MotorId)
    }

    /// Registered motor handles, in tick order.
    pub fn motor_ids(&self) -> impl Iterator<Item = MotorId> {
        (0..self.slots.len()).map(MotorId)
    }

    /// Number of registered motors.
    #[inline]
    pub fn motor_count(&self) -> usize {
        self.slots.len()
    }

    /// A motor's descriptor, including its current position.
    pub fn motor(&self, id: MotorId) -> Result<&MotorDescriptor> {
        self.slot(id).map(|slot| &slot.motor)
    }

    /// Mutable access to a motor's descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error while a cycle is running.
    pub fn motor_mut(&mut self, id: MotorId) -> Result<&mut MotorDescriptor> {
        self.ensure_not_running()?;
        self.slot_mut(id).map(|slot| &mut slot.motor)
    }

    /// A motor's status and fault flags.
    pub fn run_info(&self, id: MotorId) -> Result<RunInfo> {
        self.slot(id).map(MotorSlot::info)
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Replace the timer settings.
    ///
    /// # Errors
    ///
    /// Returns an error while a cycle is running or if the period is zero.
    pub fn configure_timer(&mut self, settings: TimerSettings) -> Result<()> {
        self.ensure_not_running()?;
        if settings.period_us == 0 {
            return Err(ConfigError::InvalidTickPeriod(0).into());
        }
        self.timer.configure(&settings);
        self.settings = settings;
        Ok(())
    }

    /// Current timer settings.
    #[inline]
    pub fn timer_settings(&self) -> &TimerSettings {
        &self.settings
    }

    /// Change the error policy; `DontChange` slots keep their action.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the policy unchanged, if any slot holds an
    /// action its condition does not allow.
    pub fn set_error_policy(&mut self, update: PolicyUpdate) -> Result<()> {
        self.policy.apply(update)?;
        debug!(
            "error policy: hard {:?}, soft {:?}, delay {:?}, timing {:?}",
            self.policy.action(Condition::HardEnd),
            self.policy.action(Condition::SoftEnd),
            self.policy.action(Condition::SmallPulseDelay),
            self.policy.action(Condition::CycleTimingExceeded)
        );
        Ok(())
    }

    /// Current error policy.
    #[inline]
    pub fn error_policy(&self) -> &ErrorPolicy {
        &self.policy
    }

    // ------------------------------------------------------------------
    // Program attachment
    // ------------------------------------------------------------------

    /// Run `count` steps (sign = direction) with `delay_us` before each.
    pub fn prepare_steps(
        &mut self,
        id: MotorId,
        count: i64,
        delay_us: u32,
        calibrate: CalibrateMode,
        run_info: Option<&'a SharedRunInfo>,
    ) -> Result<()> {
        self.attach(id, StepProgram::fixed(count, delay_us), calibrate, run_info)
    }

    /// Rotate in `dir` until the cycle is finished.
    pub fn prepare_whirl(
        &mut self,
        id: MotorId,
        dir: Direction,
        delay_us: u32,
        calibrate: CalibrateMode,
        run_info: Option<&'a SharedRunInfo>,
    ) -> Result<()> {
        self.attach(id, StepProgram::whirl(dir, delay_us), calibrate, run_info)
    }

    /// Run every entry of `delays` for `|scale|` steps in the direction of
    /// the sign of `scale`.
    pub fn prepare_simple_buffered_steps(
        &mut self,
        id: MotorId,
        delays: &'a [u32],
        scale: i32,
        run_info: Option<&'a SharedRunInfo>,
    ) -> Result<()> {
        let program = StepProgram::simple_buffered(delays, scale)?;
        self.attach(id, program, CalibrateMode::None, run_info)
    }

    /// Run `|repeats[i]|` steps at `delays[i]` for every entry.
    pub fn prepare_buffered_steps(
        &mut self,
        id: MotorId,
        delays: &'a [u32],
        repeats: &'a [i32],
        run_info: Option<&'a SharedRunInfo>,
    ) -> Result<()> {
        let program = StepProgram::buffered(delays, repeats)?;
        self.attach(id, program, CalibrateMode::None, run_info)
    }

    /// Run `count` steps with the delay of step `i` given by `delay_fn(i)`.
    pub fn prepare_dynamic_steps(
        &mut self,
        id: MotorId,
        count: i64,
        delay_fn: &'a DelayFn,
        run_info: Option<&'a SharedRunInfo>,
    ) -> Result<()> {
        let program = StepProgram::dynamic(count, delay_fn);
        self.attach(id, program, CalibrateMode::None, run_info)
    }

    /// Rotate in `dir` until the cycle is finished, with the delay of step
    /// `i` given by `delay_fn(i)`.
    pub fn prepare_dynamic_whirl(
        &mut self,
        id: MotorId,
        dir: Direction,
        delay_fn: &'a DelayFn,
        run_info: Option<&'a SharedRunInfo>,
    ) -> Result<()> {
        let program = StepProgram::dynamic_whirl(dir, delay_fn);
        self.attach(id, program, CalibrateMode::None, run_info)
    }

    /// Attach the program named `program` from `config` to its motor.
    ///
    /// # Errors
    ///
    /// Returns an error if the program or its motor is unknown, the entry is
    /// malformed, or a cycle is running.
    pub fn prepare_config(
        &mut self,
        config: &'a SystemConfig,
        program: &str,
        run_info: Option<&'a SharedRunInfo>,
    ) -> Result<MotorId> {
        let entry = config.program(program).ok_or_else(|| {
            ConfigError::ProgramNotFound(heapless::String::try_from(program).unwrap_or_default())
        })?;
        let id = motor_name(entry.motor.as_str())
            .and_then(|name| self.find_motor(name))
            .ok_or_else(|| ConfigError::MotorNotFound(entry.motor.clone()))?;

        self.attach(id, entry.to_program(program)?, entry.calibrate_mode(), run_info)?;
        Ok(id)
    }

    fn attach(
        &mut self,
        id: MotorId,
        program: StepProgram<'a>,
        calibrate: CalibrateMode,
        run_info: Option<&'a SharedRunInfo>,
    ) -> Result<()> {
        self.ensure_not_running()?;
        let slot = self.slot_mut(id)?;
        trace!("motor {}: program attached", slot.motor.name());
        slot.attach(program, calibrate, run_info);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cycle control
    // ------------------------------------------------------------------

    /// Start a run with every prepared motor.
    ///
    /// # Errors
    ///
    /// - `AlreadyRunning` if a run is in progress; nothing changes.
    /// - `TimerPeriodAliquant`/`TimerPeriodTooLong` if the tick period cannot
    ///   drive a prepared motor; the cycle error is set and no motor starts.
    pub fn start(&mut self) -> Result<()> {
        if self.state.status == CycleStatus::Running {
            return Err(ControlError::AlreadyRunning.into());
        }

        let period_us = self.settings.period_us;
        for slot in self.slots.iter().filter(|slot| slot.is_prepared()) {
            let pulse_delay_us = slot.motor.pulse_delay_us();
            if let Err(error) = self.settings.check_pulse_delay(pulse_delay_us) {
                warn!(
                    "start refused: motor {} pulse {}us, tick {}us, {:?}",
                    slot.motor.name(),
                    pulse_delay_us,
                    period_us,
                    error
                );
                let motor = slot.motor.name();
                self.state.error = error;
                return Err(match error {
                    CycleError::TimerPeriodTooLong => ControlError::TimerPeriodTooLong {
                        motor,
                        pulse_delay_us,
                        period_us,
                    },
                    _ => ControlError::TimerPeriodAliquant {
                        motor,
                        pulse_delay_us,
                        period_us,
                    },
                }
                .into());
            }
        }

        for slot in self.slots.iter_mut() {
            if slot.is_prepared() {
                slot.activate(&mut self.io);
            } else {
                slot.deactivate(&mut self.io);
            }
        }

        self.state = CycleState {
            status: CycleStatus::Running,
            paused: false,
            error: CycleError::None,
        };
        self.stats = TickStats::default();
        self.timer.start_ticking(period_us);
        info!(
            "cycle started: {} motors, tick {}us",
            self.slots.iter().filter(|slot| slot.is_active()).count(),
            period_us
        );
        Ok(())
    }

    /// Freeze every motor; no-op unless running.
    pub fn pause(&mut self) {
        if self.state.status == CycleStatus::Running {
            self.state.paused = true;
        }
    }

    /// Undo [`pause`](Self::pause); no-op unless running.
    pub fn resume(&mut self) {
        if self.state.status == CycleStatus::Running {
            self.state.paused = false;
        }
    }

    /// Stop ticking, drop every motor from the run and return to IDLE.
    ///
    /// Callable in any state. The cycle error is kept until the next start.
    pub fn finish(&mut self) {
        self.timer.stop_ticking();
        for slot in self.slots.iter_mut() {
            slot.deactivate(&mut self.io);
        }
        self.state.status = CycleStatus::Idle;
        self.state.paused = false;
        debug!("cycle reset to idle");
    }

    /// Whether the cycle is RUNNING (paused or not).
    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.status == CycleStatus::Running
    }

    /// Whether the cycle is paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    /// Global cycle status.
    #[inline]
    pub fn cycle_status(&self) -> CycleStatus {
        self.state.status
    }

    /// Global cycle error.
    #[inline]
    pub fn cycle_error(&self) -> CycleError {
        self.state.error
    }

    /// Handler timing of the current (or last) run.
    #[inline]
    pub fn tick_stats(&self) -> TickStats {
        self.stats
    }

    // ------------------------------------------------------------------
    // Tick handler
    // ------------------------------------------------------------------

    /// Advance every active motor by one tick period.
    ///
    /// Call from the timer collaborator's interrupt or thread; does nothing
    /// unless the cycle is running and not paused.
    pub fn tick(&mut self) {
        if self.state.status != CycleStatus::Running || self.state.paused {
            return;
        }
        let started_us = self.clock.now_us();
        let period_us = self.settings.period_us;

        let mut cancelled = false;
        for slot in self.slots.iter_mut().filter(|slot| slot.is_active()) {
            match slot.service(&mut self.io, period_us, &self.policy) {
                Outcome::Running => {}
                Outcome::Finished => debug!("motor {} finished", slot.motor.name()),
                Outcome::Cancel => {
                    cancelled = true;
                    break;
                }
            }
        }
        if cancelled {
            self.cancel_run(CycleError::MotorError);
        }

        let elapsed_us = self.clock.now_us().saturating_sub(started_us);
        if self.stats.record(elapsed_us, period_us) {
            let action = self.policy.action(Condition::CycleTimingExceeded);
            warn!("tick took {}us of {}us, {:?}", elapsed_us, period_us, action);
            if action == ErrorAction::CancelCycle {
                self.cancel_run(CycleError::HandlerTimingExceeded);
            }
        }

        self.settle();
    }

    /// Finish every running motor; the first error of a run is kept.
    fn cancel_run(&mut self, error: CycleError) {
        if !self.state.error.is_err() {
            self.state.error = error;
        }
        for slot in self.slots.iter_mut().filter(|slot| slot.is_running()) {
            slot.stop(MotorFaults::empty());
        }
        error!("cycle cancelled: {:?}", self.state.error);
    }

    /// FINISHED once every motor is done and every pulse released.
    fn settle(&mut self) {
        let done = self
            .slots
            .iter()
            .filter(|slot| slot.is_active())
            .all(|slot| !slot.is_running() && !slot.holds_pulse());
        if done {
            self.state.status = CycleStatus::Finished;
            self.timer.stop_ticking();
            info!(
                "cycle finished after {} ticks, {:?}",
                self.stats.ticks,
                self.state.error
            );
        }
    }

    // ------------------------------------------------------------------
    // Collaborators
    // ------------------------------------------------------------------

    /// The digital I/O collaborator.
    #[inline]
    pub fn io(&self) -> &IO {
        &self.io
    }

    /// Mutable access to the digital I/O collaborator.
    #[inline]
    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    /// The tick timer collaborator.
    #[inline]
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// The handler clock.
    #[inline]
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    fn ensure_not_running(&self) -> Result<()> {
        if self.state.status == CycleStatus::Running {
            return Err(ControlError::AlreadyRunning.into());
        }
        Ok(())
    }

    fn slot(&self, id: MotorId) -> Result<&MotorSlot<'a>> {
        self.slots
            .get(id.0)
            .ok_or_else(|| MotorError::UnknownMotor(id.0).into())
    }

    fn slot_mut(&mut self, id: MotorId) -> Result<&mut MotorSlot<'a>> {
        self.slots
            .get_mut(id.0)
            .ok_or_else(|| MotorError::UnknownMotor(id.0).into())
    }
}
