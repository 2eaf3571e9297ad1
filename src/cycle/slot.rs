//! One entry of the engine's motor arena and its per-tick step logic.

use embedded_hal::digital::PinState;

use crate::config::{EndSide, EndStrategy};
use crate::hal::DigitalIo;
use crate::motor::{MotorDescriptor, MotorFaults, RunInfo, SharedRunInfo, StepperStatus};
use crate::policy::{Condition, ErrorAction, ErrorPolicy};
use crate::program::{CalibrateMode, Direction, StepProgram, StepTiming};

/// Handle of a motor registered in a [`super::CycleEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorId(pub(crate) usize);

impl MotorId {
    /// Registration index; also the tick order.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// What servicing a slot did to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Nothing that concerns the other motors.
    Running,
    /// The motor finished during this tick.
    Finished,
    /// The motor faulted under CANCEL_CYCLE.
    Cancel,
}

enum Load {
    Ready(StepTiming),
    Exhausted,
    Stopped(ErrorAction),
}

#[derive(Debug, Default)]
struct Motion {
    elapsed_us: u64,
    pending: Option<StepTiming>,
    pulse_high: bool,
    last_dir: Option<Direction>,
}

#[derive(Debug)]
pub(crate) struct MotorSlot<'a> {
    pub(crate) motor: MotorDescriptor,
    program: Option<StepProgram<'a>>,
    calibrate: CalibrateMode,
    shared: Option<&'a SharedRunInfo>,
    info: RunInfo,
    active: bool,
    motion: Motion,
}

impl<'a> MotorSlot<'a> {
    pub(crate) fn new(motor: MotorDescriptor) -> Self {
        Self {
            motor,
            program: None,
            calibrate: CalibrateMode::None,
            shared: None,
            info: RunInfo::default(),
            active: false,
            motion: Motion::default(),
        }
    }

    #[inline]
    pub(crate) fn info(&self) -> RunInfo {
        self.info
    }

    #[inline]
    pub(crate) fn is_prepared(&self) -> bool {
        self.program.is_some()
    }

    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub(crate) fn is_running(&self) -> bool {
        self.active && self.info.status == StepperStatus::Running
    }

    #[inline]
    pub(crate) fn holds_pulse(&self) -> bool {
        self.motion.pulse_high
    }

    /// Attach a program for the next run. The previous run's status and
    /// flags stay readable until `activate`.
    pub(crate) fn attach(
        &mut self,
        program: StepProgram<'a>,
        calibrate: CalibrateMode,
        shared: Option<&'a SharedRunInfo>,
    ) {
        self.program = Some(program);
        self.calibrate = calibrate;
        self.shared = shared;
        self.publish();
    }

    pub(crate) fn activate<IO: DigitalIo>(&mut self, io: &mut IO) {
        self.active = true;
        self.motion = Motion::default();
        self.info = RunInfo {
            status: StepperStatus::Running,
            faults: MotorFaults::empty(),
        };
        self.publish();

        if let Some(pin) = self.motor.pins().enable {
            io.set_enabled(pin, true);
        }
    }

    /// Leave the run: pulse released, program dropped, RUNNING becomes FINISHED.
    pub(crate) fn deactivate<IO: DigitalIo>(&mut self, io: &mut IO) {
        self.release_pulse(io);
        if self.is_running() {
            self.stop(MotorFaults::empty());
        }
        self.active = false;
        self.program = None;
    }

    /// Finish the motor with `faults` added to its flags.
    pub(crate) fn stop(&mut self, faults: MotorFaults) {
        self.info.status = StepperStatus::Finished;
        self.info.faults |= faults;
        self.program = None;
        self.motion.pending = None;
        self.publish();
    }

    pub(crate) fn release_pulse<IO: DigitalIo>(&mut self, io: &mut IO) {
        if self.motion.pulse_high {
            io.write_pin(self.motor.pins().step, PinState::Low);
            self.motion.pulse_high = false;
        }
    }

    /// Advance this motor by one tick of `period_us`.
    pub(crate) fn service<IO: DigitalIo>(
        &mut self,
        io: &mut IO,
        period_us: u32,
        policy: &ErrorPolicy,
    ) -> Outcome {
        self.release_pulse(io);
        if self.info.status != StepperStatus::Running {
            return Outcome::Running;
        }

        let timing = match self.motion.pending {
            Some(timing) => timing,
            None => match self.load_next(policy) {
                Load::Ready(timing) => timing,
                Load::Exhausted => return self.exhausted(),
                Load::Stopped(action) => return fault_outcome(action),
            },
        };

        self.motion.elapsed_us += period_us as u64;
        if self.motion.elapsed_us < timing.delay_us as u64 {
            return Outcome::Running;
        }

        let delta = self.motor.step_delta(timing.dir);
        let side = EndSide::of_delta(delta);

        let min_hit = self.sensor_triggered(io, EndSide::Min);
        let max_hit = self.sensor_triggered(io, EndSide::Max);
        let hard_end = match side {
            EndSide::Min => min_hit,
            EndSide::Max => max_hit,
        };
        if hard_end {
            return self.end_reached(Condition::HardEnd, MotorFaults::hard_end(side), policy);
        }

        let position = self.motor.position();
        if self.calibrate == CalibrateMode::None
            && self.motor.strategy(side) == EndStrategy::Const
            && position.crosses(position.target(delta), side)
        {
            return self.end_reached(Condition::SoftEnd, MotorFaults::soft_end(side), policy);
        }

        self.issue_step(io, timing.dir, delta);

        match self.load_next(policy) {
            Load::Ready(_) => Outcome::Running,
            Load::Exhausted => self.exhausted(),
            Load::Stopped(action) => fault_outcome(action),
        }
    }

    fn issue_step<IO: DigitalIo>(&mut self, io: &mut IO, dir: Direction, delta: i64) {
        let pins = *self.motor.pins();
        if self.motion.last_dir != Some(dir) {
            io.write_pin(pins.dir, self.motor.dir_level(dir));
            self.motion.last_dir = Some(dir);
        }
        io.write_pin(pins.step, PinState::High);
        self.motion.pulse_high = true;

        self.motor.position_mut().advance(delta, self.calibrate);
        self.motion.elapsed_us = 0;
        self.motion.pending = None;
    }

    /// Pull the next step from the program and check its delay.
    fn load_next(&mut self, policy: &ErrorPolicy) -> Load {
        let Some(mut timing) = self.program.as_mut().and_then(StepProgram::next_step) else {
            return Load::Exhausted;
        };

        let pulse_delay_us = self.motor.pulse_delay_us();
        if timing.delay_us == 0 {
            timing.delay_us = pulse_delay_us;
        } else if timing.delay_us < pulse_delay_us {
            let action = policy.action(Condition::SmallPulseDelay);
            if action == ErrorAction::Fix {
                trace!(
                    "motor {}: delay {}us raised to {}us",
                    self.motor.name(),
                    timing.delay_us,
                    pulse_delay_us
                );
                timing.delay_us = pulse_delay_us;
            } else {
                warn!(
                    "motor {}: delay {}us below pulse delay, {:?}",
                    self.motor.name(),
                    timing.delay_us,
                    action
                );
                self.stop(MotorFaults::PULSE_DELAY_SMALL);
                return Load::Stopped(action);
            }
        }

        self.motion.pending = Some(timing);
        Load::Ready(timing)
    }

    fn exhausted(&mut self) -> Outcome {
        self.stop(MotorFaults::empty());
        Outcome::Finished
    }

    fn end_reached(
        &mut self,
        condition: Condition,
        flag: MotorFaults,
        policy: &ErrorPolicy,
    ) -> Outcome {
        let action = policy.action(condition);
        warn!(
            "motor {}: {:?} at {}, {:?}",
            self.motor.name(),
            condition,
            self.motor.current_pos(),
            action
        );
        self.stop(flag);
        fault_outcome(action)
    }

    fn sensor_triggered<IO: DigitalIo>(&self, io: &mut IO, side: EndSide) -> bool {
        self.motor
            .sensor(side)
            .map_or(false, |pin| io.read_pin(pin) == PinState::High)
    }

    fn publish(&self) {
        if let Some(shared) = self.shared {
            shared.store(self.info);
        }
    }
}

fn fault_outcome(action: ErrorAction) -> Outcome {
    if action == ErrorAction::CancelCycle {
        Outcome::Cancel
    } else {
        Outcome::Finished
    }
}
