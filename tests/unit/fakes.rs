//! Host stand-ins for the engine's collaborators.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use embedded_hal::digital::PinState;
use stepper_cycle::{
    CycleEngine, CycleStatus, DigitalIo, HandlerClock, PinId, TickTimer, TimerSettings,
};

/// Records every write; inputs read LOW unless forced or tripped.
#[derive(Debug, Default)]
pub struct FakeIo {
    pub writes: Vec<(PinId, PinState)>,
    pub high_inputs: Vec<PinId>,
    /// `(sensor, step_pin, pulses)`: `sensor` reads HIGH once `step_pin`
    /// has been pulsed `pulses` times.
    pub trips: Vec<(PinId, PinId, usize)>,
}

impl FakeIo {
    /// Number of rising edges written to `pin`.
    pub fn pulses(&self, pin: PinId) -> usize {
        self.writes
            .iter()
            .filter(|(p, level)| *p == pin && *level == PinState::High)
            .count()
    }

    /// Levels written to `pin`, in order.
    pub fn levels(&self, pin: PinId) -> Vec<PinState> {
        self.writes
            .iter()
            .filter(|(p, _)| *p == pin)
            .map(|(_, level)| *level)
            .collect()
    }
}

impl DigitalIo for FakeIo {
    fn read_pin(&mut self, pin: PinId) -> PinState {
        let tripped = self
            .trips
            .iter()
            .any(|(sensor, step, pulses)| *sensor == pin && self.pulses(*step) >= *pulses);
        PinState::from(tripped || self.high_inputs.contains(&pin))
    }

    fn write_pin(&mut self, pin: PinId, level: PinState) {
        self.writes.push((pin, level));
    }
}

#[derive(Debug, Default)]
pub struct FakeTimer {
    pub configured: Option<TimerSettings>,
    pub ticking: bool,
    pub starts: usize,
    pub stops: usize,
}

impl TickTimer for FakeTimer {
    fn configure(&mut self, settings: &TimerSettings) {
        self.configured = Some(*settings);
    }

    fn start_ticking(&mut self, _period_us: u32) {
        self.ticking = true;
        self.starts += 1;
    }

    fn stop_ticking(&mut self) {
        self.ticking = false;
        self.stops += 1;
    }
}

/// Advances by `handler_us` on every read, so each tick measures exactly
/// `handler_us`.
#[derive(Debug, Clone, Default)]
pub struct FakeClock {
    pub handler_us: Arc<AtomicU64>,
    now: u64,
}

impl FakeClock {
    pub fn new(handler_us: u64) -> Self {
        Self {
            handler_us: Arc::new(AtomicU64::new(handler_us)),
            now: 0,
        }
    }
}

impl HandlerClock for FakeClock {
    fn now_us(&mut self) -> u64 {
        self.now += self.handler_us.load(Ordering::Relaxed);
        self.now
    }
}

pub type TestEngine<'a> = CycleEngine<'a, FakeIo, FakeTimer, FakeClock>;

pub fn engine<'a>(period_us: u32) -> TestEngine<'a> {
    CycleEngine::new(
        FakeIo::default(),
        FakeTimer::default(),
        FakeClock::new(0),
        TimerSettings::new(period_us),
    )
    .expect("valid tick period")
}

/// Tick until the cycle leaves RUNNING; returns the number of ticks.
pub fn run_to_end(engine: &mut TestEngine<'_>, max_ticks: usize) -> usize {
    for n in 1..=max_ticks {
        engine.tick();
        if engine.cycle_status() != CycleStatus::Running {
            return n;
        }
    }
    panic!("cycle still running after {} ticks", max_ticks);
}
