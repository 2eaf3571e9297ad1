//! Capabilities the cycle engine consumes from the platform.
//!
//! The engine never touches hardware directly. Pin I/O goes through
//! [`DigitalIo`], the periodic interrupt is owned by a [`TickTimer`], and the
//! handler self-check reads a [`HandlerClock`].

use embedded_hal::digital::{InputPin, OutputPin, PinState};

use crate::config::TimerSettings;

/// Platform pin number. Absent pins are expressed as `Option<PinId>::None`.
pub type PinId = u8;

/// Raw digital I/O by pin number.
pub trait DigitalIo {
    /// Read the current level of an input pin.
    fn read_pin(&mut self, pin: PinId) -> PinState;

    /// Drive an output pin.
    fn write_pin(&mut self, pin: PinId, level: PinState);

    /// Switch a driver's enable line.
    ///
    /// Step-dir drivers are enabled by a LOW level.
    fn set_enabled(&mut self, pin: PinId, enabled: bool) {
        let level = if enabled { PinState::Low } else { PinState::High };
        self.write_pin(pin, level);
    }
}

/// Periodic timer that invokes the tick handler.
///
/// Wiring the interrupt (or thread) to [`crate::cycle::SharedCycle::tick`] is
/// the implementor's job; the engine only says when to start and stop.
pub trait TickTimer {
    /// Program prescaler/divisor registers for a period.
    fn configure(&mut self, settings: &TimerSettings) {
        let _ = settings;
    }

    /// Begin calling the tick handler every `period_us` microseconds.
    fn start_ticking(&mut self, period_us: u32);

    /// Stop calling the tick handler.
    fn stop_ticking(&mut self);
}

/// Monotonic microsecond clock used to measure the tick handler.
pub trait HandlerClock {
    /// Current time in microseconds.
    fn now_us(&mut self) -> u64;
}

impl<F> HandlerClock for F
where
    F: FnMut() -> u64,
{
    #[inline]
    fn now_us(&mut self) -> u64 {
        self()
    }
}

/// Host clock backed by `std::time::Instant`.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Start a clock at zero.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl HandlerClock for StdClock {
    fn now_us(&mut self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

/// [`DigitalIo`] over embedded-hal 1.0 pin objects registered by number.
///
/// - Failed writes are logged and dropped.
/// - Failed reads report `High`, so a broken limit sensor stops the motor.
/// - Unknown output numbers are ignored; unknown inputs read `Low`.
pub struct PinBank<OUT, IN, const NO: usize, const NI: usize> {
    outputs: heapless::Vec<(PinId, OUT), NO>,
    inputs: heapless::Vec<(PinId, IN), NI>,
}

impl<OUT, IN, const NO: usize, const NI: usize> Default for PinBank<OUT, IN, NO, NI> {
    fn default() -> Self {
        Self::new()
    }
}

impl<OUT, IN, const NO: usize, const NI: usize> PinBank<OUT, IN, NO, NI> {
    /// Create an empty bank.
    pub const fn new() -> Self {
        Self {
            outputs: heapless::Vec::new(),
            inputs: heapless::Vec::new(),
        }
    }

    /// Register an output pin (step, dir or enable line).
    ///
    /// Hands the pin back if the bank is full.
    pub fn add_output(&mut self, id: PinId, pin: OUT) -> core::result::Result<(), OUT> {
        self.outputs.push((id, pin)).map_err(|(_, pin)| pin)
    }

    /// Register an input pin (limit sensor).
    ///
    /// Hands the pin back if the bank is full.
    pub fn add_input(&mut self, id: PinId, pin: IN) -> core::result::Result<(), IN> {
        self.inputs.push((id, pin)).map_err(|(_, pin)| pin)
    }
}

impl<OUT, IN, const NO: usize, const NI: usize> DigitalIo for PinBank<OUT, IN, NO, NI>
where
    OUT: OutputPin,
    IN: InputPin,
{
    fn read_pin(&mut self, pin: PinId) -> PinState {
        let Some((_, input)) = self.inputs.iter_mut().find(|(id, _)| *id == pin) else {
            return PinState::Low;
        };
        match input.is_high() {
            Ok(high) => PinState::from(high),
            Err(_) => {
                warn!("read of pin {} failed, treating as triggered", pin);
                PinState::High
            }
        }
    }

    fn write_pin(&mut self, pin: PinId, level: PinState) {
        if let Some((_, output)) = self.outputs.iter_mut().find(|(id, _)| *id == pin) {
            if output.set_state(level).is_err() {
                warn!("write of pin {} failed", pin);
            }
        }
    }
}
