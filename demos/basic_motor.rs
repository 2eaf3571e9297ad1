//! Basic motor control example.
//!
//! Registers one motor, runs a fixed number of steps and prints the pin
//! activity. The tick handler is called from a plain loop instead of a
//! timer interrupt.

use core::convert::Infallible;

use stepper_cycle::{
    CalibrateMode, CycleEngine, CycleStatus, EndsConfig, MotorDescriptorBuilder, PinBank, PinId,
    TickTimer, TimerSettings,
};

/// Mock output pin that prints its transitions.
struct MockPin {
    id: PinId,
    high: bool,
}

impl MockPin {
    fn new(id: PinId) -> Self {
        Self { id, high: false }
    }
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        if !self.high && self.id != 2 {
            println!("  pin {} -> HIGH", self.id);
        }
        self.high = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.high && self.id != 2 {
            println!("  pin {} -> LOW", self.id);
        }
        self.high = false;
        Ok(())
    }
}

/// Limit sensor that never fires.
struct OpenSwitch;

impl embedded_hal::digital::ErrorType for OpenSwitch {
    type Error = Infallible;
}

impl embedded_hal::digital::InputPin for OpenSwitch {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Timer stand-in: the demo calls `tick` itself.
#[derive(Default)]
struct LoopTimer {
    running: bool,
}

impl TickTimer for LoopTimer {
    fn start_ticking(&mut self, period_us: u32) {
        println!("timer started, period {} us", period_us);
        self.running = true;
    }

    fn stop_ticking(&mut self) {
        if self.running {
            println!("timer stopped");
        }
        self.running = false;
    }
}

fn main() -> stepper_cycle::Result<()> {
    println!("=== Basic Motor Control Example ===\n");

    let mut pins: PinBank<MockPin, OpenSwitch, 4, 2> = PinBank::new();
    for id in [2, 3, 4] {
        let _ = pins.add_output(id, MockPin::new(id));
    }
    let _ = pins.add_input(10, OpenSwitch);

    // Virtual clock: the handler is measured as taking no time.
    let clock = || 0u64;

    let mut engine: CycleEngine<'_, _, _, _> =
        CycleEngine::new(pins, LoopTimer::default(), clock, TimerSettings::new(250))?;

    let motor = MotorDescriptorBuilder::new('x')
        .step_pin(2)
        .dir_pin(3)
        .enable_pin(4)
        .pulse_delay_us(1000)
        .distance_per_step(5)
        .ends(EndsConfig::bounded(-500, 500).with_sensors(Some(10), None))
        .build()?;
    let x = engine.add_motor(motor)?;

    println!(
        "motor {} at {}, pulse delay {} us",
        engine.motor(x)?.name(),
        engine.motor(x)?.current_pos(),
        engine.motor(x)?.pulse_delay_us()
    );

    // 40 steps backward, 2 ms between steps.
    engine.prepare_steps(x, -40, 2000, CalibrateMode::None, None)?;
    engine.start()?;

    let mut ticks = 0;
    while engine.cycle_status() == CycleStatus::Running {
        engine.tick();
        ticks += 1;
    }

    let info = engine.run_info(x)?;
    println!("\n=== Result ===");
    println!("ticks: {}", ticks);
    println!("position: {}", engine.motor(x)?.current_pos());
    println!("status: {:?}, faults: {:?}", info.status, info.faults);
    println!("cycle error: {:?}", engine.cycle_error());

    engine.finish();
    println!("\n=== Example Complete ===");
    Ok(())
}
