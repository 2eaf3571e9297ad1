//! Example: configuration-driven cycles.
//!
//! This example demonstrates how to:
//! - Load motors, tick settings, error policy and programs from TOML
//! - Build an engine from the configuration
//! - Run named programs one cycle after another
//!
//! Run with: `cargo run --example config_driven --features std`

use embedded_hal::digital::PinState;
use stepper_cycle::{
    config::parse_config, CycleEngine, CycleStatus, DigitalIo, PinId, StdClock, TickTimer,
};

/// Prints pin writes other than step pulses.
struct ConsoleIo {
    step_pins: [PinId; 2],
}

impl DigitalIo for ConsoleIo {
    fn read_pin(&mut self, _pin: PinId) -> PinState {
        PinState::Low
    }

    fn write_pin(&mut self, pin: PinId, level: PinState) {
        if !self.step_pins.contains(&pin) {
            println!("    pin {} -> {:?}", pin, level);
        }
    }
}

/// Timer stand-in: the demo calls `tick` itself.
struct LoopTimer;

impl TickTimer for LoopTimer {
    fn configure(&mut self, settings: &stepper_cycle::TimerSettings) {
        println!(
            "timer {}: prescaler {}, divisor {}, period {} us",
            settings.timer, settings.prescaler, settings.divisor, settings.period_us
        );
    }

    fn start_ticking(&mut self, _period_us: u32) {}

    fn stop_ticking(&mut self) {}
}

const CONFIG: &str = r#"
[timer]
period_us = 250
timer = 1
prescaler = 83
divisor = 250

[error_policy]
hard_end = "stop_motor"
small_pulse_delay = "fix"
cycle_timing_exceeded = "ignore"

[motors.p]
step_pin = 2
dir_pin = 3
enable_pin = 8
pulse_delay_us = 1000
distance_per_step = 4

[motors.p.ends]
min_strategy = "const"
max_strategy = "const"
min_pos = -400
max_pos = 400

[motors.t]
step_pin = 4
dir_pin = 5
pulse_delay_us = 750
invert_direction = true
current_pos = 100

[motors.t.ends]
min_strategy = "const"
min_pos = 0

# Run to the min side, tracking it as the new soft end.
[programs.home_t]
motor = "t"
kind = "steps"
count = -100
calibrate = "calibrate_start_min_pos"

[programs.sweep_p]
motor = "p"
kind = "buffered"
delays_us = [3000, 1500, 1000, 1500, 3000]
repeats = [5, 10, 40, 10, 5]

[programs.back_p]
motor = "p"
kind = "simple_buffered"
delays_us = [2000, 1000, 2000]
scale = -20
"#;

fn main() -> stepper_cycle::Result<()> {
    println!("=== Configuration-Driven Cycle Example ===\n");

    let config = parse_config(CONFIG)?;

    println!("Motors:");
    for name in config.motor_names() {
        if let Some(motor) = config.motor(name) {
            println!(
                "  {}: step {}, dir {}, pulse {} us, {} per step, at {}",
                name,
                motor.step_pin,
                motor.dir_pin,
                motor.pulse_delay_us,
                motor.distance_per_step,
                motor.current_pos
            );
        }
    }
    println!("Programs:");
    for name in config.program_names() {
        if let Some(program) = config.program(name) {
            println!("  {}: {:?} on {}", name, program.kind, program.motor);
        }
    }
    println!();

    let io = ConsoleIo { step_pins: [2, 4] };
    let mut engine: CycleEngine<'_, _, _, _> =
        CycleEngine::from_config(io, LoopTimer, StdClock::new(), &config)?;

    for program in ["home_t", "sweep_p", "back_p"] {
        println!("Running '{}':", program);
        let id = engine.prepare_config(&config, program, None)?;
        engine.start()?;

        let mut ticks = 0u32;
        while engine.cycle_status() == CycleStatus::Running {
            engine.tick();
            ticks += 1;
        }

        let motor = engine.motor(id)?;
        let position = motor.position();
        println!(
            "  {} ticks, motor {} at {} (range {}..={}), {:?}",
            ticks,
            motor.name(),
            position.current,
            position.min,
            position.max,
            engine.run_info(id)?
        );
        engine.finish();
    }

    // Unknown names are reported, not panicked on.
    match engine.prepare_config(&config, "nonexistent", None) {
        Ok(_) => println!("\nunexpected program found"),
        Err(e) => println!("\nprogram 'nonexistent': {:?}", e),
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
