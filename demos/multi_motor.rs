//! Example: several motors in one cycle, ticked from a background thread.
//!
//! This example demonstrates how to:
//! - Share an engine between a ticker thread and the control flow
//! - Mix program kinds (buffered ramp, dynamic whirl) in one run
//! - Watch motors through `SharedRunInfo` without locking the engine
//! - Pause, resume and finish a running cycle
//!
//! Run with: `cargo run --example multi_motor --features std`

use std::thread;
use std::time::Duration;

use embedded_hal::digital::PinState;
use stepper_cycle::{
    CycleEngine, Direction, DigitalIo, ErrorAction, MotorDescriptorBuilder, PinId, PolicyUpdate,
    SharedCycle, SharedRunInfo, StdClock, TickTimer, TimerSettings,
};

/// Counts rising edges per step pin.
#[derive(Default)]
struct CountingIo {
    pulses: [u32; 16],
}

impl DigitalIo for CountingIo {
    fn read_pin(&mut self, _pin: PinId) -> PinState {
        PinState::Low
    }

    fn write_pin(&mut self, pin: PinId, level: PinState) {
        if level == PinState::High {
            if let Some(count) = self.pulses.get_mut(pin as usize) {
                *count += 1;
            }
        }
    }
}

/// The ticker thread polls `is_running`; nothing to program here.
struct ThreadTimer;

impl TickTimer for ThreadTimer {
    fn start_ticking(&mut self, _period_us: u32) {}

    fn stop_ticking(&mut self) {}
}

/// Acceleration ramp: 4 ms down to 1.5 ms, then constant.
fn ramp(step: u32) -> u32 {
    4000u32.saturating_sub(step.saturating_mul(100)).max(1500)
}

static Y_DELAYS: [u32; 3] = [3000, 1500, 3000];
static Y_REPEATS: [i32; 3] = [10, 60, 10];

fn main() -> stepper_cycle::Result<()> {
    println!("=== Multi-Motor Cycle Example ===\n");

    let x_delay = ramp;
    let x_info = SharedRunInfo::new();
    let y_info = SharedRunInfo::new();

    let mut engine: CycleEngine<'_, _, _, _> = CycleEngine::new(
        CountingIo::default(),
        ThreadTimer,
        StdClock::new(),
        TimerSettings::new(500),
    )?;
    engine.set_error_policy(PolicyUpdate {
        small_pulse_delay: ErrorAction::Fix,
        cycle_timing_exceeded: ErrorAction::Ignore,
        ..Default::default()
    })?;

    let x = engine.add_motor(
        MotorDescriptorBuilder::new('x')
            .step_pin(2)
            .dir_pin(3)
            .pulse_delay_us(1500)
            .build()?,
    )?;
    let y = engine.add_motor(
        MotorDescriptorBuilder::new('y')
            .step_pin(4)
            .dir_pin(5)
            .pulse_delay_us(1500)
            .invert_direction(true)
            .build()?,
    )?;

    engine.prepare_dynamic_whirl(x, Direction::Forward, &x_delay, Some(&x_info))?;
    engine.prepare_buffered_steps(y, &Y_DELAYS, &Y_REPEATS, Some(&y_info))?;

    let shared = SharedCycle::new(engine);
    shared.start()?;

    thread::scope(|scope| {
        scope.spawn(|| {
            while shared.is_running() {
                shared.tick();
                thread::sleep(Duration::from_micros(500));
            }
        });

        thread::sleep(Duration::from_millis(50));
        let _ = shared.pause();
        println!("paused:  x {:?}, y {:?}", x_info.status(), y_info.status());
        thread::sleep(Duration::from_millis(20));
        let _ = shared.resume();

        // Y has a finite table; X whirls until the cycle is finished.
        while y_info.status() == stepper_cycle::StepperStatus::Running {
            thread::sleep(Duration::from_millis(5));
        }
        println!("y done:  {:?}", y_info.snapshot());
        shared.finish();
    });

    let engine = shared.into_inner();
    println!("\n=== Result ===");
    for id in [x, y] {
        let motor = engine.motor(id)?;
        println!(
            "motor {}: position {}, pulses {}, {:?}",
            motor.name(),
            motor.current_pos(),
            engine.io().pulses[motor.pins().step as usize],
            engine.run_info(id)?
        );
    }
    println!("cycle error: {:?}", engine.cycle_error());
    println!("handler: {:?}", engine.tick_stats());

    Ok(())
}
