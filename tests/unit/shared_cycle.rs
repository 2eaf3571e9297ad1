//! Unit tests for the critical-section wrapper around the engine.

use std::thread;

use stepper_cycle::error::{ControlError, Error};
use stepper_cycle::{
    CalibrateMode, CycleError, CycleStatus, Direction, MotorDescriptorBuilder, SharedCycle,
    SharedRunInfo, StepperStatus,
};

use super::fakes::{engine, TestEngine};

fn one_motor<'a>(run_info: Option<&'a SharedRunInfo>, count: i64) -> TestEngine<'a> {
    let mut engine = engine(200);
    let x = engine
        .add_motor(
            MotorDescriptorBuilder::new('x')
                .step_pin(2)
                .dir_pin(3)
                .pulse_delay_us(600)
                .build()
                .unwrap(),
        )
        .unwrap();
    engine
        .prepare_steps(x, count, 0, CalibrateMode::None, run_info)
        .unwrap();
    engine
}

#[test]
fn test_queries_mirror_engine() {
    let shared = SharedCycle::new(one_motor(None, 2));
    assert_eq!(shared.cycle_status(), CycleStatus::Idle);

    shared.start().unwrap();
    assert!(shared.is_running());

    shared.pause().unwrap();
    assert!(shared.is_paused());
    shared.resume().unwrap();
    assert!(!shared.is_paused());

    // 2 steps of 3 ticks, one more to release the last pulse.
    for _ in 0..7 {
        shared.tick();
    }
    assert_eq!(shared.cycle_status(), CycleStatus::Finished);
    assert_eq!(shared.cycle_error(), CycleError::None);

    let engine = shared.into_inner();
    assert_eq!(engine.io().pulses(2), 2);
}

#[test]
fn test_nested_access_is_busy() {
    let shared = SharedCycle::new(one_motor(None, 1));
    let inner = shared.with(|_| shared.with(|_| ())).unwrap();
    assert!(matches!(inner, Err(Error::Control(ControlError::EngineBusy))));
}

#[test]
fn test_finish_from_inside_is_deferred() {
    let shared = SharedCycle::new(one_motor(None, 10));
    shared.start().unwrap();

    shared
        .with(|engine| {
            shared.finish();
            // Not applied while this borrow is held.
            assert!(engine.is_running());
        })
        .unwrap();

    assert_eq!(shared.cycle_status(), CycleStatus::Idle);
    assert!(!shared.into_inner().timer().ticking);
}

#[test]
fn test_tick_while_borrowed_is_skipped() {
    let info = SharedRunInfo::new();
    let shared = SharedCycle::new(one_motor(Some(&info), 1));
    shared.start().unwrap();

    shared.with(|_| {
        for _ in 0..10 {
            shared.tick();
        }
    })
    .unwrap();

    assert_eq!(info.status(), StepperStatus::Running);
    assert_eq!(shared.into_inner().tick_stats().ticks, 0);
}

#[test]
fn test_ticker_thread() {
    let info = SharedRunInfo::new();
    let shared = SharedCycle::new(one_motor(Some(&info), 25));
    shared.start().unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            while shared.is_running() {
                shared.tick();
            }
        });
    });

    assert_eq!(shared.cycle_status(), CycleStatus::Finished);
    assert!(info.snapshot().finished_cleanly());
    let engine = shared.into_inner();
    let x = engine.find_motor('x').unwrap();
    assert_eq!(engine.motor(x).unwrap().current_pos(), 25);
}

#[test]
fn test_whirl_stopped_from_control_context() {
    let shared = SharedCycle::new({
        let mut engine = engine(200);
        let x = engine
            .add_motor(
                MotorDescriptorBuilder::new('x')
                    .step_pin(2)
                    .dir_pin(3)
                    .pulse_delay_us(600)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        engine
            .prepare_whirl(x, Direction::Forward, 0, CalibrateMode::None, None)
            .unwrap();
        engine
    });
    shared.start().unwrap();

    for _ in 0..30 {
        shared.tick();
    }
    shared.finish();

    assert_eq!(shared.cycle_status(), CycleStatus::Idle);
    let engine = shared.into_inner();
    assert_eq!(engine.motor(engine.find_motor('x').unwrap()).unwrap().current_pos(), 10);
    assert_eq!(engine.io().levels(2).last(), Some(&embedded_hal::digital::PinState::Low));
}
