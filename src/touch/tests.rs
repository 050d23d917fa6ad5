use ::core::{cell::RefCell, convert::Infallible};

use embedded_hal::digital::{ErrorKind, ErrorType};

use super::*;
use crate::{
    drivers::gt911::GT911_ADDRESS,
    platform::ManualClock,
    replay::{BusFrame, FaultStage, ReplayBus, ReplayFault},
};

type Driver<'c> = TouchDriver<ReplayBus<4>, &'c ManualClock>;

fn identity_config() -> TouchConfig {
    TouchConfig::default()
        .with_address(GT911_ADDRESS)
        .with_screen(320, 240)
        .with_orientation(false, false)
        .with_thresholds(GestureThresholds {
            drag_min_distance_px: 2,
            release_grace_ms: 100,
            long_press_ms: 2000,
            noise_floor_ms: 30,
        })
}

fn driver(clock: &ManualClock, config: TouchConfig) -> Driver<'_> {
    TouchDriver::new(ReplayBus::new(GT911_ADDRESS), clock, config)
}

fn poll(driver: &mut Driver<'_>, clock: &ManualClock, ms: u64, frame: BusFrame) -> Gesture {
    clock.set(ms);
    driver.bus_mut().push(frame).unwrap();
    driver.read()
}

#[test]
fn each_read_is_one_status_read_and_one_clear() {
    let clock = ManualClock::new(0);
    let mut touch = driver(&clock, identity_config());

    poll(&mut touch, &clock, 0, BusFrame::released());
    assert_eq!(touch.bus_mut().status_reads(), 1);
    assert_eq!(touch.bus_mut().clear_writes(), 1);
    assert_eq!(touch.bus_mut().point_reads(), 0);

    poll(&mut touch, &clock, 20, BusFrame::pressed(10, 10));
    assert_eq!(touch.bus_mut().status_reads(), 2);
    assert_eq!(touch.bus_mut().clear_writes(), 2);
    assert_eq!(touch.bus_mut().point_reads(), 1);
    assert_eq!(touch.diagnostics().polls, 2);
}

#[test]
fn ready_flag_without_points_reads_as_released() {
    let clock = ManualClock::new(0);
    let mut touch = driver(&clock, identity_config());
    poll(&mut touch, &clock, 0, BusFrame::raw(0x01, 10, 10));
    poll(&mut touch, &clock, 20, BusFrame::raw(0x80, 10, 10));
    assert_eq!(touch.bus_mut().point_reads(), 0);
    assert!(!touch.gesture_state().pressed);
}

#[test]
fn status_fault_skips_clear_and_leaves_press_untouched() {
    let clock = ManualClock::new(0);
    let mut touch = driver(&clock, identity_config());
    poll(&mut touch, &clock, 0, BusFrame::pressed(50, 50));
    let before = touch.gesture_state();

    assert_eq!(
        poll(&mut touch, &clock, 20, BusFrame::faulted(FaultStage::Status)),
        Gesture::None
    );
    assert_eq!(touch.gesture_state(), before);
    assert_eq!(touch.bus_mut().clear_writes(), 1);

    let diag = touch.diagnostics();
    assert_eq!(diag.bus_faults, 1);
    assert_eq!(diag.malformed_samples, 0);
    assert_eq!(diag.last_fault, Some(FaultKind::Bus));
}

#[test]
fn point_fault_mid_press_keeps_anchor_and_start() {
    let clock = ManualClock::new(0);
    let mut touch = driver(&clock, identity_config());
    poll(&mut touch, &clock, 0, BusFrame::pressed(50, 50));
    poll(&mut touch, &clock, 20, BusFrame::faulted(FaultStage::Point));
    poll(&mut touch, &clock, 40, BusFrame::faulted(FaultStage::Clear));

    let state = touch.gesture_state();
    assert_eq!(state.phase, GesturePhase::Pressing);
    assert_eq!(state.press_started_at, 0);
    assert_eq!(state.last_active_at, 0);
    assert_eq!(state.anchor, Some(TouchPoint::new(50, 50)));
    assert_eq!(touch.diagnostics().bus_faults, 2);
    assert_eq!(touch.diagnostics().fault_streak, 2);
}

#[test]
fn faults_never_confirm_a_release() {
    let clock = ManualClock::new(0);
    let mut touch = driver(&clock, identity_config());
    poll(&mut touch, &clock, 0, BusFrame::pressed(50, 50));
    for ms in (20..=600).step_by(20) {
        assert_eq!(
            poll(&mut touch, &clock, ms, BusFrame::faulted(FaultStage::Status)),
            Gesture::None
        );
    }
    assert!(touch.gesture_state().pressed);

    poll(&mut touch, &clock, 620, BusFrame::pressed(50, 50));
    assert_eq!(touch.diagnostics().fault_streak, 0);
    assert_eq!(touch.gesture_state().press_started_at, 0);
}

#[test]
fn too_many_points_is_discarded_as_malformed() {
    let clock = ManualClock::new(0);
    let mut touch = driver(&clock, identity_config());
    assert_eq!(
        poll(&mut touch, &clock, 0, BusFrame::raw(0x86, 10, 10)),
        Gesture::None
    );
    assert_eq!(touch.bus_mut().point_reads(), 0);
    assert!(!touch.gesture_state().pressed);

    let diag = touch.diagnostics();
    assert_eq!(diag.malformed_samples, 1);
    assert_eq!(diag.bus_faults, 0);
    assert_eq!(diag.last_fault, Some(FaultKind::TooManyPoints));
}

#[test]
fn off_screen_coordinate_does_not_move_the_anchor() {
    let clock = ManualClock::new(0);
    let mut touch = driver(&clock, identity_config());
    poll(&mut touch, &clock, 0, BusFrame::pressed(100, 100));
    assert_eq!(
        poll(&mut touch, &clock, 20, BusFrame::pressed(320, 100)),
        Gesture::None
    );
    let state = touch.gesture_state();
    assert_eq!(state.anchor, Some(TouchPoint::new(100, 100)));
    assert!(!state.was_dragging);
    assert_eq!(touch.diagnostics().last_fault, Some(FaultKind::OutOfRange));
}

#[test]
fn sample_reports_typed_errors() {
    let clock = ManualClock::new(0);
    let mut touch = driver(&clock, identity_config().with_orientation(true, true));

    touch.bus_mut().push(BusFrame::faulted(FaultStage::Status)).unwrap();
    assert_eq!(
        touch.sample(),
        Err(TouchError::Bus(ReplayFault::Injected(FaultStage::Status)))
    );

    touch.bus_mut().push(BusFrame::raw(0x87, 0, 0)).unwrap();
    assert_eq!(touch.sample(), Err(TouchError::TooManyPoints(7)));

    // Swapped: raw x becomes display y, and 240 rows fit.
    touch.bus_mut().push(BusFrame::pressed(240, 10)).unwrap();
    assert_eq!(touch.sample(), Err(TouchError::OutOfRange { x: 240, y: 10 }));

    touch.bus_mut().push(BusFrame::pressed(10, 300)).unwrap();
    assert_eq!(touch.sample(), Ok(Some(TouchPoint::new(300, 229))));

    touch.bus_mut().push(BusFrame::released()).unwrap();
    assert_eq!(touch.sample(), Ok(None));
    assert_eq!(touch.diagnostics().total_faults(), 3);
    assert!(!touch.gesture_state().pressed);
}

#[test]
fn product_id_reads_controller_identity() {
    let clock = ManualClock::new(0);
    let mut touch = driver(&clock, identity_config());
    assert_eq!(touch.product_id(), Ok(*b"911\0"));
    assert_eq!(touch.address(), GT911_ADDRESS);
}

#[derive(Default)]
struct Journal(RefCell<std::vec::Vec<&'static str>>);

struct JournalPin<'a>(&'a Journal);

impl ErrorType for JournalPin<'_> {
    type Error = Infallible;
}

impl OutputPin for JournalPin<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0 .0.borrow_mut().push("low");
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0 .0.borrow_mut().push("high");
        Ok(())
    }
}

struct JournalDelay<'a>(&'a Journal);

impl DelayNs for JournalDelay<'_> {
    fn delay_ns(&mut self, _ns: u32) {
        self.0 .0.borrow_mut().push("wait");
    }
}

struct BrokenPin;

impl ErrorType for BrokenPin {
    type Error = ErrorKind;
}

impl OutputPin for BrokenPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Err(ErrorKind::Other)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Err(ErrorKind::Other)
    }
}

#[test]
fn with_lines_pulses_reset_and_keeps_interrupt_line() {
    let journal = Journal::default();
    let clock = ManualClock::new(0);
    let lines = TouchLines {
        interrupt: Some(NoPin),
        reset: Some(JournalPin(&journal)),
    };
    let mut touch = TouchDriver::with_lines(
        ReplayBus::<4>::new(GT911_ADDRESS),
        &clock,
        identity_config(),
        lines,
        &mut JournalDelay(&journal),
    )
    .unwrap();

    let log = journal.0.borrow();
    assert_eq!(log.first(), Some(&"low"));
    let high_at = log.iter().position(|e| *e == "high").unwrap();
    assert!(log[1..high_at].iter().all(|e| *e == "wait"));
    assert!(high_at > 1);
    assert!(log[high_at + 1..].iter().all(|e| *e == "wait"));
    assert!(log.len() > high_at + 1);

    assert!(touch.interrupt_line_mut().is_some());
    assert_eq!(touch.bus_mut().status_reads(), 0);
}

#[test]
fn reset_line_failure_is_reported() {
    let clock = ManualClock::new(0);
    let lines = TouchLines {
        interrupt: None::<NoPin>,
        reset: Some(BrokenPin),
    };
    let result = TouchDriver::with_lines(
        ReplayBus::<4>::new(GT911_ADDRESS),
        &clock,
        identity_config(),
        lines,
        &mut JournalDelay(&Journal::default()),
    );
    assert!(matches!(result, Err(TouchError::ResetLine(ErrorKind::Other))));
}

#[test]
fn release_returns_the_parts() {
    let clock = ManualClock::new(0);
    let touch = driver(&clock, identity_config());
    let (bus, _clock, interrupt) = touch.release();
    assert_eq!(bus.remaining(), 0);
    assert!(interrupt.is_none());
}
