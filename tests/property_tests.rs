//! Property tests for the motor driver and the full control chain.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32
//! targets.  On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use deckdrive::app::ports::{EventSink, MotorPort, SwitchPort};
use deckdrive::app::service::DeckService;
use deckdrive::config::DeckConfig;
use deckdrive::drivers::motor::{Direction, MotorDriver, MotorState};
use deckdrive::error::MotorError;
use deckdrive::fsm::context::SwitchSnapshot;
use proptest::prelude::*;

// ── Motor driver invariants ───────────────────────────────────

#[derive(Debug, Clone)]
enum MotorOp {
    Start { dir_code: u8, duty: u16 },
    Stop,
}

fn arb_motor_op() -> impl Strategy<Value = MotorOp> {
    prop_oneof![
        (0u8..=3, any::<u16>()).prop_map(|(dir_code, duty)| MotorOp::Start { dir_code, duty }),
        Just(MotorOp::Stop),
    ]
}

proptest! {
    /// Under any sequence of start/stop operations the H-bridge lines and
    /// duty stay consistent with the logical state: running means exactly
    /// one direction line high and a nonzero duty; stopped means both lines
    /// low and zero duty.  Both lines high is never reachable.
    #[test]
    fn motor_lines_always_consistent(ops in proptest::collection::vec(arb_motor_op(), 1..50)) {
        let mut m = MotorDriver::new();

        for op in ops {
            match op {
                MotorOp::Start { dir_code, duty } => match Direction::try_from(dir_code) {
                    Ok(dir) => m.start(dir, duty),
                    Err(MotorError::InvalidDirection(raw)) => {
                        prop_assert_eq!(raw, dir_code);
                    }
                    Err(e) => prop_assert!(false, "unexpected error: {:?}", e),
                },
                MotorOp::Stop => m.stop(),
            }

            let (in1, in2) = m.lines();
            prop_assert!(!(in1 && in2), "H-bridge shoot-through");
            match m.state() {
                MotorState::Running { .. } => {
                    prop_assert!(in1 ^ in2, "running needs exactly one line");
                    prop_assert!(m.current_duty() > 0);
                }
                MotorState::Stopped => {
                    prop_assert!(!in1 && !in2);
                    prop_assert_eq!(m.current_duty(), 0);
                }
            }
        }
    }

    /// Every raw direction code outside {0, 1} is rejected and leaves the
    /// motor untouched.
    #[test]
    fn unknown_direction_codes_never_start_the_motor(raw in 2u8..) {
        let mut m = MotorDriver::new();
        match Direction::try_from(raw) {
            Err(MotorError::InvalidDirection(code)) => prop_assert_eq!(code, raw),
            other => prop_assert!(false, "code {} must be rejected, got {:?}", raw, other),
        }
        prop_assert_eq!(m.state(), MotorState::Stopped);
        m.stop();
        prop_assert_eq!(m.current_duty(), 0);
    }
}

// ── Full control chain invariants ─────────────────────────────

struct PropHw {
    snapshot: SwitchSnapshot,
    duty: u16,
    toward_open: bool,
}

impl SwitchPort for PropHw {
    fn read_all(&mut self) -> SwitchSnapshot {
        self.snapshot
    }
}

impl MotorPort for PropHw {
    fn drive_motor(&mut self, duty: u16, toward_open: bool) {
        self.duty = duty;
        self.toward_open = toward_open;
    }
    fn stop_motor(&mut self) {
        self.duty = 0;
    }
    fn is_motor_running(&self) -> bool {
        self.duty > 0
    }
    fn set_activity_led(&mut self, _on: bool) {}
    fn toggle_activity_led(&mut self) {}
    fn set_status_led(&mut self, _on: bool) {}
    fn all_off(&mut self) {
        self.duty = 0;
    }
}

struct NullSink;
impl EventSink for NullSink {
    fn emit(&mut self, _event: &deckdrive::app::events::DeckEvent) {}
}

fn arb_levels() -> impl Strategy<Value = (bool, bool, bool)> {
    (any::<bool>(), any::<bool>(), any::<bool>())
}

proptest! {
    /// For any sequence of switch levels, after every control tick the
    /// motor is never left energized toward an asserted end-stop, and a
    /// limit contradiction always leaves it de-energized.
    #[test]
    fn motor_never_energized_into_an_asserted_limit(
        levels in proptest::collection::vec(arb_levels(), 1..80)
    ) {
        let mut svc = DeckService::new(DeckConfig::default());
        let mut hw = PropHw {
            snapshot: SwitchSnapshot::default(),
            duty: 0,
            toward_open: false,
        };
        let mut sink = NullSink;
        svc.start(&mut sink);

        for (close, open, power) in levels {
            hw.snapshot.at_close_limit = close;
            hw.snapshot.at_open_limit = open;
            hw.snapshot.linked_power = power;
            svc.tick(&mut hw, &mut sink);

            if close && open {
                prop_assert_eq!(hw.duty, 0, "contradiction must stop the motor");
            }
            if hw.duty > 0 {
                if hw.toward_open {
                    prop_assert!(!open, "driving open into the open limit");
                } else {
                    prop_assert!(!close, "driving closed into the close limit");
                }
            }
        }
    }
}
