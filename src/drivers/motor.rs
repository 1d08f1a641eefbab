//! Deck motor driver (DRV8871 H-bridge).
//!
//! One PWM duty output plus two direction inputs: IN1 high / IN2 low drives
//! the deck toward the close end-stop, IN1 low / IN2 high toward the open
//! end-stop, both low coasts.
//!
//! ## Safety contract
//!
//! The motor must never be commanded into an asserted end-stop; that is
//! enforced by the deck service and the safety supervisor — this driver is a
//! dumb actuator.  The one exception is [`failsafe_stop`], the ISR-side
//! emergency path that cuts power at hardware speed without waiting for the
//! control loop.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real PWM and GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::drivers::hw_init;
use crate::error::MotorError;
use crate::pins;

/// Drive direction.  Exactly two values exist; a raw code from any external
/// source must go through `TryFrom<u8>`, which rejects everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Close,
    Open,
}

impl TryFrom<u8> for Direction {
    type Error = MotorError;

    fn try_from(raw: u8) -> Result<Self, MotorError> {
        match raw {
            0 => Ok(Self::Close),
            1 => Ok(Self::Open),
            other => Err(MotorError::InvalidDirection(other)),
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Close => write!(f, "close"),
            Self::Open => write!(f, "open"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Stopped,
    Running { duty: u16, dir: Direction },
}

pub struct MotorDriver {
    state: MotorState,
    /// Mirrors of the hardware lines, kept for introspection and host tests.
    hw_in1: bool,
    hw_in2: bool,
    hw_duty: u16,
}

impl MotorDriver {
    pub fn new() -> Self {
        Self {
            state: MotorState::Stopped,
            hw_in1: false,
            hw_in2: false,
            hw_duty: 0,
        }
    }

    /// Energize the motor toward `dir` at `duty`.
    ///
    /// Idempotent while running: a repeat command in the current direction
    /// does not touch the hardware again (drive strength is fixed per
    /// direction, so there is nothing to update).  A direction change goes
    /// through a full stop first — the H-bridge inputs must never be high
    /// simultaneously.
    pub fn start(&mut self, dir: Direction, duty: u16) {
        if let MotorState::Running { dir: current, .. } = self.state {
            if current == dir {
                return;
            }
            self.stop();
        }
        if duty == 0 {
            self.stop();
            return;
        }

        match dir {
            Direction::Close => self.set_lines_hw(true, false),
            Direction::Open => self.set_lines_hw(false, true),
        }
        self.set_duty_hw(duty);
        self.state = MotorState::Running { duty, dir };
    }

    /// Unconditionally de-energize: duty zero, both direction lines low.
    /// Idempotent — re-asserts the off state even when already stopped.
    pub fn stop(&mut self) {
        self.set_duty_hw(0);
        self.set_lines_hw(false, false);
        self.state = MotorState::Stopped;
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.state, MotorState::Stopped)
    }

    pub fn current_duty(&self) -> u16 {
        self.hw_duty
    }

    /// Current (IN1, IN2) levels as last written.
    pub fn lines(&self) -> (bool, bool) {
        (self.hw_in1, self.hw_in2)
    }

    // ── Internal ──────────────────────────────────────────────

    fn set_lines_hw(&mut self, in1: bool, in2: bool) {
        hw_init::gpio_write(pins::MOTOR_IN1_GPIO, in1);
        hw_init::gpio_write(pins::MOTOR_IN2_GPIO, in2);
        self.hw_in1 = in1;
        self.hw_in2 = in2;
    }

    fn set_duty_hw(&mut self, duty: u16) {
        hw_init::ledc_set(hw_init::LEDC_CH_MOTOR, duty);
        self.hw_duty = duty;
    }
}

// ── ISR failsafe stop ─────────────────────────────────────────
//
// The limit-switch ISRs call this directly: power is cut within the
// interrupt latency window, independent of the control tick cadence.  The
// driver's in-memory state is intentionally left alone — the main loop
// consumes the flag via `take_stop_request()` and reconciles through the
// normal `stop()` path.

static FAILSAFE_STOP: AtomicBool = AtomicBool::new(false);

/// Cut motor power immediately.  Safe to call from interrupt context
/// (raw register writes plus a lock-free atomic store).
pub fn failsafe_stop() {
    hw_init::gpio_write(pins::MOTOR_IN1_GPIO, false);
    hw_init::gpio_write(pins::MOTOR_IN2_GPIO, false);
    hw_init::ledc_set(hw_init::LEDC_CH_MOTOR, 0);
    FAILSAFE_STOP.store(true, Ordering::Release);
}

/// Consume a pending failsafe-stop request.  Called from the main loop;
/// returns `true` at most once per `failsafe_stop()`.
pub fn take_stop_request() -> bool {
    FAILSAFE_STOP.swap(false, Ordering::AcqRel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_direction_code_is_rejected() {
        assert!(matches!(
            Direction::try_from(2),
            Err(MotorError::InvalidDirection(2))
        ));
        assert_eq!(Direction::try_from(0).unwrap(), Direction::Close);
        assert_eq!(Direction::try_from(1).unwrap(), Direction::Open);
    }

    #[test]
    fn start_sets_exactly_one_line() {
        let mut m = MotorDriver::new();
        m.start(Direction::Close, 10_000);
        assert_eq!(m.lines(), (true, false));
        assert_eq!(m.current_duty(), 10_000);

        m.stop();
        m.start(Direction::Open, 12_000);
        assert_eq!(m.lines(), (false, true));
        assert_eq!(m.current_duty(), 12_000);
    }

    #[test]
    fn start_is_idempotent_while_running() {
        let mut m = MotorDriver::new();
        m.start(Direction::Close, 10_000);
        let before = m.state();
        // Repeat commands must not re-issue the begin-energizing sequence.
        m.start(Direction::Close, 10_000);
        m.start(Direction::Close, 55_555);
        assert_eq!(m.state(), before);
        assert_eq!(m.current_duty(), 10_000);
    }

    #[test]
    fn direction_change_passes_through_stop() {
        let mut m = MotorDriver::new();
        m.start(Direction::Close, 10_000);
        m.start(Direction::Open, 10_000);
        // End state is a clean open drive; never both lines high.
        assert_eq!(m.lines(), (false, true));
        assert!(matches!(
            m.state(),
            MotorState::Running {
                dir: Direction::Open,
                ..
            }
        ));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut m = MotorDriver::new();
        m.start(Direction::Open, 10_000);
        m.stop();
        let after_first = (m.state(), m.lines(), m.current_duty());
        m.stop();
        assert_eq!((m.state(), m.lines(), m.current_duty()), after_first);
        assert_eq!(m.current_duty(), 0);
        assert_eq!(m.lines(), (false, false));
    }

    #[test]
    fn zero_duty_start_is_a_stop() {
        let mut m = MotorDriver::new();
        m.start(Direction::Close, 0);
        assert!(!m.is_running());
        assert_eq!(m.lines(), (false, false));
    }

    #[test]
    fn failsafe_flag_is_consumed_once() {
        failsafe_stop();
        assert!(take_stop_request());
        assert!(!take_stop_request());
    }
}
