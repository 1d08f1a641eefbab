//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SwitchBank`] and all actuator drivers, exposing them through
//! [`SwitchPort`] and [`MotorPort`].  Together with the ISR registrations
//! in `hw_init`, this is the only code in the system that touches actual
//! hardware.  On non-espidf targets, the underlying drivers use cfg-gated
//! simulation stubs.

use crate::app::ports::{MotorPort, SwitchPort};
use crate::drivers::motor::{Direction, MotorDriver};
use crate::drivers::status_led::StatusLed;
use crate::drivers::switches::SwitchBank;
use crate::fsm::context::SwitchSnapshot;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    switches: SwitchBank,
    motor: MotorDriver,
    activity_led: StatusLed,
    status_led: StatusLed,
}

impl HardwareAdapter {
    pub fn new(
        switches: SwitchBank,
        motor: MotorDriver,
        activity_led: StatusLed,
        status_led: StatusLed,
    ) -> Self {
        Self {
            switches,
            motor,
            activity_led,
            status_led,
        }
    }
}

// ── SwitchPort implementation ─────────────────────────────────

impl SwitchPort for HardwareAdapter {
    fn read_all(&mut self) -> SwitchSnapshot {
        self.switches.read_all()
    }
}

// ── MotorPort implementation ──────────────────────────────────

impl MotorPort for HardwareAdapter {
    fn drive_motor(&mut self, duty: u16, toward_open: bool) {
        let dir = if toward_open {
            Direction::Open
        } else {
            Direction::Close
        };
        self.motor.start(dir, duty);
    }

    fn stop_motor(&mut self) {
        self.motor.stop();
    }

    fn is_motor_running(&self) -> bool {
        self.motor.is_running()
    }

    fn set_activity_led(&mut self, on: bool) {
        self.activity_led.set(on);
    }

    fn toggle_activity_led(&mut self) {
        self.activity_led.toggle();
    }

    fn set_status_led(&mut self, on: bool) {
        self.status_led.set(on);
    }

    fn all_off(&mut self) {
        self.motor.stop();
        self.activity_led.off();
        self.status_led.off();
    }
}
