//! Simple on/off GPIO LED driver.
//!
//! Two instances exist: the status/heartbeat LED toggled by the main loop,
//! and the activity LED toggled each tick while the deck is in motion.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives a GPIO output via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct StatusLed {
    gpio: i32,
    lit: bool,
}

impl StatusLed {
    pub fn new(gpio: i32) -> Self {
        Self { gpio, lit: false }
    }

    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(self.gpio, on);
        self.lit = on;
    }

    pub fn toggle(&mut self) {
        let next = !self.lit;
        self.set(next);
    }

    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
