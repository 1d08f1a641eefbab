//! Binary switch inputs: limit switches, linked-power sense, triggers.
//!
//! All five inputs are plain GPIO levels (pull-down, active high).  Rising
//! edges additionally raise interrupts — registered in `hw_init` — but the
//! levels are re-read here every control tick, so the polling path never
//! depends on having seen the edge.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads real GPIO levels via hw_init helpers.
//! On host/test: reads sim atomics set by the `sim_set_*` functions.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::fsm::context::SwitchSnapshot;
use crate::pins;

static SIM_LIMIT_CLOSE: AtomicBool = AtomicBool::new(false);
static SIM_LIMIT_OPEN: AtomicBool = AtomicBool::new(false);
static SIM_LINKED_POWER: AtomicBool = AtomicBool::new(false);
static SIM_TRIGGER_CLOSE: AtomicBool = AtomicBool::new(false);
static SIM_TRIGGER_OPEN: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_limit_close(asserted: bool) {
    SIM_LIMIT_CLOSE.store(asserted, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_limit_open(asserted: bool) {
    SIM_LIMIT_OPEN.store(asserted, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_linked_power(asserted: bool) {
    SIM_LINKED_POWER.store(asserted, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_trigger_close(asserted: bool) {
    SIM_TRIGGER_CLOSE.store(asserted, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_trigger_open(asserted: bool) {
    SIM_TRIGGER_OPEN.store(asserted, Ordering::Relaxed);
}

pub struct SwitchBank {
    last: SwitchSnapshot,
}

impl SwitchBank {
    pub fn new() -> Self {
        Self {
            last: SwitchSnapshot::default(),
        }
    }

    /// Read every input level and return a unified snapshot.
    pub fn read_all(&mut self) -> SwitchSnapshot {
        self.last = SwitchSnapshot {
            at_close_limit: Self::read(pins::LIMIT_CLOSE_GPIO, &SIM_LIMIT_CLOSE),
            at_open_limit: Self::read(pins::LIMIT_OPEN_GPIO, &SIM_LIMIT_OPEN),
            linked_power: Self::read(pins::LINKED_POWER_GPIO, &SIM_LINKED_POWER),
            trigger_close: Self::read(pins::TRIGGER_CLOSE_GPIO, &SIM_TRIGGER_CLOSE),
            trigger_open: Self::read(pins::TRIGGER_OPEN_GPIO, &SIM_TRIGGER_OPEN),
        };
        self.last
    }

    /// The most recent snapshot without touching the hardware.
    pub fn last(&self) -> SwitchSnapshot {
        self.last
    }

    #[cfg(target_os = "espidf")]
    fn read(gpio: i32, _sim: &AtomicBool) -> bool {
        crate::drivers::hw_init::gpio_read(gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read(_gpio: i32, sim: &AtomicBool) -> bool {
        sim.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_tracks_sim_levels() {
        let mut bank = SwitchBank::new();
        sim_set_limit_close(false);
        sim_set_limit_open(false);
        sim_set_linked_power(true);
        sim_set_trigger_close(false);
        sim_set_trigger_open(false);

        let snap = bank.read_all();
        assert!(!snap.at_close_limit);
        assert!(snap.linked_power);

        sim_set_limit_close(true);
        sim_set_linked_power(false);
        let snap = bank.read_all();
        assert!(snap.at_close_limit);
        assert!(!snap.linked_power);
        assert_eq!(bank.last().at_close_limit, snap.at_close_limit);
    }
}
