//! Safety supervisor.
//!
//! The supervisor runs **every tick before the FSM** and accumulates a
//! fault bitmask in `DeckContext.fault_flags`.  The FSM state handlers
//! check this mask to decide whether to transition to `Error`.
//!
//! ## Fault lifecycle
//!
//! 1. A condition triggers a fault (e.g. both limit switches asserted).
//! 2. The supervisor sets the corresponding bit in `fault_flags`.
//! 3. The FSM transitions to `Error`; `error_enter` de-energizes the motor.
//! 4. Each tick in `Error`, the supervisor re-evaluates.
//! 5. When `fault_flags == 0`, the `Error` update handler returns to `Idle`.
//!
//! `LimitContradiction` self-clears when the switches disagree again.
//! `DriveTimeout` is **latched**: once the motor has been commanded for
//! longer than the configured maximum without reaching an end-stop, the
//! mechanism is assumed jammed and the fault holds until an explicit
//! `ClearFaults` command — the supervisor must not let the arbiter retry
//! the same doomed drive every timeout period.

use crate::config::DeckConfig;
use crate::error::SafetyFault;
use crate::fsm::context::SwitchSnapshot;
use log::{error, info};

/// Safety supervisor.
pub struct SafetySupervisor {
    /// Latched fault bitmask.
    faults: u8,
    /// Whether the motor is currently commanded on (set by the service).
    motor_commanded: bool,
    /// Drive watchdog threshold in ticks; 0 disables the check.
    max_drive_ticks: u32,
    /// Ticks since the motor was last commanded on.
    drive_ticks: u32,
}

impl SafetySupervisor {
    pub fn new(config: &DeckConfig) -> Self {
        Self {
            faults: 0,
            motor_commanded: false,
            max_drive_ticks: u32::from(config.max_drive_secs)
                .saturating_mul(1000)
                / config.control_loop_interval_ms,
            drive_ticks: 0,
        }
    }

    /// Inform the supervisor whether the motor is currently commanded on.
    pub fn set_motor_commanded(&mut self, on: bool) {
        if on && !self.motor_commanded {
            self.drive_ticks = 0; // Reset the watchdog on a fresh drive
        }
        self.motor_commanded = on;
    }

    /// Evaluate all safety conditions against the latest switch snapshot.
    /// Returns the updated fault bitmask.
    pub fn evaluate(&mut self, snap: &SwitchSnapshot) -> u8 {
        // ── Limit contradiction ───────────────────────────────────
        self.eval_fault(
            SafetyFault::LimitContradiction,
            snap.at_close_limit && snap.at_open_limit,
        );

        // ── Drive watchdog ────────────────────────────────────────
        if self.motor_commanded {
            self.drive_ticks = self.drive_ticks.saturating_add(1);
            if self.max_drive_ticks > 0 && self.drive_ticks > self.max_drive_ticks {
                self.latch_fault(SafetyFault::DriveTimeout);
            }
        } else {
            self.drive_ticks = 0;
        }

        self.faults
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    /// True if **any** fault is active.
    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    /// Check if a specific fault is active.
    pub fn has_fault(&self, fault: SafetyFault) -> bool {
        self.faults & fault.mask() != 0
    }

    /// Drop every latched fault.  Self-clearing conditions re-assert on the
    /// next `evaluate` if they still hold.
    pub fn clear_latched(&mut self) {
        if self.faults != 0 {
            info!("Latched safety faults cleared by command");
        }
        self.faults = 0;
        self.drive_ticks = 0;
    }

    // ── Internal ──────────────────────────────────────────────────

    /// Set or clear a fault bit based on a boolean condition.
    fn eval_fault(&mut self, fault: SafetyFault, condition: bool) {
        if condition {
            self.latch_fault(fault);
        } else {
            if self.faults & fault.mask() != 0 {
                info!("SAFETY FAULT CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }

    /// Set a fault bit without a clearing condition.
    fn latch_fault(&mut self, fault: SafetyFault) {
        if self.faults & fault.mask() == 0 {
            error!("SAFETY FAULT SET: {fault}");
        }
        self.faults |= fault.mask();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(close: bool, open: bool) -> SwitchSnapshot {
        SwitchSnapshot {
            at_close_limit: close,
            at_open_limit: open,
            ..SwitchSnapshot::default()
        }
    }

    fn make_supervisor() -> SafetySupervisor {
        // 250 ms ticks, 1 s watchdog → 4 ticks of grace.
        let config = DeckConfig {
            max_drive_secs: 1,
            ..DeckConfig::default()
        };
        SafetySupervisor::new(&config)
    }

    #[test]
    fn no_faults_on_sane_inputs() {
        let mut sup = make_supervisor();
        assert_eq!(sup.evaluate(&snapshot(false, false)), 0);
        assert_eq!(sup.evaluate(&snapshot(true, false)), 0);
        assert_eq!(sup.evaluate(&snapshot(false, true)), 0);
    }

    #[test]
    fn contradiction_sets_and_self_clears() {
        let mut sup = make_supervisor();
        let faults = sup.evaluate(&snapshot(true, true));
        assert_ne!(faults & SafetyFault::LimitContradiction.mask(), 0);

        let faults = sup.evaluate(&snapshot(true, false));
        assert_eq!(faults, 0, "contradiction clears once switches disagree");
    }

    #[test]
    fn drive_timeout_latches_after_threshold() {
        let mut sup = make_supervisor();
        sup.set_motor_commanded(true);
        for _ in 0..4 {
            assert_eq!(sup.evaluate(&snapshot(false, false)), 0);
        }
        let faults = sup.evaluate(&snapshot(false, false));
        assert!(faults & SafetyFault::DriveTimeout.mask() != 0);
    }

    #[test]
    fn drive_timeout_stays_latched_after_motor_stops() {
        let mut sup = make_supervisor();
        sup.set_motor_commanded(true);
        for _ in 0..5 {
            sup.evaluate(&snapshot(false, false));
        }
        assert!(sup.has_fault(SafetyFault::DriveTimeout));

        sup.set_motor_commanded(false);
        sup.evaluate(&snapshot(false, false));
        assert!(
            sup.has_fault(SafetyFault::DriveTimeout),
            "timeout must not silently clear when the motor is stopped"
        );

        sup.clear_latched();
        assert!(!sup.has_faults());
    }

    #[test]
    fn fresh_drive_resets_the_watchdog() {
        let mut sup = make_supervisor();
        sup.set_motor_commanded(true);
        for _ in 0..3 {
            sup.evaluate(&snapshot(false, false));
        }
        sup.set_motor_commanded(false);
        sup.evaluate(&snapshot(false, false));
        sup.set_motor_commanded(true);
        for _ in 0..4 {
            assert_eq!(sup.evaluate(&snapshot(false, false)), 0);
        }
    }

    #[test]
    fn watchdog_disabled_when_zero() {
        let config = DeckConfig {
            max_drive_secs: 0,
            ..DeckConfig::default()
        };
        let mut sup = SafetySupervisor::new(&config);
        sup.set_motor_commanded(true);
        for _ in 0..10_000 {
            assert_eq!(sup.evaluate(&snapshot(false, false)), 0);
        }
    }
}
