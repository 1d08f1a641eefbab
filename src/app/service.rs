//! Deck service — the hexagonal core.
//!
//! [`DeckService`] owns the FSM, the mode arbiter (inside the context) and
//! the safety supervisor.  It exposes a clean, hardware-agnostic API.  All
//! I/O flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!  SwitchPort ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!                 │       DeckService        │
//!  MotorPort ◀────│  FSM · Arbiter · Safety  │
//!                 └─────────────────────────┘
//! ```
//!
//! Every mutation — whether it originates in the periodic tick or in an
//! edge-triggered ISR — goes through this service.  ISRs themselves only
//! push events and flip the failsafe atomic; the main loop routes the
//! drained events into [`handle_command`](DeckService::handle_command),
//! [`handle_limit_edge`](DeckService::handle_limit_edge) and
//! [`request_stop`](DeckService::request_stop).

use log::{info, warn};

use crate::config::DeckConfig;
use crate::fsm::context::DeckContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::safety::SafetySupervisor;

use super::commands::DeckCommand;
use super::events::{DeckEvent, TelemetryData};
use super::ports::{EventSink, MotorPort, SwitchPort};

// ───────────────────────────────────────────────────────────────
// DeckService
// ───────────────────────────────────────────────────────────────

/// The deck service orchestrates all domain logic.
pub struct DeckService {
    fsm: Fsm,
    ctx: DeckContext,
    safety: SafetySupervisor,
    tick_count: u64,
    /// Fault mask observed on the previous tick (for FaultCleared edges).
    prev_faults: u8,
    /// A stop was requested since the last tick (limit edge, failsafe
    /// atomic, or Stop command).  Consumed by the next `tick`.
    pending_stop: bool,
}

impl DeckService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: DeckConfig) -> Self {
        let safety = SafetySupervisor::new(&config);
        let ctx = DeckContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Idle);

        Self {
            fsm,
            ctx,
            safety,
            tick_count: 0,
            prev_faults: 0,
            pending_stop: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in its default initial state (Idle).
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&DeckEvent::Started(self.fsm.current_state()));
        info!("DeckService started in {:?}", self.fsm.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: read switches → safety → FSM → motor.
    ///
    /// The `hw` parameter satisfies **both** [`SwitchPort`] and
    /// [`MotorPort`] — this avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn tick(&mut self, hw: &mut (impl SwitchPort + MotorPort), sink: &mut impl EventSink) {
        self.tick_count += 1;
        let prev_state = self.fsm.current_state();

        // 1. Read switch levels via SwitchPort
        let snapshot = hw.read_all();
        self.ctx.switches = snapshot;

        // 2. Hand any asynchronous stop to the FSM for this tick
        self.ctx.stop_requested = self.pending_stop;
        self.pending_stop = false;

        // 3. Safety evaluation
        self.safety
            .set_motor_commanded(self.ctx.commands.motor_duty > 0);
        let faults = self.safety.evaluate(&snapshot);
        self.ctx.fault_flags = faults;

        if faults != 0 && self.fsm.current_state() != StateId::Error {
            warn!("Safety fault! flags=0b{:08b}", faults);
            self.fsm.force_transition(StateId::Error, &mut self.ctx);
            sink.emit(&DeckEvent::FaultDetected(faults));
        }
        if faults == 0 && self.prev_faults != 0 {
            sink.emit(&DeckEvent::FaultCleared);
        }
        self.prev_faults = faults;

        // 4. FSM tick (pure state logic)
        self.fsm.tick(&mut self.ctx);
        self.ctx.stop_requested = false;

        // 5. Apply motor commands via MotorPort
        self.apply_actuators(hw);

        // 6. Emit state change if the FSM moved
        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&DeckEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    // ── Asynchronous entry points (fed from drained ISR events) ───

    /// A limit-switch rising edge was delivered.  The ISR already cut power
    /// at hardware speed; here the logical state catches up: de-energize
    /// again through the port (idempotent) and end any in-progress drive on
    /// the next tick.
    pub fn handle_limit_edge(&mut self, hw: &mut impl MotorPort) {
        hw.stop_motor();
        self.pending_stop = true;
    }

    /// Request that any in-progress drive ends on the next tick.
    /// Safe to call at any time; a stale request is consumed by the tick
    /// that observes it.
    pub fn request_stop(&mut self) {
        self.pending_stop = true;
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (from the trigger ISRs or a debug
    /// console).  Manual moves preempt the automatic decision and any
    /// in-progress drive.
    pub fn handle_command(
        &mut self,
        cmd: DeckCommand,
        hw: &mut impl MotorPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            DeckCommand::ForceClose => {
                self.ctx.arbiter.engage_manual();
                self.force_drive(StateId::Closing, self.ctx.switches.at_close_limit, hw, sink);
            }
            DeckCommand::ForceOpen => {
                self.ctx.arbiter.engage_manual();
                self.force_drive(StateId::Opening, self.ctx.switches.at_open_limit, hw, sink);
            }
            DeckCommand::Stop => {
                // Unconditional de-energize now, and end the drive state on
                // the next tick.
                hw.stop_motor();
                self.pending_stop = true;
            }
            DeckCommand::ResetManualOverride => {
                self.ctx.arbiter.reset();
            }
            DeckCommand::ClearFaults => {
                self.safety.clear_latched();
                self.ctx.fault_flags = self.safety.faults();
            }
            DeckCommand::ForceState(target) => {
                let prev = self.fsm.current_state();
                self.fsm.force_transition(target, &mut self.ctx);
                self.apply_actuators(hw);
                if target != prev {
                    sink.emit(&DeckEvent::StateChanged {
                        from: prev,
                        to: target,
                    });
                }
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            state: self.fsm.current_state(),
            at_close_limit: self.ctx.switches.at_close_limit,
            at_open_limit: self.ctx.switches.at_open_limit,
            linked_power: self.ctx.switches.linked_power,
            manual_control: self.ctx.arbiter.is_manual(),
            motor_duty: self.ctx.commands.motor_duty,
            toward_open: self.ctx.commands.toward_open,
            fault_flags: self.ctx.fault_flags,
        }
    }

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Whether a manual trigger has taken control authority.
    pub fn is_manual(&self) -> bool {
        self.ctx.arbiter.is_manual()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Current active fault bitmask (0 = no faults).
    pub fn fault_flags(&self) -> u8 {
        self.ctx.fault_flags
    }

    // ── Internal ──────────────────────────────────────────────

    /// Force-transition into a drive state unless the deck already rests on
    /// the target end-stop (the move would fight the mechanism for nothing).
    fn force_drive(
        &mut self,
        target: StateId,
        at_target_limit: bool,
        hw: &mut impl MotorPort,
        sink: &mut impl EventSink,
    ) {
        if at_target_limit {
            info!("Manual {:?} ignored: already at end-stop", target);
            return;
        }
        let prev = self.fsm.current_state();
        if prev == target {
            return; // already driving that way
        }
        self.fsm.force_transition(target, &mut self.ctx);
        self.apply_actuators(hw);
        sink.emit(&DeckEvent::StateChanged {
            from: prev,
            to: target,
        });
    }

    /// Translate FSM motor commands into port calls.
    ///
    /// The limit re-check here runs on **every** apply while the motor is
    /// commanded on, not just once at drive start — a drive command whose
    /// matching end-stop is already asserted becomes a stop.
    fn apply_actuators(&self, hw: &mut impl MotorPort) {
        let cmds = &self.ctx.commands;
        let snap = &self.ctx.switches;

        // ── Motor ─────────────────────────────────────────────
        if cmds.motor_duty > 0 && !self.safety.has_faults() {
            let at_target = if cmds.toward_open {
                snap.at_open_limit
            } else {
                snap.at_close_limit
            };
            if at_target {
                hw.stop_motor();
            } else {
                hw.drive_motor(cmds.motor_duty, cmds.toward_open);
            }
        } else {
            hw.stop_motor();
        }

        // ── Activity LED ──────────────────────────────────────
        if cmds.activity_blink {
            hw.toggle_activity_led();
        } else {
            hw.set_activity_led(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::{MotorPort, SwitchPort};
    use crate::fsm::context::SwitchSnapshot;

    struct NullHw {
        snapshot: SwitchSnapshot,
        running: bool,
    }

    impl SwitchPort for NullHw {
        fn read_all(&mut self) -> SwitchSnapshot {
            self.snapshot
        }
    }

    impl MotorPort for NullHw {
        fn drive_motor(&mut self, _duty: u16, _toward_open: bool) {
            self.running = true;
        }
        fn stop_motor(&mut self) {
            self.running = false;
        }
        fn is_motor_running(&self) -> bool {
            self.running
        }
        fn set_activity_led(&mut self, _on: bool) {}
        fn toggle_activity_led(&mut self) {}
        fn set_status_led(&mut self, _on: bool) {}
        fn all_off(&mut self) {
            self.running = false;
        }
    }

    struct NullSink;
    impl crate::app::ports::EventSink for NullSink {
        fn emit(&mut self, _event: &DeckEvent) {}
    }

    #[test]
    fn telemetry_reflects_manual_mode() {
        let mut svc = DeckService::new(DeckConfig::default());
        let mut hw = NullHw {
            snapshot: SwitchSnapshot::default(),
            running: false,
        };
        let mut sink = NullSink;
        svc.start(&mut sink);

        assert!(!svc.build_telemetry().manual_control);
        svc.handle_command(DeckCommand::ForceClose, &mut hw, &mut sink);
        assert!(svc.build_telemetry().manual_control);
    }

    #[test]
    fn stop_command_cuts_power_immediately() {
        let mut svc = DeckService::new(DeckConfig::default());
        let mut hw = NullHw {
            snapshot: SwitchSnapshot::default(),
            running: false,
        };
        let mut sink = NullSink;
        svc.start(&mut sink);

        svc.handle_command(DeckCommand::ForceOpen, &mut hw, &mut sink);
        assert!(hw.running);

        svc.handle_command(DeckCommand::Stop, &mut hw, &mut sink);
        assert!(!hw.running, "Stop must de-energize without waiting for a tick");
    }
}
