//! Shared mutable context threaded through every FSM handler.
//!
//! `DeckContext` is the single struct that state handlers read from and
//! write to.  It contains the latest switch snapshot, motor command
//! outputs, timing information, configuration, the mode arbiter, and
//! accumulated safety faults.  Think of it as the "blackboard" in a
//! blackboard architecture.

use crate::arbiter::ModeArbiter;
use crate::config::DeckConfig;

// ---------------------------------------------------------------------------
// Switch snapshot (read-only to state handlers; written by the service)
// ---------------------------------------------------------------------------

/// A point-in-time snapshot of every binary input in the system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwitchSnapshot {
    /// Close-limit switch: deck is fully retracted.
    pub at_close_limit: bool,
    /// Open-limit switch: deck is fully extended.
    pub at_open_limit: bool,
    /// Linked-power sense: the host device is powered/docked.
    pub linked_power: bool,
    /// Close-trigger button level.
    pub trigger_close: bool,
    /// Open-trigger button level.
    pub trigger_open: bool,
}

// ---------------------------------------------------------------------------
// Motor commands (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// Commands that state handlers write to request actuator actions.
/// The service applies these to the actual drivers each tick.
#[derive(Debug, Clone, Copy)]
pub struct MotorCommands {
    /// Desired motor duty (0 = off, 1 – 65535 = on).
    pub motor_duty: u16,
    /// Desired direction while `motor_duty > 0`: `true` = toward the open
    /// end-stop, `false` = toward the close end-stop.
    pub toward_open: bool,
    /// Toggle the activity LED every tick while set.
    pub activity_blink: bool,
}

impl Default for MotorCommands {
    fn default() -> Self {
        Self {
            motor_duty: 0,
            toward_open: false,
            activity_blink: false,
        }
    }
}

impl MotorCommands {
    /// Motor off, indicators quiet — safe default.
    pub fn all_off() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// DeckContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct DeckContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,
    /// Duration of one tick in seconds (inverse of control loop frequency).
    pub tick_period_secs: f32,

    // -- Inputs --
    /// Latest switch levels.  Updated before each FSM tick.
    pub switches: SwitchSnapshot,

    // -- Outputs --
    /// Commands to be applied to the motor and indicators after the tick.
    pub commands: MotorCommands,

    // -- Configuration --
    /// System configuration (fixed after construction).
    pub config: DeckConfig,

    // -- Control mode --
    /// Automatic/manual arbitration, consulted by the Idle handler.
    pub arbiter: ModeArbiter,

    // -- Safety --
    /// Accumulated safety fault bitmask (see `SafetyFault::mask()`).
    /// Set by the safety supervisor, read by state handlers.
    pub fault_flags: u8,
    /// An asynchronous stop was requested this tick (limit edge, failsafe
    /// stop, or Stop command).  Drive states exit on it; the service clears
    /// it after every tick.
    pub stop_requested: bool,
}

impl DeckContext {
    /// Create a new context with the given configuration.
    pub fn new(config: DeckConfig) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            tick_period_secs: config.control_loop_interval_ms as f32 / 1000.0,
            switches: SwitchSnapshot::default(),
            commands: MotorCommands::all_off(),
            config,
            arbiter: ModeArbiter::new(),
            fault_flags: 0,
            stop_requested: false,
        }
    }

    /// Seconds elapsed since the current state was entered.
    pub fn secs_in_state(&self) -> f32 {
        self.ticks_in_state as f32 * self.tick_period_secs
    }

    /// Returns `true` if **any** safety fault is active.
    pub fn has_faults(&self) -> bool {
        self.fault_flags != 0
    }

    /// Check whether a specific fault flag is set.
    pub fn has_fault(&self, fault: crate::error::SafetyFault) -> bool {
        self.fault_flags & fault.mask() != 0
    }
}
