//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers — no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!          ┌──[power low, not at close limit]──▶ CLOSING ──[close limit
//!          │                                        │        or stop]──┐
//!  IDLE ◀──┴────────────────────────────────────────┼───────────────────┘
//!    │                                              │
//!    ├──[power high, auto, not at open limit]──▶ OPENING ──[open limit
//!    │                                                       or stop]──▶ IDLE
//!    │
//!  Any state ──[safety fault]──▶ ERROR ──[faults cleared]──▶ IDLE
//! ```
//!
//! The drive states re-assert their motor command every tick; the motor
//! driver treats a repeated command as a no-op, so the only side effect of
//! the re-assertion is that the exit conditions (limit level, stop request,
//! fault mask) are re-evaluated at tick rate.  Manual trigger presses do not
//! appear here: the service force-transitions into `Closing`/`Opening`
//! directly, preempting whatever the arbiter would have decided.

use super::context::DeckContext;
use super::{StateDescriptor, StateId};
use crate::arbiter::AutoAction;
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1 — Closing
        StateDescriptor {
            id: StateId::Closing,
            name: "Closing",
            on_enter: Some(closing_enter),
            on_exit: Some(drive_exit),
            on_update: closing_update,
        },
        // Index 2 — Opening
        StateDescriptor {
            id: StateId::Opening,
            name: "Opening",
            on_enter: Some(opening_enter),
            on_exit: Some(drive_exit),
            on_update: opening_update,
        },
        // Index 3 — Error
        StateDescriptor {
            id: StateId::Error,
            name: "Error",
            on_enter: Some(error_enter),
            on_exit: Some(error_exit),
            on_update: error_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut DeckContext) {
    ctx.commands.motor_duty = 0;
    ctx.commands.activity_blink = false;
}

fn idle_update(ctx: &mut DeckContext) -> Option<StateId> {
    // Guard: any safety fault → Error
    if ctx.has_faults() {
        return Some(StateId::Error);
    }

    match ctx.arbiter.decide(ctx.switches.linked_power) {
        AutoAction::Close => {
            // Already at the end-stop: nothing to do.
            if ctx.switches.at_close_limit {
                return None;
            }
            Some(StateId::Closing)
        }
        AutoAction::Open => {
            if ctx.switches.at_open_limit {
                return None;
            }
            Some(StateId::Opening)
        }
        AutoAction::Hold => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  CLOSING state — driving toward the close end-stop
// ═══════════════════════════════════════════════════════════════════════════

fn closing_enter(ctx: &mut DeckContext) {
    ctx.commands.motor_duty = ctx.config.motor_duty_close;
    ctx.commands.toward_open = false;
    ctx.commands.activity_blink = true;
    info!(
        "CLOSING: duty {} until close limit",
        ctx.config.motor_duty_close
    );
}

fn closing_update(ctx: &mut DeckContext) -> Option<StateId> {
    if ctx.has_faults() {
        return Some(StateId::Error);
    }

    // An asynchronous stop (limit edge ISR, failsafe, Stop command) ends
    // the drive even if the level read below races the edge.
    if ctx.stop_requested {
        info!("CLOSING: stop requested");
        return Some(StateId::Idle);
    }

    if ctx.switches.at_close_limit {
        info!("CLOSING: close limit reached after {:.1}s", ctx.secs_in_state());
        return Some(StateId::Idle);
    }

    // Limit still clear: keep the drive command asserted.
    ctx.commands.motor_duty = ctx.config.motor_duty_close;
    ctx.commands.toward_open = false;
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  OPENING state — driving toward the open end-stop
// ═══════════════════════════════════════════════════════════════════════════

fn opening_enter(ctx: &mut DeckContext) {
    ctx.commands.motor_duty = ctx.config.motor_duty_open;
    ctx.commands.toward_open = true;
    ctx.commands.activity_blink = true;
    info!(
        "OPENING: duty {} until open limit",
        ctx.config.motor_duty_open
    );
}

fn opening_update(ctx: &mut DeckContext) -> Option<StateId> {
    if ctx.has_faults() {
        return Some(StateId::Error);
    }

    if ctx.stop_requested {
        info!("OPENING: stop requested");
        return Some(StateId::Idle);
    }

    if ctx.switches.at_open_limit {
        info!("OPENING: open limit reached after {:.1}s", ctx.secs_in_state());
        return Some(StateId::Idle);
    }

    ctx.commands.motor_duty = ctx.config.motor_duty_open;
    ctx.commands.toward_open = true;
    None
}

/// Shared exit action for both drive states: motor off, activity LED off.
fn drive_exit(ctx: &mut DeckContext) {
    ctx.commands.motor_duty = 0;
    ctx.commands.activity_blink = false;
}

// ═══════════════════════════════════════════════════════════════════════════
//  ERROR state — safety fault, motor disabled
// ═══════════════════════════════════════════════════════════════════════════

fn error_enter(ctx: &mut DeckContext) {
    // Kill everything immediately, then blink the activity LED as the
    // visible fault indicator.
    ctx.commands = super::context::MotorCommands::all_off();
    ctx.commands.activity_blink = true;
    warn!(
        "ERROR: motor disabled, fault_flags=0b{:08b}",
        ctx.fault_flags
    );
}

fn error_exit(ctx: &mut DeckContext) {
    ctx.commands.activity_blink = false;
    info!("ERROR: faults cleared, resuming normal operation");
}

fn error_update(ctx: &mut DeckContext) -> Option<StateId> {
    // Belt and braces: the motor stays commanded off for as long as the
    // fault condition persists.
    ctx.commands.motor_duty = 0;

    // Stay in Error until ALL faults are cleared
    if !ctx.has_faults() {
        return Some(StateId::Idle);
    }

    None
}
