//! Inbound commands to the deck service.
//!
//! These represent actions requested by the outside world (manual trigger
//! ISRs, a debug console) that the
//! [`DeckService`](super::service::DeckService) interprets and acts upon.

use crate::fsm::StateId;

/// Commands that external sources can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckCommand {
    /// Manual close request: engage manual mode and drive to the close
    /// end-stop, preempting any automatic decision or in-progress drive.
    ForceClose,

    /// Manual open request, mirror of [`ForceClose`](Self::ForceClose).
    ForceOpen,

    /// Stop the motor and end any in-progress drive.
    Stop,

    /// Return control-mode authority to the linked-power automatics.
    /// Nothing invokes this automatically — manual mode is sticky.
    ResetManualOverride,

    /// Drop latched safety faults (e.g. after clearing a jam).
    ClearFaults,

    /// Force the FSM into a specific state (debug / testing only).
    ForceState(StateId),
}
