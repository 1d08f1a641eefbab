//! Outbound application events.
//!
//! The [`DeckService`](super::service::DeckService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them — today they go to the serial log.

use crate::fsm::StateId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum DeckEvent {
    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// One or more safety faults were raised.
    FaultDetected(u8),

    /// All safety faults have been cleared.
    FaultCleared,

    /// The deck service has started (carries initial state).
    Started(StateId),
}

/// A point-in-time telemetry snapshot suitable for logging.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    pub state: StateId,
    pub at_close_limit: bool,
    pub at_open_limit: bool,
    pub linked_power: bool,
    pub manual_control: bool,
    pub motor_duty: u16,
    pub toward_open: bool,
    pub fault_flags: u8,
}
