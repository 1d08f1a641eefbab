//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to the
//! logger (UART / USB-CDC in production).  A host-side channel adapter
//! would implement the same trait.

use log::{info, warn};

use crate::app::events::DeckEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`DeckEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &DeckEvent) {
        match event {
            DeckEvent::Telemetry(t) => {
                info!(
                    "TELEM | state={:?} | limits close={} open={} | power={} | \
                     mode={} | duty={}{} | faults=0b{:08b}",
                    t.state,
                    u8::from(t.at_close_limit),
                    u8::from(t.at_open_limit),
                    u8::from(t.linked_power),
                    if t.manual_control { "manual" } else { "auto" },
                    t.motor_duty,
                    if t.motor_duty > 0 {
                        if t.toward_open { " (opening)" } else { " (closing)" }
                    } else {
                        ""
                    },
                    t.fault_flags,
                );
            }
            DeckEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            DeckEvent::FaultDetected(flags) => {
                warn!("FAULT | detected, flags=0b{:08b}", flags);
            }
            DeckEvent::FaultCleared => {
                info!("FAULT | all cleared");
            }
            DeckEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
        }
    }
}
