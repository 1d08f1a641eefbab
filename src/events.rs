//! Interrupt-driven event system.
//!
//! Events are produced by:
//! - GPIO ISRs (limit-switch edges, manual trigger presses)
//! - Timer callbacks (periodic control tick)
//! - Software (telemetry cadence)
//!
//! Events are consumed by the main control loop, which processes them
//! one at a time in FIFO order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ GPIO ISR    │────▶│              │     │              │
//! │ Timer ISR   │────▶│  Event Queue │────▶│  Main Loop   │
//! │ Software    │────▶│  (lock-free) │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

/// Maximum number of pending events.
/// Power of 2 for efficient ring buffer modulo.
const EVENT_QUEUE_CAP: usize = 32;

/// System event types, ordered by rough priority.
/// Lower discriminant = higher priority when multiple events
/// are pending simultaneously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    // ── Safety-critical (highest priority) ────────────────
    /// Close-limit switch rising edge — deck reached the closed end-stop.
    LimitCloseRising = 0,
    /// Open-limit switch rising edge — deck reached the open end-stop.
    LimitOpenRising = 1,

    // ── Manual input ──────────────────────────────────────
    /// Close-trigger button press (edge plus level re-check in the ISR).
    TriggerClose = 10,
    /// Open-trigger button press.
    TriggerOpen = 11,

    // ── Control ───────────────────────────────────────────
    /// Periodic control loop tick.
    ControlTick = 20,

    // ── Housekeeping ──────────────────────────────────────
    /// Telemetry report timer fired.
    TelemetryTick = 30,
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// ISRs write (produce), main loop reads (consume).
// Uses atomic head/tail indices.  The buffer is intentionally
// kept in a static so ISR callbacks can access it.

static EVENT_HEAD: AtomicU8 = AtomicU8::new(0);
static EVENT_TAIL: AtomicU8 = AtomicU8::new(0);
// SAFETY: EVENT_BUFFER is accessed under the SPSC discipline only.
// Producer (push_event): ISR / timer-task context — one writer.
// Consumer (pop_event): main-loop task — one reader.
// The acquire/release pairs on head and tail order the slot writes.
static mut EVENT_BUFFER: [u8; EVENT_QUEUE_CAP] = [0; EVENT_QUEUE_CAP];

/// Push an event into the queue.
/// Safe to call from ISR context (lock-free).
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    let head = EVENT_HEAD.load(Ordering::Relaxed);
    let tail = EVENT_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

    if next_head == tail {
        return false; // Queue full — drop event.
    }

    // SAFETY: Only one producer (ISR context is single-threaded on each
    // core); the release store on EVENT_HEAD publishes the slot write.
    unsafe {
        EVENT_BUFFER[head as usize] = event as u8;
    }

    EVENT_HEAD.store(next_head, Ordering::Release);
    true
}

/// Pop the next event from the queue.
/// Called from the main loop (single consumer).
/// Returns `None` if the queue is empty.
pub fn pop_event() -> Option<Event> {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);

    if tail == head {
        return None; // Empty.
    }

    let raw = unsafe { EVENT_BUFFER[tail as usize] };
    EVENT_TAIL.store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);

    event_from_u8(raw)
}

/// Drain all pending events into a callback.
/// Processes events in FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Check if the event queue is empty.
pub fn queue_is_empty() -> bool {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);
    tail == head
}

/// Number of pending events.
pub fn queue_len() -> usize {
    let head = EVENT_HEAD.load(Ordering::Relaxed) as usize;
    let tail = EVENT_TAIL.load(Ordering::Relaxed) as usize;
    (head + EVENT_QUEUE_CAP - tail) % EVENT_QUEUE_CAP
}

// ── Internal ──────────────────────────────────────────────────

/// Decode a raw discriminant.  Unknown codes yield `None` and the event is
/// dropped rather than misrouted.
fn event_from_u8(raw: u8) -> Option<Event> {
    match raw {
        0 => Some(Event::LimitCloseRising),
        1 => Some(Event::LimitOpenRising),
        10 => Some(Event::TriggerClose),
        11 => Some(Event::TriggerOpen),
        20 => Some(Event::ControlTick),
        30 => Some(Event::TelemetryTick),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test fn: the queue statics are global, and the harness runs
    // separate #[test] fns on parallel threads.
    #[test]
    fn fifo_order_and_overflow_drop() {
        drain_events(|_| {});
        assert!(queue_is_empty());

        assert!(push_event(Event::LimitCloseRising));
        assert!(push_event(Event::TriggerOpen));
        assert!(push_event(Event::ControlTick));
        assert_eq!(queue_len(), 3);

        assert_eq!(pop_event(), Some(Event::LimitCloseRising));
        assert_eq!(pop_event(), Some(Event::TriggerOpen));
        assert_eq!(pop_event(), Some(Event::ControlTick));
        assert_eq!(pop_event(), None);

        // One slot is sacrificed to distinguish full from empty.
        for _ in 0..EVENT_QUEUE_CAP - 1 {
            assert!(push_event(Event::ControlTick));
        }
        assert!(!push_event(Event::TelemetryTick), "full queue drops");

        let mut drained = 0;
        drain_events(|e| {
            assert_eq!(e, Event::ControlTick);
            drained += 1;
        });
        assert_eq!(drained, EVENT_QUEUE_CAP - 1);
        assert!(queue_is_empty());
    }
}
