//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DeckService (domain)
//! ```
//!
//! Driven adapters (switch inputs, the motor/indicator stage, event sinks,
//! config storage) implement these traits.  The
//! [`DeckService`](super::service::DeckService) consumes them via generics,
//! so the domain core never touches hardware directly.

use crate::config::DeckConfig;
use crate::fsm::context::SwitchSnapshot;

// ───────────────────────────────────────────────────────────────
// Switch port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain the switch levels.
pub trait SwitchPort {
    /// Read every binary input and return a unified snapshot.
    fn read_all(&mut self) -> SwitchSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Motor port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command the motor stage and
/// the indicator LEDs.
pub trait MotorPort {
    /// Energize the motor at `duty` (1 – 65535) toward the open end-stop
    /// when `toward_open`, toward the close end-stop otherwise.  Repeating
    /// the same command while already running is a no-op.
    fn drive_motor(&mut self, duty: u16, toward_open: bool);

    /// Unconditionally de-energize the motor (both direction lines off,
    /// duty zero).  Idempotent.
    fn stop_motor(&mut self);

    /// Query whether the motor stage is currently energized.
    fn is_motor_running(&self) -> bool;

    /// Set the activity LED level.
    fn set_activity_led(&mut self, on: bool);

    /// Invert the activity LED (blink step while the deck moves).
    fn toggle_activity_led(&mut self);

    /// Set the status/heartbeat LED level.
    fn set_status_led(&mut self, on: bool);

    /// Kill the motor and all indicators — safe shutdown.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`DeckEvent`](super::events::DeckEvent)s
/// through this port.  Adapters decide where they go (serial log today; a
/// display or host-side channel would implement the same trait).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::DeckEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges should be rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`ConfigError::NotFound`] on first boot.
    fn load(&self) -> Result<DeckConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &DeckConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
