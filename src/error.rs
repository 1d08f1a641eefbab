#![allow(dead_code)] // Hardware-failure variants reserved for typed MotorPort returns

//! Unified error types for the deckdrive firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level control loop's error handling uniform.  All variants are `Copy`
//! so they can be cheaply passed through the safety supervisor and FSM
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A motor command failed or was malformed.
    Motor(MotorError),
    /// A safety interlock was violated.
    Safety(SafetyFault),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Motor(e) => write!(f, "motor: {e}"),
            Self::Safety(e) => write!(f, "safety: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Motor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorError {
    /// A raw direction code decoded from an external source was not one of
    /// the two known directions.  The motor must be left untouched.
    InvalidDirection(u8),
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDirection(raw) => write!(f, "invalid direction code {raw}"),
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Self::Motor(e)
    }
}

// ---------------------------------------------------------------------------
// Safety faults
// ---------------------------------------------------------------------------

/// Safety faults trigger an immediate transition to the ERROR state and
/// de-energize the motor.  They are accumulated in a bitfield by the safety
/// supervisor so that multiple simultaneous faults can be tracked and
/// individually cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SafetyFault {
    /// Both limit switches read asserted at once — a wiring or sensor
    /// failure; deck position is unknowable.
    LimitContradiction = 0b0000_0001,
    /// The motor ran longer than the configured maximum drive duration
    /// without reaching its end-stop (jam or dead limit switch).  Latched
    /// until explicitly cleared.
    DriveTimeout = 0b0000_0010,
}

impl SafetyFault {
    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LimitContradiction => write!(f, "both limit switches asserted"),
            Self::DriveTimeout => write!(f, "drive timeout"),
        }
    }
}

impl From<SafetyFault> for Error {
    fn from(e: SafetyFault) -> Self {
        Self::Safety(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
