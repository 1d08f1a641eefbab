//! System configuration parameters
//!
//! All tunable parameters for the deckdrive mechanism.  Values can be
//! overridden by a blob stored in NVS; once the service is constructed
//! the configuration is immutable for the life of the process.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckConfig {
    // --- Motor ---
    /// PWM duty (0 – 65535) while driving toward the open end-stop.
    pub motor_duty_open: u16,
    /// PWM duty (0 – 65535) while driving toward the close end-stop.
    pub motor_duty_close: u16,

    // --- Safety ---
    /// Maximum continuous drive duration (seconds) before the supervisor
    /// latches a DriveTimeout fault.  0 disables the watchdog.
    pub max_drive_secs: u16,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Heartbeat LED toggle interval, in control ticks
    pub heartbeat_ticks: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            // Motor: the stock gearmotor stalls below ~8% duty and rattles
            // the chassis above ~25%; 10000/65535 is the tuned sweet spot
            // for both directions.
            motor_duty_open: 10_000,
            motor_duty_close: 10_000,

            // Safety
            max_drive_secs: 30,

            // Timing
            control_loop_interval_ms: 250, // 4 Hz
            heartbeat_ticks: 4,            // 1 Hz heartbeat at the default tick
            telemetry_interval_secs: 60,   // 1/min
        }
    }
}

impl DeckConfig {
    /// Range-check a configuration before use or persistence.
    /// Returns the offending field description on failure.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.motor_duty_open == 0 {
            return Err("motor_duty_open must be nonzero");
        }
        if self.motor_duty_close == 0 {
            return Err("motor_duty_close must be nonzero");
        }
        if self.control_loop_interval_ms == 0 {
            return Err("control_loop_interval_ms must be nonzero");
        }
        if self.heartbeat_ticks == 0 {
            return Err("heartbeat_ticks must be nonzero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = DeckConfig::default();
        assert!(c.validate().is_ok());
        assert!(c.motor_duty_open > 0);
        assert!(c.motor_duty_close > 0);
        assert!(c.control_loop_interval_ms > 0);
        assert!(c.telemetry_interval_secs > 0);
    }

    #[test]
    fn zero_duty_rejected() {
        let mut c = DeckConfig::default();
        c.motor_duty_close = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let c = DeckConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: DeckConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.motor_duty_open, c2.motor_duty_open);
        assert_eq!(c.max_drive_secs, c2.max_drive_secs);
        assert_eq!(c.control_loop_interval_ms, c2.control_loop_interval_ms);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = DeckConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: DeckConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.motor_duty_close, c2.motor_duty_close);
        assert_eq!(c.heartbeat_ticks, c2.heartbeat_ticks);
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = DeckConfig::default();
        assert!(
            c.control_loop_interval_ms < c.telemetry_interval_secs * 1000,
            "control loop should be faster than telemetry"
        );
        assert!(
            u32::from(c.max_drive_secs) * 1000 > c.control_loop_interval_ms,
            "drive watchdog must span multiple control ticks"
        );
    }
}
