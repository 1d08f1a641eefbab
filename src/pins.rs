//! GPIO / peripheral pin assignments for the deckdrive main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Limit switches (deck end-stops)
// ---------------------------------------------------------------------------

/// Close-limit switch: HIGH when the deck is fully retracted.
/// Pull-down input, rising-edge interrupt.
pub const LIMIT_CLOSE_GPIO: i32 = 15;
/// Open-limit switch: HIGH when the deck is fully extended.
pub const LIMIT_OPEN_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// Linked-power sense
// ---------------------------------------------------------------------------

/// Digital input mirroring the host device's power rail.
/// HIGH = host powered/docked (deck should be open).
pub const LINKED_POWER_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// Manual triggers (momentary push-buttons)
// ---------------------------------------------------------------------------

/// Close-request button. Pull-down input, rising-edge interrupt.
pub const TRIGGER_CLOSE_GPIO: i32 = 17;
/// Open-request button.
pub const TRIGGER_OPEN_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// Motor driver (DRV8871 H-bridge)
// ---------------------------------------------------------------------------

/// LEDC PWM channel for motor drive strength.
pub const MOTOR_PWM_GPIO: i32 = 10;
/// H-bridge IN1: HIGH while driving toward the close end-stop.
pub const MOTOR_IN1_GPIO: i32 = 12;
/// H-bridge IN2: HIGH while driving toward the open end-stop.
pub const MOTOR_IN2_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Indicator LEDs
// ---------------------------------------------------------------------------

/// Activity LED, toggled while the deck is in motion.
pub const ACTIVITY_LED_GPIO: i32 = 1;
/// Status/heartbeat LED, toggled periodically by the main loop.
pub const STATUS_LED_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  The motor API carries the full 0 – 65535
/// duty range; `hw_init::ledc_set` right-shifts it into this hardware range
/// (the ESP32-S3 LEDC tops out at 14 bits).
pub const PWM_RESOLUTION_BITS: u32 = 14;
/// LEDC base frequency for the motor H-bridge (500 Hz, per the gearmotor
/// driver's recommended input frequency).
pub const MOTOR_PWM_FREQ_HZ: u32 = 500;
