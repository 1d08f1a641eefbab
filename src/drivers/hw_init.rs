//! One-shot hardware peripheral initialization.
//!
//! Configures GPIO directions, the LEDC motor PWM timer, and the GPIO ISR
//! service using raw ESP-IDF sys calls.  Called once from `main()` before
//! the event loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    LedcInitFailed,
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed => write!(f, "LEDC timer/channel config failed"),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before event loop; single-threaded.
    unsafe {
        init_gpio_inputs()?;
        init_gpio_outputs()?;
        init_ledc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    // All five switch inputs are active-high against external pull-downs;
    // edge interrupt types are set later in init_isr_service().
    let input_pins = [
        pins::LIMIT_CLOSE_GPIO,
        pins::LIMIT_OPEN_GPIO,
        pins::LINKED_POWER_GPIO,
        pins::TRIGGER_CLOSE_GPIO,
        pins::TRIGGER_OPEN_GPIO,
    ];

    for &pin in &input_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    info!("hw_init: GPIO inputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    false
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = [
        pins::MOTOR_IN1_GPIO,
        pins::MOTOR_IN2_GPIO,
        pins::ACTIVITY_LED_GPIO,
        pins::STATUS_LED_GPIO,
    ];

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        // Both H-bridge inputs and the LEDs start low.
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: GPIO outputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    // Register writes are single-word; callable from ISR and main context.
    unsafe {
        gpio_set_level(pin, if high { 1 } else { 0 });
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── LEDC PWM ─────────────────────────────────────────────────

pub const LEDC_CH_MOTOR: u32 = 0;

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    // Timer 0: motor H-bridge (500 Hz, 14-bit — the deepest resolution the
    // S3 LEDC supports at this frequency).
    // SAFETY: Called from single main-task context via init_peripherals().
    let timer0 = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_14_BIT,
        freq_hz: pins::MOTOR_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer0) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed);
    }

    // Channel 0: motor PWM, initially at zero duty.
    let ret = unsafe {
        ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: ledc_channel_t_LEDC_CHANNEL_0,
            timer_sel: ledc_timer_t_LEDC_TIMER_0,
            gpio_num: pins::MOTOR_PWM_GPIO,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        })
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed);
    }

    info!(
        "hw_init: LEDC configured (motor=CH0 @ {} Hz)",
        pins::MOTOR_PWM_FREQ_HZ
    );
    Ok(())
}

/// Write a 16-bit duty command to an LEDC channel.  The command range
/// (0 – 65535) is right-shifted into the 14-bit hardware range.
#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u16) {
    // SAFETY: the channel was configured in init_ledc(); duty register
    // writes are single-word and callable from ISR and main context.
    unsafe {
        esp_idf_svc::sys::ledc_set_duty(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel,
            u32::from(duty >> 2),
        );
        esp_idf_svc::sys::ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u16) {}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::drivers::motor;
#[cfg(target_os = "espidf")]
use crate::events::{Event, push_event};

// Limit-switch ISRs: cut motor power at hardware speed, then let the main
// loop reconcile.  This is the one hard real-time path in the system — it
// must not depend on the control tick cadence.

#[cfg(target_os = "espidf")]
unsafe extern "C" fn limit_close_isr(_arg: *mut core::ffi::c_void) {
    motor::failsafe_stop();
    push_event(Event::LimitCloseRising);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn limit_open_isr(_arg: *mut core::ffi::c_void) {
    motor::failsafe_stop();
    push_event(Event::LimitOpenRising);
}

// Trigger ISRs: edge delivery can race with the signal still settling, so
// the level is re-read before the press is accepted.

#[cfg(target_os = "espidf")]
unsafe extern "C" fn trigger_close_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: gpio_get_level is a register read; safe in ISR context.
    if unsafe { gpio_get_level(pins::TRIGGER_CLOSE_GPIO) } != 0 {
        push_event(Event::TriggerClose);
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn trigger_open_isr(_arg: *mut core::ffi::c_void) {
    if unsafe { gpio_get_level(pins::TRIGGER_OPEN_GPIO) } != 0 {
        push_event(Event::TriggerOpen);
    }
}

/// Install per-pin GPIO ISR service and register interrupt handlers.
/// Call after init_peripherals() and before the event loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed (acceptable).  ISR handlers registered
    // below only touch the lock-free event queue and the failsafe atomics.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        type IsrFn = unsafe extern "C" fn(*mut core::ffi::c_void);
        let rising: [(i32, IsrFn); 4] = [
            (pins::LIMIT_CLOSE_GPIO, limit_close_isr),
            (pins::LIMIT_OPEN_GPIO, limit_open_isr),
            (pins::TRIGGER_CLOSE_GPIO, trigger_close_isr),
            (pins::TRIGGER_OPEN_GPIO, trigger_open_isr),
        ];

        for (pin, handler) in rising {
            gpio_set_intr_type(pin, gpio_int_type_t_GPIO_INTR_POSEDGE);
            gpio_isr_handler_add(pin, Some(handler), core::ptr::null_mut());
            gpio_intr_enable(pin);
        }

        info!("hw_init: ISR service installed (limit×2, trigger×2)");
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
