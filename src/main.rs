//! Deckdrive Firmware — Main Entry Point
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter        LogEventSink       NvsAdapter        │
//! │  (Switch+Motor ports)   (EventSink)        (ConfigPort)      │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ──────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │             DeckService (pure logic)               │      │
//! │  │  FSM · Mode Arbiter · Safety                       │      │
//! │  └────────────────────────────────────────────────────┘      │
//! │                                                              │
//! │  ISRs (hw_init) ──▶ event queue / failsafe atomics ──▶ loop  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
mod arbiter;
mod config;
mod error;
mod events;
mod pins;
mod safety;

mod adapters;
mod app;
mod drivers;
mod fsm;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use adapters::hardware::HardwareAdapter;
use adapters::log_sink::LogEventSink;
use adapters::nvs::NvsAdapter;
use app::commands::DeckCommand;
use app::events::DeckEvent;
use app::ports::{ConfigPort, EventSink, MotorPort};
use app::service::DeckService;
use config::DeckConfig;
use drivers::motor::{self, MotorDriver};
use drivers::status_led::StatusLed;
use drivers::switches::SwitchBank;
use events::Event;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("deckdrive v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let watchdog = drivers::watchdog::Watchdog::new();

    // ── 3. Load config from NVS (or defaults) ─────────────────
    let config = match NvsAdapter::new() {
        Ok(nvs) => match nvs.load() {
            Ok(cfg) => {
                info!("Config loaded from NVS");
                cfg
            }
            Err(e) => {
                warn!("NVS config load failed ({}), using defaults", e);
                DeckConfig::default()
            }
        },
        Err(e) => {
            warn!(
                "NVS init failed ({}), running with defaults and no persistence",
                e
            );
            DeckConfig::default()
        }
    };

    // ── 4. Control tick timer + GPIO interrupts ───────────────
    drivers::hw_timer::start_timers(config.control_loop_interval_ms);
    if let Err(e) = drivers::hw_init::init_isr_service() {
        log::error!("ISR service init failed: {} — continuing without ISRs", e);
    }

    // ── 5. Construct adapters ─────────────────────────────────
    let mut hw = HardwareAdapter::new(
        SwitchBank::new(),
        MotorDriver::new(),
        StatusLed::new(pins::ACTIVITY_LED_GPIO),
        StatusLed::new(pins::STATUS_LED_GPIO),
    );
    let mut sink = LogEventSink::new();

    // ── 6. Construct the deck service ─────────────────────────
    let mut service = DeckService::new(config.clone());
    service.start(&mut sink);

    info!("System ready. Entering event loop.");

    // ── 7. Event loop ─────────────────────────────────────────
    let ticks_per_telemetry = (config.telemetry_interval_secs * 1000
        / config.control_loop_interval_ms)
        .max(1) as u64;
    let heartbeat_ticks = u64::from(config.heartbeat_ticks).max(1);
    let mut tick_counter: u64 = 0;
    let mut heartbeat_on = false;

    loop {
        // Simulate the control timer via sleep on non-espidf targets.
        #[cfg(not(target_os = "espidf"))]
        {
            std::thread::sleep(std::time::Duration::from_millis(u64::from(
                config.control_loop_interval_ms,
            )));
            events::push_event(Event::ControlTick);
        }

        // Yield to the idle task between drains; events arrive from the
        // esp_timer task and GPIO ISRs.
        #[cfg(target_os = "espidf")]
        unsafe {
            esp_idf_svc::sys::vTaskDelay(1);
        }

        // A limit ISR may have cut motor power since the last drain —
        // reconcile the logical state through the service.
        if motor::take_stop_request() {
            service.request_stop();
        }

        // Process all pending events.
        events::drain_events(|event| match event {
            Event::ControlTick => {
                service.tick(&mut hw, &mut sink);

                tick_counter += 1;
                if tick_counter % heartbeat_ticks == 0 {
                    heartbeat_on = !heartbeat_on;
                    hw.set_status_led(heartbeat_on);
                }
                if tick_counter % ticks_per_telemetry == 0 {
                    events::push_event(Event::TelemetryTick);
                }
            }

            Event::LimitCloseRising | Event::LimitOpenRising => {
                // Hardware-speed stop already happened in the ISR; this
                // ends the drive state and re-asserts the off state.
                service.handle_limit_edge(&mut hw);
            }

            Event::TriggerClose => {
                info!("Trigger: manual close request");
                service.handle_command(DeckCommand::ForceClose, &mut hw, &mut sink);
            }

            Event::TriggerOpen => {
                info!("Trigger: manual open request");
                service.handle_command(DeckCommand::ForceOpen, &mut hw, &mut sink);
            }

            Event::TelemetryTick => {
                sink.emit(&DeckEvent::Telemetry(service.build_telemetry()));
            }
        });

        // Feed watchdog on every iteration.
        watchdog.feed();
    }
}
