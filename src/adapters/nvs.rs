//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] for the deckdrive system.  Runtime state is
//! never persisted — only the tuning configuration, as a postcard blob.
//!
//! - Config validation: all fields are range-checked before persistence.
//! - Namespace isolation: the config lives in its own namespace.
//! - Atomic writes: ESP-IDF NVS commits are atomic per nvs_commit().

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::DeckConfig;
use log::info;

#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(not(target_os = "espidf"))]
use std::cell::RefCell;
#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "deckdrive";
const CONFIG_KEY: &str = "deckcfg";

#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 256;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// Returns `Err(ConfigError::IoError)` if flash initialisation fails
    /// unrecoverably.  On first boot or after a version mismatch the NVS
    /// partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                let ret2 = unsafe { nvs_flash_erase() };
                if ret2 != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                let ret3 = unsafe { nvs_flash_init() };
                if ret3 != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = namespace.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        // SAFETY: ns_buf is NUL-terminated by construction; the handle is
        // closed before this function returns.
        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<DeckConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
            if let Some(bytes) = self.store.borrow().get(&key) {
                let cfg: DeckConfig =
                    postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
                info!("NvsAdapter: loaded config from store");
                Ok(cfg)
            } else {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(DeckConfig::default())
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(CONFIG_NAMESPACE, false, |handle| {
                let key_cstr = c"deckcfg";
                let mut size: usize = 0;

                // First call: get size
                let ret = unsafe {
                    nvs_get_blob(handle, key_cstr.as_ptr(), core::ptr::null_mut(), &mut size)
                };
                if ret == ESP_ERR_NVS_NOT_FOUND {
                    return Err(ESP_ERR_NVS_NOT_FOUND);
                }
                if ret != ESP_OK || size == 0 || size > MAX_BLOB_SIZE {
                    return Err(ret);
                }

                let mut buf = vec![0u8; size];
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_cstr.as_ptr(),
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }

                Ok(buf)
            });

            match result {
                Ok(bytes) => {
                    let cfg: DeckConfig =
                        postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                    cfg.validate().map_err(ConfigError::ValidationFailed)?;
                    info!("NvsAdapter: loaded config from NVS ({} bytes)", bytes.len());
                    Ok(cfg)
                }
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => {
                    info!("NvsAdapter: no stored config, using defaults");
                    Ok(DeckConfig::default())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS read error {}, using defaults", e);
                    Ok(DeckConfig::default())
                }
            }
        }
    }

    fn save(&self, config: &DeckConfig) -> Result<(), ConfigError> {
        config.validate().map_err(ConfigError::ValidationFailed)?;

        #[cfg(not(target_os = "espidf"))]
        {
            let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
            let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
            self.store.borrow_mut().insert(key, bytes);
            info!("NvsAdapter: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
            let result = Self::with_nvs_handle(CONFIG_NAMESPACE, true, |handle| {
                let key_cstr = c"deckcfg";
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key_cstr.as_ptr(),
                        bytes.as_ptr() as *const _,
                        bytes.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });

            match result {
                Ok(()) => {
                    info!("NvsAdapter: config saved ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE => Err(ConfigError::StorageFull),
                Err(e) => {
                    warn!("NvsAdapter: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn load_without_save_yields_defaults() {
        let nvs = NvsAdapter::new().unwrap();
        let cfg = nvs.load().unwrap();
        assert_eq!(cfg.motor_duty_close, DeckConfig::default().motor_duty_close);
    }

    #[test]
    fn save_then_load_roundtrip() {
        let nvs = NvsAdapter::new().unwrap();
        let mut cfg = DeckConfig::default();
        cfg.motor_duty_open = 22_222;
        cfg.max_drive_secs = 12;
        nvs.save(&cfg).unwrap();

        let loaded = nvs.load().unwrap();
        assert_eq!(loaded.motor_duty_open, 22_222);
        assert_eq!(loaded.max_drive_secs, 12);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let nvs = NvsAdapter::new().unwrap();
        let mut cfg = DeckConfig::default();
        cfg.motor_duty_close = 0;
        assert!(matches!(
            nvs.save(&cfg),
            Err(ConfigError::ValidationFailed(_))
        ));
    }
}
