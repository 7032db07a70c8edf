//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`]: the system configuration is stored as one
//! JSON blob under namespace `machmon`, key `config`.  A JSON document
//! (rather than a binary encoding) lets a bench tool provision a board
//! with `nvs_partition_gen` or over the serial console.
//!
//! - Validation: every document is checked by [`SystemConfig::validate`]
//!   before it is written and after it is read.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//! - The host backend is an in-memory map (dev/test only).

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

pub const CONFIG_NAMESPACE: &str = "machmon";
pub const CONFIG_KEY: &str = "config";

/// Largest config blob accepted from flash.
pub const MAX_BLOB_SIZE: usize = 1024;

pub struct NvsConfigStore {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsConfigStore {
    /// Initialise NVS flash.
    ///
    /// Returns `Err(ConfigError::IoError)` if flash initialisation fails
    /// unrecoverably.  On a full or version-mismatched partition the NVS
    /// partition is erased and re-initialised.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
            {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as esp_err_t {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK as esp_err_t {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK as esp_err_t {
                return Err(ConfigError::IoError);
            }
            info!("NvsConfigStore: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsConfigStore: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    /// Load the stored config, or defaults if none / unreadable.
    ///
    /// Returns the config and whether it came from storage.
    pub fn load_or_default(&self) -> (SystemConfig, bool) {
        match self.load() {
            Ok(cfg) => (cfg, true),
            Err(ConfigError::NotFound) => {
                info!("NvsConfigStore: no stored config, using defaults");
                (SystemConfig::default(), false)
            }
            Err(e) => {
                warn!("NvsConfigStore: stored config rejected ({}), using defaults", e);
                (SystemConfig::default(), false)
            }
        }
    }

    /// Store raw bytes without validation (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_put_raw(&self, bytes: &[u8]) {
        self.store
            .borrow_mut()
            .insert(Self::composite_key(), bytes.to_vec());
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key() -> String {
        format!("{}::{}", CONFIG_NAMESPACE, CONFIG_KEY)
    }

    /// Open the config namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        // Literal mirrors CONFIG_NAMESPACE.
        // SAFETY: namespace is a NUL-terminated literal.
        let ret = unsafe { nvs_open(c"machmon".as_ptr(), mode, &mut handle) };
        if ret != ESP_OK as esp_err_t {
            return Err(ret);
        }

        let result = f(handle);
        // SAFETY: handle was opened above and is not used after close.
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn read_blob() -> Result<Vec<u8>, ConfigError> {
        let result = Self::with_nvs_handle(false, |handle| {
            let mut size: usize = 0;

            // First call: get size
            // SAFETY: null buffer asks NVS for the stored length only.
            let ret = unsafe {
                nvs_get_blob(handle, c"config".as_ptr(), core::ptr::null_mut(), &mut size)
            };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            if size == 0 || size > MAX_BLOB_SIZE {
                return Err(ESP_ERR_NVS_INVALID_LENGTH as esp_err_t);
            }

            let mut buf = vec![0u8; size];
            // SAFETY: buf holds exactly `size` bytes.
            let ret = unsafe {
                nvs_get_blob(handle, c"config".as_ptr(), buf.as_mut_ptr().cast(), &mut size)
            };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            Ok(buf)
        });

        match result {
            Ok(bytes) => Ok(bytes),
            // A never-written namespace fails to open read-only with NOT_FOUND too.
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND as esp_err_t => Err(ConfigError::NotFound),
            Err(e) if e == ESP_ERR_NVS_INVALID_LENGTH as esp_err_t => Err(ConfigError::Corrupted),
            Err(e) => {
                warn!("NvsConfigStore: NVS read error {}", e);
                Err(ConfigError::IoError)
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self) -> Result<Vec<u8>, ConfigError> {
        self.store
            .borrow()
            .get(&Self::composite_key())
            .cloned()
            .ok_or(ConfigError::NotFound)
    }
}

impl ConfigPort for NvsConfigStore {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        #[cfg(target_os = "espidf")]
        let bytes = Self::read_blob()?;
        #[cfg(not(target_os = "espidf"))]
        let bytes = self.read_blob()?;

        let cfg = SystemConfig::from_json(&bytes)?;
        info!("NvsConfigStore: loaded config ({} bytes)", bytes.len());
        Ok(cfg)
    }

    fn save(&mut self, config: &SystemConfig) -> Result<(), ConfigError> {
        let bytes = config.to_json()?;
        if bytes.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::ValidationFailed("config document too large"));
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.store.borrow_mut().insert(Self::composite_key(), bytes);
            info!("NvsConfigStore: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(true, |handle| {
                // SAFETY: bytes outlives the call; key is NUL-terminated.
                let ret = unsafe {
                    nvs_set_blob(handle, c"config".as_ptr(), bytes.as_ptr().cast(), bytes.len())
                };
                if ret != ESP_OK as esp_err_t {
                    return Err(ret);
                }
                // SAFETY: handle is open read-write.
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK as esp_err_t {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("NvsConfigStore: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsConfigStore: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}
