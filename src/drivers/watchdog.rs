//! Task Watchdog Timer (TWDT) driver.
//!
//! Wraps the ESP-IDF TWDT API to reset the device if the main task stops
//! feeding it for longer than the configured timeout.  Every blocking
//! wait in the firmware goes through [`crate::adapters::time::Esp32Clock`],
//! which feeds this watchdog while it sleeps.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::{info, warn};

pub struct Watchdog {
    timeout_secs: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    #[cfg(not(target_os = "espidf"))]
    feeds: core::cell::Cell<u64>,
}

impl Watchdog {
    /// Reconfigure the TWDT and subscribe the current task.
    pub fn new(timeout_secs: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            let cfg = esp_task_wdt_config_t {
                timeout_ms: timeout_secs.saturating_mul(1000),
                idle_core_mask: 0,
                trigger_panic: true,
            };
            // SAFETY: called once from the main task before the loop starts.
            let ret = unsafe { esp_task_wdt_reconfigure(&cfg) };
            if ret != ESP_OK as esp_err_t {
                warn!("Watchdog: reconfigure returned {} (may already be configured)", ret);
            }

            // SAFETY: null handle subscribes the calling task.
            let ret = unsafe { esp_task_wdt_add(core::ptr::null_mut()) };
            let subscribed = ret == ESP_OK as esp_err_t;
            if subscribed {
                info!("Watchdog: subscribed ({}s timeout, panic on trigger)", timeout_secs);
            } else {
                warn!("Watchdog: failed to subscribe ({})", ret);
            }

            Self {
                timeout_secs,
                subscribed,
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("Watchdog(sim): {}s timeout, no-op", timeout_secs);
            if timeout_secs == 0 {
                warn!("Watchdog(sim): zero timeout");
            }
            Self {
                timeout_secs,
                feeds: core::cell::Cell::new(0),
            }
        }
    }

    /// Feed the watchdog.  Must be called at least once per timeout.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                // SAFETY: resets the calling task's subscription only.
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        self.feeds.set(self.feeds.get() + 1);
    }

    pub fn timeout_secs(&self) -> u32 {
        self.timeout_secs
    }

    /// Feeds since construction (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_feeds(&self) -> u64 {
        self.feeds.get()
    }
}
