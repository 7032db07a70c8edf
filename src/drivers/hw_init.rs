//! One-shot hardware peripheral initialization.
//!
//! Configures the relay sense GPIOs using raw ESP-IDF sys calls.  Called
//! once from `main()` before the first sample is taken.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed { pin: i32, rc: i32 },
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed { pin, rc } => {
                write!(f, "GPIO{} config failed (rc={})", pin, rc)
            }
        }
    }
}

/// `(gpio, internal pull-down)` for each relay line, A first.
pub const RELAY_INPUTS: [(i32, bool); 2] = [
    (pins::RELAY_A_GPIO, pins::RELAY_A_INTERNAL_PULLDOWN),
    (pins::RELAY_B_GPIO, pins::RELAY_B_INTERNAL_PULLDOWN),
];

// ── GPIO Inputs ───────────────────────────────────────────────

/// Configure both relay lines as plain inputs, interrupts off.
#[cfg(target_os = "espidf")]
pub fn init_relay_inputs() -> Result<(), HwInitError> {
    for &(pin, pulldown) in &RELAY_INPUTS {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: if pulldown {
                gpio_pulldown_t_GPIO_PULLDOWN_ENABLE
            } else {
                gpio_pulldown_t_GPIO_PULLDOWN_DISABLE
            },
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: called once from the main task before any reads.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed { pin, rc: ret });
        }
        info!(
            "hw_init: GPIO{} input ({})",
            pin,
            if pulldown { "pull-down" } else { "no pull" }
        );
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_relay_inputs() -> Result<(), HwInitError> {
    for &(pin, pulldown) in &RELAY_INPUTS {
        info!(
            "hw_init(sim): GPIO{} input ({})",
            pin,
            if pulldown { "pull-down" } else { "no pull" }
        );
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}
