//! System configuration parameters
//!
//! Compiled-in defaults, overridable by a JSON document provisioned into
//! NVS (see [`crate::adapters::nvs`]).  Credentials are never in source:
//! the defaults for SSID, passphrase and broker host come from the build
//! environment (`MACHMON_WIFI_SSID`, `MACHMON_WIFI_PASSWORD`,
//! `MACHMON_BROKER_HOST`).

use core::time::Duration;

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Longest machine identifier accepted anywhere in the firmware.
/// Topic buffers are sized from this (see [`crate::app::publisher`]).
pub const MAX_MACHINE_ID_LEN: usize = 32;
pub const MAX_SSID_LEN: usize = 32;
pub const MAX_PASSWORD_LEN: usize = 64;
pub const MAX_HOST_LEN: usize = 64;
pub const MAX_CLIENT_ID_LEN: usize = 32;

const MIN_INTERVAL_MS: u32 = 100;
const MAX_INTERVAL_MS: u32 = 60_000;

/// Which topic the forward-run OFF edge is published on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicScheme {
    /// `<id>/R01/ON` for both edges; subscribers tell them apart by payload.
    #[default]
    Legacy,
    /// `<id>/R01/ON` for ON and `<id>/R01/OFF` for OFF.
    Distinct,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Identity ---
    /// Machine identifier, first topic segment.
    pub machine_id: String<MAX_MACHINE_ID_LEN>,
    /// MQTT client id; empty = derive from the factory MAC.
    pub client_id: String<MAX_CLIENT_ID_LEN>,
    pub topic_scheme: TopicScheme,

    // --- Network ---
    pub wifi_ssid: String<MAX_SSID_LEN>,
    pub wifi_password: String<MAX_PASSWORD_LEN>,
    pub broker_host: String<MAX_HOST_LEN>,
    pub broker_port: u16,

    // --- Timing ---
    /// Link association poll interval (milliseconds)
    pub link_poll_interval_ms: u32,
    /// Broker retry interval at boot (milliseconds)
    pub session_connect_retry_ms: u32,
    /// Broker retry interval after a mid-loop session loss (milliseconds)
    pub session_reconnect_retry_ms: u32,
    /// Main loop pacing (milliseconds)
    pub cycle_interval_ms: u32,
    /// Task watchdog timeout (seconds)
    pub watchdog_timeout_secs: u32,
}

/// Whether an optional build-time value fits a field of `max` bytes.
pub const fn build_env_fits(value: Option<&str>, max: usize) -> bool {
    match value {
        Some(v) => v.len() <= max,
        None => true,
    }
}

// An over-long credential must fail the build: an empty passphrase would
// otherwise silently mean an open network.
const _: () = {
    assert!(
        build_env_fits(option_env!("MACHMON_WIFI_SSID"), MAX_SSID_LEN),
        "MACHMON_WIFI_SSID exceeds 32 bytes"
    );
    assert!(
        build_env_fits(option_env!("MACHMON_WIFI_PASSWORD"), MAX_PASSWORD_LEN),
        "MACHMON_WIFI_PASSWORD exceeds 64 bytes"
    );
    assert!(
        build_env_fits(option_env!("MACHMON_BROKER_HOST"), MAX_HOST_LEN),
        "MACHMON_BROKER_HOST exceeds 64 bytes"
    );
};

/// Inputs are literals or build-time values checked above.
fn bounded<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    let pushed = out.push_str(s);
    debug_assert!(pushed.is_ok(), "default exceeds field capacity");
    out
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Identity
            machine_id: bounded("fanuc"),
            client_id: String::new(),
            topic_scheme: TopicScheme::Legacy,

            // Network
            wifi_ssid: bounded(option_env!("MACHMON_WIFI_SSID").unwrap_or("")),
            wifi_password: bounded(option_env!("MACHMON_WIFI_PASSWORD").unwrap_or("")),
            broker_host: bounded(option_env!("MACHMON_BROKER_HOST").unwrap_or("192.168.1.7")),
            broker_port: 1883,

            // Timing
            link_poll_interval_ms: 1000,
            session_connect_retry_ms: 5000,
            session_reconnect_retry_ms: 1000,
            cycle_interval_ms: 1000,
            watchdog_timeout_secs: 30,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// 1-32 printable ASCII bytes.
pub fn ssid_valid(ssid: &str) -> bool {
    !ssid.is_empty() && ssid.len() <= MAX_SSID_LEN && is_printable_ascii(ssid)
}

/// Empty (open network) or 8-64 bytes (WPA2).
pub fn password_valid(password: &str) -> bool {
    password.is_empty() || (8..=MAX_PASSWORD_LEN).contains(&password.len())
}

/// Non-empty printable ASCII without topic separators or wildcards.
pub fn machine_id_valid(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_MACHINE_ID_LEN
        && is_printable_ascii(id)
        && !id.bytes().any(|b| matches!(b, b'/' | b'+' | b'#' | b' '))
}

fn interval_valid(ms: u32) -> bool {
    (MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&ms)
}

impl SystemConfig {
    /// Range- and format-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !machine_id_valid(&self.machine_id) {
            return Err(ConfigError::ValidationFailed(
                "machine_id must be 1-32 printable ASCII bytes without '/', '+', '#' or spaces",
            ));
        }
        if !self.client_id.is_empty() && !is_printable_ascii(&self.client_id) {
            return Err(ConfigError::ValidationFailed(
                "client_id must be printable ASCII",
            ));
        }
        if !ssid_valid(&self.wifi_ssid) {
            return Err(ConfigError::ValidationFailed(
                "wifi_ssid must be 1-32 printable ASCII bytes",
            ));
        }
        if !password_valid(&self.wifi_password) {
            return Err(ConfigError::ValidationFailed(
                "wifi_password must be empty or 8-64 bytes",
            ));
        }
        if self.broker_host.is_empty() || !is_printable_ascii(&self.broker_host) {
            return Err(ConfigError::ValidationFailed(
                "broker_host must be non-empty printable ASCII",
            ));
        }
        if self.broker_port == 0 {
            return Err(ConfigError::ValidationFailed("broker_port must be non-zero"));
        }
        for ms in [
            self.link_poll_interval_ms,
            self.session_connect_retry_ms,
            self.session_reconnect_retry_ms,
            self.cycle_interval_ms,
        ] {
            if !interval_valid(ms) {
                return Err(ConfigError::ValidationFailed(
                    "intervals must be 100-60000 ms",
                ));
            }
        }
        if !(5..=300).contains(&self.watchdog_timeout_secs) {
            return Err(ConfigError::ValidationFailed(
                "watchdog_timeout_secs must be 5-300",
            ));
        }
        Ok(())
    }

    /// Parse and validate a provisioned JSON document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_slice(bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate and serialise to JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, ConfigError> {
        self.validate()?;
        serde_json::to_vec(self).map_err(|_| ConfigError::IoError)
    }

    /// `mqtt://host:port` for the MQTT client.
    pub fn broker_url(&self) -> std::string::String {
        format!("mqtt://{}:{}", self.broker_host, self.broker_port)
    }

    pub fn link_poll_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.link_poll_interval_ms))
    }

    pub fn session_connect_retry(&self) -> Duration {
        Duration::from_millis(u64::from(self.session_connect_retry_ms))
    }

    pub fn session_reconnect_retry(&self) -> Duration {
        Duration::from_millis(u64::from(self.session_reconnect_retry_ms))
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.cycle_interval_ms))
    }
}
