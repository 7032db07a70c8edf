//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService / ConnectivityManager (domain)
//! ```
//!
//! Driven adapters (GPIO lines, WiFi, MQTT, NVS, system clock) implement
//! these traits.  The domain consumes them via generics, so nothing under
//! `app/` or `latch/` touches hardware directly.

use core::fmt;
use core::time::Duration;

use crate::config::SystemConfig;
use crate::error::{LinkError, SessionError};
use crate::latch::sample::{Level, Line, Sample};

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: GPIO → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the two relay sense lines.
///
/// Reads are direct and non-blocking: no software debounce, no timeout.
pub trait InputPort {
    /// Read the current level of one line.
    fn read(&mut self, line: Line) -> Level;

    /// Read both lines back to back (A first).
    fn sample(&mut self) -> Sample {
        let a = self.read(Line::A);
        let b = self.read(Line::B);
        Sample { a, b }
    }
}

// ───────────────────────────────────────────────────────────────
// Link port (driven adapter: domain → WiFi station)
// ───────────────────────────────────────────────────────────────

/// The network association layer underneath the broker session.
pub trait LinkPort {
    /// Start (or restart) association with the configured network.
    /// Returns once the request is issued, not once associated.
    fn begin(&mut self) -> Result<(), LinkError>;

    /// Whether the link is associated and has an address.
    fn is_associated(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Session port (driven adapter: domain → MQTT client)
// ───────────────────────────────────────────────────────────────

/// The publish/subscribe session with the broker.
pub trait SessionPort {
    /// Attempt one session establishment.  Blocks for at most the
    /// adapter's connect window.
    fn connect(&mut self, client_id: &str) -> Result<(), SessionError>;

    /// Non-blocking liveness query.
    fn is_connected(&self) -> bool;

    /// Attempt one send.  Never retries internally.
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SessionError>;

    /// Per-cycle housekeeping (keep-alive, inbound dispatch).
    fn poll(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Delay port (driven adapter: domain → system timer)
// ───────────────────────────────────────────────────────────────

/// Blocking sleep.  The only way the firmware waits.
pub trait DelayPort {
    fn delay(&mut self, duration: Duration);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ provisioned config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST call [`SystemConfig::validate`] before persisting
/// and after loading; an invalid document is rejected, never clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`ConfigError::NotFound`] if nothing was provisioned.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&mut self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations and config validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot, not provisioned).
    NotFound,
    /// Stored config failed to deserialize.
    Corrupted,
    /// A config field failed validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
