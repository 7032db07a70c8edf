//! Unified error types for the machmon firmware.
//!
//! One enum per concern (link, session, publish) plus a top-level
//! [`Error`] that every subsystem converts into.  All variants are `Copy`
//! so they pass through the retry loops and log calls without allocation.

use core::fmt;

use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible bring-up or connectivity operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The network link could not be configured or joined.
    Link(LinkError),
    /// The broker session failed.
    Session(SessionError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// Peripheral or driver initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Session(e) => write!(f, "session: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    /// The WiFi driver returned a non-OK status code.
    Driver(i32),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::Driver(rc) => write!(f, "WiFi driver error (rc={rc})"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Session errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// No broker session is established.
    NotConnected,
    /// The broker refused or the client could not be created.
    ConnectFailed(i32),
    /// No CONNACK arrived within the connect window.
    Timeout,
    /// A single publish was rejected by the client.
    PublishRejected(i32),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected to broker"),
            Self::ConnectFailed(rc) => write!(f, "broker connect failed (rc={rc})"),
            Self::Timeout => write!(f, "broker connect timed out"),
            Self::PublishRejected(rc) => write!(f, "publish rejected (rc={rc})"),
        }
    }
}

impl From<SessionError> for Error {
    fn from(e: SessionError) -> Self {
        Self::Session(e)
    }
}

// ---------------------------------------------------------------------------
// Publish errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    /// The session rejected the send.
    Session(SessionError),
    /// The topic did not fit its fixed-capacity buffer.
    TopicOverflow,
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session(e) => write!(f, "{e}"),
            Self::TopicOverflow => write!(f, "topic exceeds buffer capacity"),
        }
    }
}

impl From<SessionError> for PublishError {
    fn from(e: SessionError) -> Self {
        Self::Session(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
