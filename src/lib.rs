//! Machine-state monitor firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module; host builds get
//! simulation stubs in its place.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod latch;
pub mod pins;
pub mod retry;

pub mod adapters;
pub mod drivers;
