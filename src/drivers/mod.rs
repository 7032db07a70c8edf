//! Relay line driver, hardware initialisation, and the task watchdog.

pub mod hw_init;
pub mod relay_line;
pub mod watchdog;
