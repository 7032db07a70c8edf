//! Application core: pure domain logic, zero I/O.
//!
//! Connectivity recovery, event publishing and the main loop driver.
//! All interaction with hardware and the network happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod connectivity;
pub mod ports;
pub mod publisher;
pub mod service;
