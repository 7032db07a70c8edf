//! Device identity derived from the ESP32 factory MAC address.
//!
//! The broker client id defaults to `machmon-xxyyzz` (last 3 bytes of the
//! 6-byte MAC, lowercase hex), so every board gets a distinct, stable
//! session identity without provisioning.  A non-empty `client_id` in the
//! provisioned config overrides it.

use core::fmt::Write;

use crate::config::MAX_CLIENT_ID_LEN;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

pub type ClientId = heapless::String<MAX_CLIENT_ID_LEN>;

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: writes exactly six bytes into `mac`.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// `machmon-xxyyzz` from the last 3 MAC bytes.
pub fn client_id(mac: &MacAddress) -> ClientId {
    let mut id = ClientId::new();
    let _ = write!(id, "machmon-{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
    id
}

/// The configured id if set, otherwise the MAC-derived one.
pub fn resolve_client_id(configured: &str, mac: &MacAddress) -> ClientId {
    if configured.is_empty() {
        return client_id(mac);
    }
    let mut id = ClientId::new();
    let _ = id.push_str(configured);
    id
}
