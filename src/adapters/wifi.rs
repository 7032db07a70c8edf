//! WiFi station-mode adapter.
//!
//! Implements [`LinkPort`], the hexagonal boundary for the network link
//! underneath the broker session.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Rejoin policy
//!
//! The ESP-IDF station does not re-associate on its own after the AP
//! drops it.  While unassociated, every [`REJOIN_POLLS`]th poll re-issues
//! the join request.  Pacing of the polls belongs to the caller.

use log::{info, warn};

use crate::app::ports::LinkPort;
use crate::config::{MAX_PASSWORD_LEN, MAX_SSID_LEN, password_valid, ssid_valid};
use crate::error::LinkError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

/// Unassociated polls between join re-issues.
pub const REJOIN_POLLS: u32 = 10;

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<MAX_SSID_LEN>,
    password: heapless::String<MAX_PASSWORD_LEN>,
    /// Join requests issued since construction (begin + rejoins).
    joins: u32,
    unassociated_polls: u32,
    #[cfg(target_os = "espidf")]
    driver: EspWifi<'static>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimLink,
}

/// Simulated station: associates a fixed number of polls after a join.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
struct SimLink {
    joined: bool,
    associated: bool,
    polls_since_join: u32,
    join_after: u32,
    refuse_joins: u32,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(driver: EspWifi<'static>) -> Self {
        Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            joins: 0,
            unassociated_polls: 0,
            driver,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            joins: 0,
            unassociated_polls: 0,
            sim: SimLink::default(),
        }
    }

    /// Validate and store the station credentials.
    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), LinkError> {
        if !ssid_valid(ssid) {
            return Err(LinkError::InvalidSsid);
        }
        if !password_valid(password) {
            return Err(LinkError::InvalidPassword);
        }
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|()| LinkError::InvalidSsid)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|()| LinkError::InvalidPassword)?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Join requests issued so far, including automatic rejoins.
    pub fn joins(&self) -> u32 {
        self.joins
    }

    fn join(&mut self) -> Result<(), LinkError> {
        self.joins = self.joins.saturating_add(1);
        self.unassociated_polls = 0;
        self.platform_join()
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_join(&mut self) -> Result<(), LinkError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.as_str().try_into().map_err(|_| LinkError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| LinkError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });
        self.driver
            .set_configuration(&config)
            .map_err(|e| LinkError::Driver(e.code()))?;
        if !self.driver.is_started().unwrap_or(false) {
            self.driver.start().map_err(|e| LinkError::Driver(e.code()))?;
        }
        self.driver.connect().map_err(|e| LinkError::Driver(e.code()))
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_join(&mut self) -> Result<(), LinkError> {
        if self.sim.refuse_joins > 0 {
            self.sim.refuse_joins -= 1;
            return Err(LinkError::Driver(-1));
        }
        self.sim.joined = true;
        self.sim.polls_since_join = 0;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_associated(&mut self) -> bool {
        self.driver.is_connected().unwrap_or(false)
            && self.driver.sta_netif().is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_associated(&mut self) -> bool {
        if self.sim.associated {
            return true;
        }
        if !self.sim.joined {
            return false;
        }
        self.sim.polls_since_join += 1;
        if self.sim.polls_since_join > self.sim.join_after {
            self.sim.associated = true;
        }
        self.sim.associated
    }
}

// ── Simulation controls ───────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    /// Polls after a join before the simulated AP accepts the station.
    pub fn sim_set_join_after(&mut self, polls: u32) {
        self.sim.join_after = polls;
    }

    /// Fail the next `n` join requests with a driver error.
    pub fn sim_refuse_joins(&mut self, n: u32) {
        self.sim.refuse_joins = n;
    }

    /// Drop the association as if the AP went away.
    pub fn sim_drop(&mut self) {
        self.sim.associated = false;
        self.sim.joined = false;
        self.sim.polls_since_join = 0;
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// LinkPort
// ───────────────────────────────────────────────────────────────

impl LinkPort for WifiAdapter {
    fn begin(&mut self) -> Result<(), LinkError> {
        if self.ssid.is_empty() {
            return Err(LinkError::NoCredentials);
        }
        info!("WiFi: joining '{}'", self.ssid);
        self.join()
    }

    fn is_associated(&mut self) -> bool {
        if self.platform_is_associated() {
            self.unassociated_polls = 0;
            return true;
        }
        if self.joins == 0 {
            return false;
        }
        self.unassociated_polls += 1;
        if self.unassociated_polls >= REJOIN_POLLS {
            warn!(
                "WiFi: not associated after {} polls, re-issuing join",
                self.unassociated_polls
            );
            if let Err(e) = self.join() {
                warn!("WiFi: rejoin failed: {}", e);
            }
        }
        false
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
