//! MQTT session adapter.
//!
//! Implements [`SessionPort`] over the ESP-IDF MQTT client.  QoS 0,
//! never retained: a state message either reaches the broker on the
//! live session or is gone.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`.
//!   The client runs on its own task; a callback mirrors CONNECTED /
//!   DISCONNECTED into an atomic flag which [`SessionPort::is_connected`]
//!   reads.  Auto-reconnect is disabled so recovery pacing stays with
//!   the connectivity manager.
//! - **all other targets**: an in-memory broker that records publishes.

use core::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::SessionPort;
use crate::error::SessionError;

#[cfg(target_os = "espidf")]
use std::sync::Arc;
#[cfg(target_os = "espidf")]
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};

#[cfg(target_os = "espidf")]
use crate::adapters::time::Esp32Clock;
#[cfg(target_os = "espidf")]
use crate::retry::{RetryPolicy, retry};

/// Keep-alive advertised to the broker.
pub const KEEP_ALIVE: Duration = Duration::from_secs(15);

/// How long one `connect()` waits for CONNACK.
pub const CONNACK_POLL: Duration = Duration::from_millis(50);
pub const CONNACK_POLLS: u32 = 60;

pub struct MqttSession {
    broker_url: std::string::String,
    connects: u32,
    #[cfg(target_os = "espidf")]
    client: Option<EspMqttClient<'static>>,
    #[cfg(target_os = "espidf")]
    connected: Arc<AtomicBool>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimBroker,
}

/// One message accepted by the simulated broker.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimPublish {
    pub topic: std::string::String,
    pub payload: Vec<u8>,
}

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
struct SimBroker {
    connected: bool,
    client_id: std::string::String,
    refuse_connects: u32,
    reject_publishes: u32,
    published: Vec<SimPublish>,
}

impl MqttSession {
    /// `broker_url` is `mqtt://host:port`.  Nothing is opened until
    /// [`SessionPort::connect`].
    pub fn new(broker_url: &str) -> Self {
        info!("MQTT: broker {}", broker_url);
        Self {
            broker_url: broker_url.to_owned(),
            connects: 0,
            #[cfg(target_os = "espidf")]
            client: None,
            #[cfg(target_os = "espidf")]
            connected: Arc::new(AtomicBool::new(false)),
            #[cfg(not(target_os = "espidf"))]
            sim: SimBroker::default(),
        }
    }

    pub fn broker_url(&self) -> &str {
        &self.broker_url
    }

    /// Connect attempts since construction.
    pub fn connects(&self) -> u32 {
        self.connects
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self, client_id: &str) -> Result<(), SessionError> {
        // Tear down any stale client before opening a new one.
        self.client = None;
        self.connected.store(false, Ordering::SeqCst);

        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            keep_alive_interval: Some(KEEP_ALIVE),
            disable_auto_reconnect: true,
            ..Default::default()
        };
        let flag = Arc::clone(&self.connected);
        let client = EspMqttClient::new_cb(&self.broker_url, &conf, move |event| {
            match event.payload() {
                EventPayload::Connected(_) => flag.store(true, Ordering::SeqCst),
                EventPayload::Disconnected => flag.store(false, Ordering::SeqCst),
                _ => {}
            }
        })
        .map_err(|e| SessionError::ConnectFailed(e.code()))?;

        let flag = &self.connected;
        let outcome = retry(
            &RetryPolicy::bounded(CONNACK_POLL, CONNACK_POLLS),
            &mut Esp32Clock::new(),
            |_| flag.load(Ordering::SeqCst),
        );
        if !outcome.is_success() {
            return Err(SessionError::Timeout);
        }
        self.client = Some(client);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self, client_id: &str) -> Result<(), SessionError> {
        if self.sim.refuse_connects > 0 {
            self.sim.refuse_connects -= 1;
            return Err(SessionError::ConnectFailed(5));
        }
        self.sim.connected = true;
        self.sim.client_id = client_id.to_owned();
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.client.is_some() && self.connected.load(Ordering::SeqCst)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim.connected
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SessionError> {
        let client = self.client.as_mut().ok_or(SessionError::NotConnected)?;
        client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .map(|_| ())
            .map_err(|e| SessionError::PublishRejected(e.code()))
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SessionError> {
        if self.sim.reject_publishes > 0 {
            self.sim.reject_publishes -= 1;
            return Err(SessionError::PublishRejected(-1));
        }
        self.sim.published.push(SimPublish {
            topic: topic.to_owned(),
            payload: payload.to_vec(),
        });
        Ok(())
    }
}

// ── Simulation controls ───────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl MqttSession {
    /// Refuse the next `n` connect attempts.
    pub fn sim_refuse_connects(&mut self, n: u32) {
        self.sim.refuse_connects = n;
    }

    /// Reject the next `n` publishes.
    pub fn sim_reject_publishes(&mut self, n: u32) {
        self.sim.reject_publishes = n;
    }

    /// Drop the session as if the broker went away.
    pub fn sim_drop(&mut self) {
        self.sim.connected = false;
    }

    pub fn sim_client_id(&self) -> &str {
        &self.sim.client_id
    }

    pub fn sim_published(&self) -> &[SimPublish] {
        &self.sim.published
    }
}

// ───────────────────────────────────────────────────────────────
// SessionPort
// ───────────────────────────────────────────────────────────────

impl SessionPort for MqttSession {
    fn connect(&mut self, client_id: &str) -> Result<(), SessionError> {
        self.connects = self.connects.saturating_add(1);
        self.platform_connect(client_id)?;
        info!("MQTT: connected as '{}'", client_id);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SessionError> {
        if !self.platform_is_connected() {
            return Err(SessionError::NotConnected);
        }
        self.platform_publish(topic, payload)
    }

    fn poll(&mut self) {
        // esp-mqtt services keep-alive on its own task; nothing to pump.
        if !self.platform_is_connected() {
            warn!("MQTT: session down at poll");
        } else {
            debug!("MQTT: poll");
        }
    }
}
