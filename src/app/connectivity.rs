//! Connectivity manager: link first, then broker session.
//!
//! Owns the [`LinkPort`] and [`SessionPort`] adapters and is the only
//! code that touches them.  Both `ensure_*` calls block until success:
//! the device has no fallback transport, so a permanently unreachable
//! network blocks forever (the task watchdog is fed from the delay port
//! while waiting).
//!
//! ```text
//!   Disconnected ──ensure_link──▶ LinkUp ──ensure_session──▶ SessionUp
//!        ▲                          ▲                           │
//!        └──────── link lost ───────┴──────── session lost ─────┘
//! ```
//!
//! [`ConnectionState`] is never cached; [`ConnectivityManager::state`]
//! queries the adapters every call.

use core::time::Duration;

use log::{error, info, warn};

use crate::config::MAX_CLIENT_ID_LEN;
use crate::error::SessionError;
use crate::retry::{RetryPolicy, retry};

use super::ports::{DelayPort, LinkPort, SessionPort};

/// Live connectivity, re-derived on every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    LinkUp,
    SessionUp,
}

/// Retry intervals for the three blocking waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectTiming {
    /// Link association poll interval.
    pub link_poll: Duration,
    /// Broker retry interval used at boot.
    pub session_connect_retry: Duration,
    /// Broker retry interval used after a mid-loop session loss.
    pub session_reconnect_retry: Duration,
}

impl ConnectTiming {
    pub fn from_config(config: &crate::config::SystemConfig) -> Self {
        Self {
            link_poll: config.link_poll_interval(),
            session_connect_retry: config.session_connect_retry(),
            session_reconnect_retry: config.session_reconnect_retry(),
        }
    }
}

pub struct ConnectivityManager<L, S> {
    link: L,
    session: S,
    client_id: heapless::String<MAX_CLIENT_ID_LEN>,
    timing: ConnectTiming,
    session_losses: u32,
}

impl<L: LinkPort, S: SessionPort> ConnectivityManager<L, S> {
    /// `client_id` longer than [`MAX_CLIENT_ID_LEN`] is truncated.
    pub fn new(link: L, session: S, client_id: &str, timing: ConnectTiming) -> Self {
        let mut id = heapless::String::new();
        for ch in client_id.chars() {
            if id.push(ch).is_err() {
                warn!("Connectivity: client id truncated to {} bytes", MAX_CLIENT_ID_LEN);
                break;
            }
        }
        Self {
            link,
            session,
            client_id: id,
            timing,
            session_losses: 0,
        }
    }

    // ── Blocking establishment ────────────────────────────────

    /// Block until the network link reports associated.
    ///
    /// Issues one `begin()` (skipped if already associated), then polls
    /// at the link poll interval with no upper bound.  Returns the number
    /// of polls taken.
    pub fn ensure_link(&mut self, delay: &mut impl DelayPort) -> u32 {
        if self.link.is_associated() {
            return 0;
        }

        info!("Connectivity: joining network");
        if let Err(e) = self.link.begin() {
            error!("Connectivity: link begin failed: {}", e);
        }

        let link = &mut self.link;
        let outcome = retry(
            &RetryPolicy::forever(self.timing.link_poll),
            delay,
            |attempt| {
                let up = link.is_associated();
                if !up && attempt % 10 == 0 {
                    info!("Connectivity: still waiting for link ({} polls)", attempt);
                }
                up
            },
        );
        info!("Connectivity: link up after {} polls", outcome.attempts());
        outcome.attempts()
    }

    /// Block until the broker session reports connected, retrying every
    /// `retry_interval`.  Returns the number of connect attempts made.
    pub fn ensure_session(&mut self, retry_interval: Duration, delay: &mut impl DelayPort) -> u32 {
        if self.session.is_connected() {
            return 0;
        }

        let session = &mut self.session;
        let client_id = self.client_id.as_str();
        let outcome = retry(&RetryPolicy::forever(retry_interval), delay, |attempt| {
            info!("Connectivity: connecting to broker as '{}' (attempt {})", client_id, attempt);
            match session.connect(client_id) {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        "Connectivity: broker connect failed: {} (retry in {} ms)",
                        e,
                        retry_interval.as_millis()
                    );
                    false
                }
            }
        });
        info!("Connectivity: broker session up after {} attempts", outcome.attempts());
        outcome.attempts()
    }

    /// Mid-loop path: rejoin the link if it dropped, then the session at
    /// the faster reconnect interval.
    pub fn restore(&mut self, delay: &mut impl DelayPort) {
        self.session_losses = self.session_losses.saturating_add(1);
        warn!("Connectivity: broker session lost (#{}), reconnecting", self.session_losses);
        self.ensure_link(delay);
        self.ensure_session(self.timing.session_reconnect_retry, delay);
    }

    // ── Per-cycle operations ──────────────────────────────────

    /// One send on the current session.  Never retries.
    pub fn publish(&mut self, topic: &str, payload: &str) -> Result<(), SessionError> {
        if !self.session.is_connected() {
            return Err(SessionError::NotConnected);
        }
        self.session.publish(topic, payload.as_bytes())
    }

    /// Non-blocking liveness query.
    pub fn is_session_alive(&self) -> bool {
        self.session.is_connected()
    }

    /// Session housekeeping tick.
    pub fn poll(&mut self) {
        self.session.poll();
    }

    /// Re-derive the connection state from the adapters.
    pub fn state(&mut self) -> ConnectionState {
        if !self.link.is_associated() {
            ConnectionState::Disconnected
        } else if self.session.is_connected() {
            ConnectionState::SessionUp
        } else {
            ConnectionState::LinkUp
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn timing(&self) -> ConnectTiming {
        self.timing
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Mid-loop session losses since boot.
    pub fn session_losses(&self) -> u32 {
        self.session_losses
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }
}
