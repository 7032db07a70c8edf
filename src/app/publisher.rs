//! Event publisher: turns a [`StateEvent`] into a topic/payload pair and
//! hands it to the connectivity manager.
//!
//! Topic layout: `<machine_id>/<code>/<ON|OFF>`.  The topic buffer is a
//! fixed-capacity string sized from the longest machine id the config
//! accepts plus the longest suffix, so a validated config can never
//! truncate a topic.
//!
//! | Condition | ON edge        | OFF edge (Legacy) | OFF edge (Distinct) |
//! |-----------|----------------|-------------------|---------------------|
//! | Forward   | `<id>/R01/ON`  | `<id>/R01/ON`     | `<id>/R01/OFF`      |
//! | Reverse   | `<id>/R02/ON`  | `<id>/R02/ON`     | `<id>/R02/ON`       |
//! | Idle      | `<id>/R12/OFF` | `<id>/R12/OFF`    | `<id>/R12/OFF`      |
//!
//! Delivery is at-most-once: a failed publish is logged and dropped.

use core::fmt::Write;

use log::{info, warn};

use crate::app::ports::ConfigError;
use crate::config::{MAX_MACHINE_ID_LEN, TopicScheme, machine_id_valid};
use crate::error::PublishError;
use crate::latch::{Condition, Edge, StateEvent};

use super::connectivity::ConnectivityManager;
use super::ports::{LinkPort, SessionPort};

/// Longest `/<code>/<word>` suffix.
pub const MAX_SUFFIX_LEN: usize = 8;

/// Capacity of a topic buffer.
pub const TOPIC_CAPACITY: usize = MAX_MACHINE_ID_LEN + MAX_SUFFIX_LEN;

/// A fully formatted topic.
pub type Topic = heapless::String<TOPIC_CAPACITY>;

const fn suffix_len(code: &str, word: &str) -> usize {
    // "/" + code + "/" + word
    2 + code.len() + word.len()
}

const _: () = {
    let codes = [Condition::Forward.code(), Condition::Reverse.code(), Condition::Idle.code()];
    let mut i = 0;
    while i < codes.len() {
        assert!(suffix_len(codes[i], "OFF") <= MAX_SUFFIX_LEN);
        i += 1;
    }
};

/// Last topic segment for `event` under `scheme`.
pub fn state_word(event: &StateEvent, scheme: TopicScheme) -> &'static str {
    match (event.condition, event.edge, scheme) {
        (Condition::Forward, Edge::Off, TopicScheme::Distinct) => "OFF",
        (Condition::Forward | Condition::Reverse, _, _) => "ON",
        (Condition::Idle, _, _) => "OFF",
    }
}

pub struct EventPublisher {
    machine_id: heapless::String<MAX_MACHINE_ID_LEN>,
    scheme: TopicScheme,
    delivered: u64,
    dropped: u64,
}

impl EventPublisher {
    pub fn new(machine_id: &str, scheme: TopicScheme) -> Result<Self, ConfigError> {
        if !machine_id_valid(machine_id) {
            return Err(ConfigError::ValidationFailed("machine_id not usable as a topic segment"));
        }
        let mut id = heapless::String::new();
        id.push_str(machine_id)
            .map_err(|()| ConfigError::ValidationFailed("machine_id too long"))?;
        Ok(Self {
            machine_id: id,
            scheme,
            delivered: 0,
            dropped: 0,
        })
    }

    /// Build the topic for `event`.
    pub fn topic(&self, event: &StateEvent) -> Result<Topic, PublishError> {
        let mut topic = Topic::new();
        write!(
            topic,
            "{}/{}/{}",
            self.machine_id,
            event.condition.code(),
            state_word(event, self.scheme)
        )
        .map_err(|_| PublishError::TopicOverflow)?;
        Ok(topic)
    }

    /// Publish `event` once.  Returns `true` if the session accepted it.
    ///
    /// Failures are logged and swallowed; the event is not queued.
    pub fn emit<L: LinkPort, S: SessionPort>(
        &mut self,
        event: &StateEvent,
        conn: &mut ConnectivityManager<L, S>,
    ) -> bool {
        let result = self
            .topic(event)
            .and_then(|topic| {
                conn.publish(&topic, event.edge.payload())
                    .map(|()| topic)
                    .map_err(PublishError::from)
            });

        match result {
            Ok(topic) => {
                self.delivered += 1;
                info!("PUB | {} = {}", topic, event.edge.payload());
                true
            }
            Err(e) => {
                self.dropped += 1;
                warn!(
                    "PUB | failed to publish {:?} {:?}: {} (dropped)",
                    event.condition, event.edge, e
                );
                false
            }
        }
    }

    pub fn machine_id(&self) -> &str {
        &self.machine_id
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
