//! Mock adapters for integration tests.
//!
//! Every port the monitor touches is replaced by a scriptable fake that
//! records what happened, so tests can assert on the full publish and
//! delay history without a network or GPIO.

use std::collections::VecDeque;
use std::time::Duration;

use machmon::app::connectivity::{ConnectTiming, ConnectivityManager};
use machmon::app::ports::{DelayPort, InputPort, LinkPort, SessionPort};
use machmon::error::{LinkError, SessionError};
use machmon::latch::sample::{Level, Line, Sample};

// ── MockInputs ────────────────────────────────────────────────

/// Relay lines held at a settable level.  `glitches` overrides the next
/// whole-sample reads, one entry per call, to model a line changing
/// between the per-rule samples of one cycle.
pub struct MockInputs {
    pub current: Sample,
    pub glitches: VecDeque<Sample>,
    pub reads: u32,
}

#[allow(dead_code)]
impl MockInputs {
    pub fn new() -> Self {
        Self {
            current: Sample::from_bits(false, false),
            glitches: VecDeque::new(),
            reads: 0,
        }
    }

    pub fn set(&mut self, a: bool, b: bool) {
        self.current = Sample::from_bits(a, b);
    }
}

impl InputPort for MockInputs {
    fn read(&mut self, line: Line) -> Level {
        self.reads += 1;
        match line {
            Line::A => self.current.a,
            Line::B => self.current.b,
        }
    }

    fn sample(&mut self) -> Sample {
        match self.glitches.pop_front() {
            Some(s) => {
                self.reads += 2;
                s
            }
            None => {
                let a = self.read(Line::A);
                let b = self.read(Line::B);
                Sample::new(a, b)
            }
        }
    }
}

// ── MockLink ──────────────────────────────────────────────────

pub struct MockLink {
    pub associated: bool,
    pub begins: u32,
    pub polls: u32,
    /// Polls after `begin()` before association succeeds.
    pub join_after: u32,
    polls_since_begin: u32,
}

#[allow(dead_code)]
impl MockLink {
    pub fn up() -> Self {
        Self {
            associated: true,
            begins: 0,
            polls: 0,
            join_after: 0,
            polls_since_begin: 0,
        }
    }

    pub fn down(join_after: u32) -> Self {
        Self {
            associated: false,
            join_after,
            ..Self::up()
        }
    }
}

impl LinkPort for MockLink {
    fn begin(&mut self) -> Result<(), LinkError> {
        self.begins += 1;
        self.polls_since_begin = 0;
        Ok(())
    }

    fn is_associated(&mut self) -> bool {
        self.polls += 1;
        if !self.associated && self.begins > 0 {
            self.polls_since_begin += 1;
            if self.polls_since_begin > self.join_after {
                self.associated = true;
            }
        }
        self.associated
    }
}

// ── MockSession ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
}

pub struct MockSession {
    pub connected: bool,
    pub connects: u32,
    pub fail_connects: u32,
    pub fail_publishes: u32,
    pub polls: u32,
    pub attempts: u32,
    pub published: Vec<Published>,
}

#[allow(dead_code)]
impl MockSession {
    pub fn new() -> Self {
        Self {
            connected: false,
            connects: 0,
            fail_connects: 0,
            fail_publishes: 0,
            polls: 0,
            attempts: 0,
            published: Vec::new(),
        }
    }

    pub fn take(&mut self) -> Vec<(String, String)> {
        self.published
            .drain(..)
            .map(|p| (p.topic, p.payload))
            .collect()
    }
}

impl SessionPort for MockSession {
    fn connect(&mut self, _client_id: &str) -> Result<(), SessionError> {
        self.connects += 1;
        if self.fail_connects > 0 {
            self.fail_connects -= 1;
            return Err(SessionError::ConnectFailed(-2));
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SessionError> {
        self.attempts += 1;
        if self.fail_publishes > 0 {
            self.fail_publishes -= 1;
            return Err(SessionError::PublishRejected(-1));
        }
        self.published.push(Published {
            topic: topic.to_owned(),
            payload: String::from_utf8_lossy(payload).into_owned(),
        });
        Ok(())
    }

    fn poll(&mut self) {
        self.polls += 1;
    }
}

// ── RecordingDelay ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDelay {
    pub waits: Vec<Duration>,
}

#[allow(dead_code)]
impl RecordingDelay {
    pub fn total(&self) -> Duration {
        self.waits.iter().sum()
    }
}

impl DelayPort for RecordingDelay {
    fn delay(&mut self, duration: Duration) {
        self.waits.push(duration);
    }
}

// ── Helpers ───────────────────────────────────────────────────

pub type MockConn = ConnectivityManager<MockLink, MockSession>;

pub fn default_timing() -> ConnectTiming {
    ConnectTiming {
        link_poll: Duration::from_secs(1),
        session_connect_retry: Duration::from_secs(5),
        session_reconnect_retry: Duration::from_secs(1),
    }
}

#[allow(dead_code)]
pub fn mock_conn(link: MockLink) -> MockConn {
    ConnectivityManager::new(link, MockSession::new(), "machmon-test", default_timing())
}
