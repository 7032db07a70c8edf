//! Monitor service: the main loop driver.
//!
//! [`MonitorService`] owns the latch state and the publisher and
//! sequences one cycle per tick.  All I/O flows through port traits
//! injected at call sites, so the whole loop runs against mocks.
//!
//! ```text
//!  Booting ─▶ Connecting(Link) ─▶ Connecting(Session) ─▶ Running ─┐
//!                                        ▲                         │
//!                                        └──── session lost ───────┘
//! ```
//!
//! One cycle:
//! 1. For each latch (forward, reverse, idle): fresh sample → evaluate →
//!    publish any edge.
//! 2. If the session is dead, restore it (blocks until it is back).
//! 3. Session housekeeping.
//!
//! Pacing (step 4) lives in [`MonitorService::run`].  Events are produced
//! regardless of connectivity; ones that cannot be delivered are dropped,
//! never replayed.

use core::time::Duration;

use log::info;

use crate::config::SystemConfig;
use crate::latch::rules::RULES;
use crate::latch::{Condition, Events, MachineState};

use super::connectivity::ConnectivityManager;
use super::ports::{ConfigError, DelayPort, InputPort, LinkPort, SessionPort};
use super::publisher::EventPublisher;

/// Cycles between periodic status lines.
const STATUS_EVERY_CYCLES: u64 = 300;

/// Where the driver is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Booting,
    ConnectingLink,
    ConnectingSession,
    Running,
}

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Edges detected this cycle, in evaluation order.
    pub events: Events,
    /// Of those, how many the session accepted.
    pub delivered: u8,
    /// Of those, how many were dropped.
    pub failed: u8,
    /// Whether the session had to be restored.
    pub reconnected: bool,
}

pub struct MonitorService {
    machine: MachineState,
    publisher: EventPublisher,
    cycle_interval: Duration,
    phase: Phase,
    cycles: u64,
    events: u64,
}

impl MonitorService {
    /// Construct from configuration.  Does not touch the network.
    pub fn new(config: &SystemConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            machine: MachineState::new(),
            publisher: EventPublisher::new(&config.machine_id, config.topic_scheme)?,
            cycle_interval: config.cycle_interval(),
            phase: Phase::Booting,
            cycles: 0,
            events: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bring up link then session; returns once the session is up.
    pub fn boot<L: LinkPort, S: SessionPort>(
        &mut self,
        conn: &mut ConnectivityManager<L, S>,
        delay: &mut impl DelayPort,
    ) {
        info!("MonitorService: booting (machine '{}')", self.publisher.machine_id());
        self.phase = Phase::ConnectingLink;
        conn.ensure_link(delay);
        self.phase = Phase::ConnectingSession;
        conn.ensure_session(conn.timing().session_connect_retry, delay);
        self.phase = Phase::Running;
        info!("MonitorService: running");
    }

    /// Boot, then cycle forever with fixed pacing.
    pub fn run<L: LinkPort, S: SessionPort>(
        &mut self,
        inputs: &mut impl InputPort,
        conn: &mut ConnectivityManager<L, S>,
        delay: &mut impl DelayPort,
    ) -> ! {
        self.boot(conn, delay);
        loop {
            self.cycle(inputs, conn, delay);
            delay.delay(self.cycle_interval);
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full cycle: sample → latches → publish → liveness → housekeeping.
    pub fn cycle<L: LinkPort, S: SessionPort>(
        &mut self,
        inputs: &mut impl InputPort,
        conn: &mut ConnectivityManager<L, S>,
        delay: &mut impl DelayPort,
    ) -> CycleReport {
        self.cycles += 1;
        let mut report = CycleReport::default();

        // 1. Latches, each on a fresh sample.
        for rule in &RULES {
            let sample = inputs.sample();
            if let Some(event) = self.machine.apply(rule, sample) {
                if self.publisher.emit(&event, conn) {
                    report.delivered += 1;
                } else {
                    report.failed += 1;
                }
                let pushed = report.events.push(event);
                debug_assert!(pushed.is_ok());
            }
        }
        self.events += report.events.len() as u64;

        // 2. Liveness.
        if !conn.is_session_alive() {
            self.phase = Phase::ConnectingSession;
            conn.restore(delay);
            self.phase = Phase::Running;
            report.reconnected = true;
        }

        // 3. Housekeeping.
        conn.poll();

        if self.cycles % STATUS_EVERY_CYCLES == 0 {
            info!(
                "STATUS | cycles={} events={} delivered={} dropped={} losses={} fwd={} rev={} idle={}",
                self.cycles,
                self.events,
                self.publisher.delivered(),
                self.publisher.dropped(),
                conn.session_losses(),
                self.machine.forward_active(),
                self.machine.reverse_active(),
                self.machine.idle_active(),
            );
        }

        report
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn machine(&self) -> &MachineState {
        &self.machine
    }

    pub fn is_active(&self, condition: Condition) -> bool {
        self.machine.is_active(condition)
    }

    /// Cycles run since boot.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Edges detected since boot (delivered or not).
    pub fn events(&self) -> u64 {
        self.events
    }

    pub fn delivered(&self) -> u64 {
        self.publisher.delivered()
    }

    pub fn dropped(&self) -> u64 {
        self.publisher.dropped()
    }

    pub fn cycle_interval(&self) -> Duration {
        self.cycle_interval
    }
}
