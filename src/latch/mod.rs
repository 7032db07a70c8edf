//! Edge-triggered latch engine.
//!
//! Three independent latches track "an ON event has been sent for this
//! condition and not yet closed".  Inputs are level-triggered, output is
//! edge-triggered:
//!
//! ```text
//!   sample ──▶ rule.activates?   && !active ──▶ active = true  ──▶ Edge::On
//!          └─▶ rule.deactivates? &&  active ──▶ active = false ──▶ Edge::Off
//! ```
//!
//! A latch compares the current sample against its own flag only, never
//! against the other latches.  Repeating an identical sample is a no-op.
//! [`MachineState`] lives for the whole process and is never reset by a
//! reconnect, so current state is not re-announced after an outage.

pub mod rules;
pub mod sample;

use log::info;

use rules::{LatchRule, RULES};
use sample::Sample;

// ---------------------------------------------------------------------------
// Condition identity
// ---------------------------------------------------------------------------

/// The three derived machine conditions.
/// Must stay in sync with the rule table in [`rules::RULES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Condition {
    Forward = 0,
    Reverse = 1,
    Idle = 2,
}

impl Condition {
    /// Total number of latches, used to size the table array.
    pub const COUNT: usize = 3;

    /// Fixed evaluation order.
    pub const ALL: [Self; Self::COUNT] = [Self::Forward, Self::Reverse, Self::Idle];

    /// Relay code used in the topic path.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Forward => "R01",
            Self::Reverse => "R02",
            Self::Idle => "R12",
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Direction of a latch transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Latch switched ON (activation).
    On,
    /// Latch switched OFF (deactivation).
    Off,
}

impl Edge {
    /// Wire payload for this edge.
    pub const fn payload(self) -> &'static str {
        match self {
            Self::On => "true",
            Self::Off => "false",
        }
    }
}

/// One latch transition, produced exactly once per edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateEvent {
    pub condition: Condition,
    pub edge: Edge,
}

impl StateEvent {
    pub const fn new(condition: Condition, edge: Edge) -> Self {
        Self { condition, edge }
    }
}

/// Up to one event per latch per evaluation.
pub type Events = heapless::Vec<StateEvent, { Condition::COUNT }>;

// ---------------------------------------------------------------------------
// Machine state
// ---------------------------------------------------------------------------

/// Latched booleans, all `false` at boot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineState {
    /// Indexed by `Condition as usize`.
    latches: [bool; Condition::COUNT],
}

impl MachineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate a single latch against `sample`.
    ///
    /// Returns the event if (and only if) the latch flipped.
    pub fn apply(&mut self, rule: &LatchRule, sample: Sample) -> Option<StateEvent> {
        let idx = rule.condition as usize;
        let active = self.latches[idx];

        let edge = if !active && (rule.activates)(sample) {
            Edge::On
        } else if active && (rule.deactivates)(sample) {
            Edge::Off
        } else {
            return None;
        };

        self.latches[idx] = edge == Edge::On;
        info!(
            "LATCH | {} {} (A={:?} B={:?})",
            rule.name,
            if edge == Edge::On { "ON" } else { "OFF" },
            sample.a,
            sample.b
        );
        Some(StateEvent::new(rule.condition, edge))
    }

    /// Evaluate all three latches against one sample, in table order.
    pub fn evaluate(&mut self, sample: Sample) -> Events {
        let mut events = Events::new();
        for rule in &RULES {
            if let Some(ev) = self.apply(rule, sample) {
                // Capacity equals the rule count; one event per rule at most.
                let pushed = events.push(ev);
                debug_assert!(pushed.is_ok());
            }
        }
        events
    }

    pub fn is_active(&self, condition: Condition) -> bool {
        self.latches[condition as usize]
    }

    pub fn forward_active(&self) -> bool {
        self.is_active(Condition::Forward)
    }

    pub fn reverse_active(&self) -> bool {
        self.is_active(Condition::Reverse)
    }

    pub fn idle_active(&self) -> bool {
        self.is_active(Condition::Idle)
    }
}
