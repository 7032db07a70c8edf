//! Latch predicates and the static rule table.
//!
//! Each latch is defined by two plain `fn` pointers over a [`Sample`]:
//! one that may switch it ON, one that may switch it OFF.  The engine
//! guards both identically (`!active && activates`, `active &&
//! deactivates`), so a predicate that keeps holding never fires twice.
//!
//! ```text
//!   A    B   │ forward  reverse  idle
//!  ──────────┼────────────────────────
//!   LOW  LOW │   off      off     ON
//!   LOW  HIGH│   off      ON      off
//!   HIGH LOW │   ON       off     off
//!   HIGH HIGH│   off      ON      off
//! ```

use super::Condition;
use super::sample::Sample;

/// Signature shared by every activation / deactivation predicate.
pub type PredicateFn = fn(Sample) -> bool;

/// Static descriptor for one latch.
pub struct LatchRule {
    pub condition: Condition,
    pub name: &'static str,
    pub activates: PredicateFn,
    pub deactivates: PredicateFn,
}

/// Rules in evaluation order: forward, reverse, idle.
pub const RULES: [LatchRule; Condition::COUNT] = [
    // Index 0: Forward
    LatchRule {
        condition: Condition::Forward,
        name: "forward-run",
        activates: forward_activates,
        deactivates: forward_deactivates,
    },
    // Index 1: Reverse
    LatchRule {
        condition: Condition::Reverse,
        name: "reverse-run",
        activates: reverse_activates,
        deactivates: reverse_deactivates,
    },
    // Index 2: Idle
    LatchRule {
        condition: Condition::Idle,
        name: "idle",
        activates: idle_activates,
        deactivates: idle_deactivates,
    },
];

/// Look up the rule for `condition`.
pub fn rule(condition: Condition) -> &'static LatchRule {
    &RULES[condition as usize]
}

// ── Forward ───────────────────────────────────────────────────

fn forward_activates(s: Sample) -> bool {
    s.a.is_high() && s.b.is_low()
}

fn forward_deactivates(s: Sample) -> bool {
    s.a.is_low() || s.b.is_high()
}

// ── Reverse (line B only) ─────────────────────────────────────

fn reverse_activates(s: Sample) -> bool {
    s.b.is_high()
}

fn reverse_deactivates(s: Sample) -> bool {
    s.b.is_low()
}

// ── Idle ──────────────────────────────────────────────────────

fn idle_activates(s: Sample) -> bool {
    s.a.is_low() && s.b.is_low()
}

fn idle_deactivates(s: Sample) -> bool {
    !idle_activates(s)
}
