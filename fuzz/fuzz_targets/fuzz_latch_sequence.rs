//! Fuzz target: latch engine over arbitrary relay histories
//!
//! Each input byte is one sample (bit 0 = line A, bit 1 = line B;
//! bit 2 set = evaluate the rules one at a time instead of as a batch).
//! Verifies:
//! - No panics
//! - At most one event per latch per sample
//! - Forward and reverse are never active together
//! - Every event formats to a topic under both schemes
//!
//! cargo fuzz run fuzz_latch_sequence

#![no_main]

use libfuzzer_sys::fuzz_target;
use machmon::app::publisher::EventPublisher;
use machmon::config::TopicScheme;
use machmon::latch::rules::RULES;
use machmon::latch::sample::Sample;
use machmon::latch::{Condition, Events, MachineState};

fuzz_target!(|data: &[u8]| {
    let legacy = EventPublisher::new("fanuc", TopicScheme::Legacy).unwrap();
    let distinct = EventPublisher::new("fanuc", TopicScheme::Distinct).unwrap();
    let mut m = MachineState::new();

    for &byte in data {
        let s = Sample::from_bits(byte & 0b01 != 0, byte & 0b10 != 0);

        let events: Events = if byte & 0b100 != 0 {
            RULES.iter().filter_map(|r| m.apply(r, s)).collect()
        } else {
            m.evaluate(s)
        };

        assert!(events.len() <= Condition::COUNT);
        for c in Condition::ALL {
            assert!(events.iter().filter(|e| e.condition == c).count() <= 1);
        }
        assert!(!(m.forward_active() && m.reverse_active()));

        for e in &events {
            assert!(legacy.topic(e).is_ok());
            assert!(distinct.topic(e).is_ok());
        }
    }
});
