//! Fuzz target: provisioned config document parser
//!
//! Drives `SystemConfig::from_json` with arbitrary bytes and verifies:
//! - No panics under arbitrary input
//! - Anything accepted passes validation and survives a save/load cycle
//! - Anything accepted yields a usable publisher
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use machmon::app::publisher::EventPublisher;
use machmon::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(cfg) = SystemConfig::from_json(data) else {
        return;
    };

    assert!(cfg.validate().is_ok());
    assert!(EventPublisher::new(&cfg.machine_id, cfg.topic_scheme).is_ok());

    let bytes = cfg.to_json().expect("validated config must serialise");
    let again = SystemConfig::from_json(&bytes).expect("serialised config must reparse");
    assert_eq!(cfg, again);
});
