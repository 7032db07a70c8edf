//! Integration tests for provisioning: the NVS config store feeding the
//! monitor service and connectivity timing.

use std::time::Duration;

use machmon::adapters::nvs::NvsConfigStore;
use machmon::app::connectivity::ConnectTiming;
use machmon::app::ports::{ConfigError, ConfigPort};
use machmon::app::service::MonitorService;
use machmon::config::{SystemConfig, TopicScheme};

const DOC: &[u8] = br#"{
    "machine_id": "press7",
    "topic_scheme": "distinct",
    "wifi_ssid": "Shop",
    "wifi_password": "correcthorse",
    "broker_host": "mq.shop.local",
    "broker_port": 8883,
    "session_reconnect_retry_ms": 2500,
    "cycle_interval_ms": 500
}"#;

#[test]
fn provisioned_document_drives_service_and_timing() {
    let store = NvsConfigStore::new().unwrap();
    store.sim_put_raw(DOC);

    let (cfg, stored) = store.load_or_default();
    assert!(stored);
    assert_eq!(cfg.topic_scheme, TopicScheme::Distinct);
    assert_eq!(cfg.broker_url(), "mqtt://mq.shop.local:8883");

    let svc = MonitorService::new(&cfg).unwrap();
    assert_eq!(svc.cycle_interval(), Duration::from_millis(500));

    let timing = ConnectTiming::from_config(&cfg);
    assert_eq!(timing.session_reconnect_retry, Duration::from_millis(2500));
    assert_eq!(timing.session_connect_retry, Duration::from_secs(5));
    assert_eq!(timing.link_poll, Duration::from_secs(1));
}

#[test]
fn out_of_range_document_is_rejected_not_clamped() {
    let store = NvsConfigStore::new().unwrap();
    store.sim_put_raw(br#"{"wifi_ssid":"Shop","broker_host":"h","cycle_interval_ms":10}"#);
    assert!(matches!(store.load(), Err(ConfigError::ValidationFailed(_))));

    let (cfg, stored) = store.load_or_default();
    assert!(!stored);
    assert_eq!(cfg.cycle_interval_ms, 1000);
}

#[test]
fn saved_config_survives_reload() {
    let mut store = NvsConfigStore::new().unwrap();
    let mut cfg = SystemConfig::from_json(DOC).unwrap();
    cfg.watchdog_timeout_secs = 60;
    store.save(&cfg).unwrap();
    assert_eq!(store.load().unwrap(), cfg);
}

#[test]
fn unknown_topic_scheme_is_corrupted() {
    let store = NvsConfigStore::new().unwrap();
    store.sim_put_raw(br#"{"wifi_ssid":"Shop","broker_host":"h","topic_scheme":"fancy"}"#);
    assert_eq!(store.load(), Err(ConfigError::Corrupted));
}
