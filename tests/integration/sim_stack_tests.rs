//! End-to-end tests over the simulated adapters: relay GPIO lines, WiFi
//! station and MQTT broker, exactly as `main()` wires them on hardware.

use machmon::adapters::device_id::{read_mac, resolve_client_id};
use machmon::adapters::hardware::RelayInputs;
use machmon::adapters::mqtt::{MqttSession, SimPublish};
use machmon::adapters::wifi::WifiAdapter;
use machmon::app::connectivity::{ConnectTiming, ConnectionState, ConnectivityManager};
use machmon::app::service::MonitorService;
use machmon::config::SystemConfig;
use machmon::drivers::relay_line::RelayLine;
use machmon::pins;

use super::mock_hw::RecordingDelay;

type SimConn = ConnectivityManager<WifiAdapter, MqttSession>;
type SimInputs = RelayInputs<RelayLine, RelayLine>;

fn provisioned() -> SystemConfig {
    let mut cfg = SystemConfig::default();
    cfg.machine_id.clear();
    cfg.machine_id.push_str("lathe2").unwrap();
    cfg.wifi_ssid.clear();
    cfg.wifi_ssid.push_str("PlantFloor").unwrap();
    cfg.wifi_password.clear();
    cfg.wifi_password.push_str("hunter2hunter2").unwrap();
    cfg
}

fn stack(cfg: &SystemConfig) -> (MonitorService, SimInputs, SimConn, RecordingDelay) {
    let mut wifi = WifiAdapter::new();
    wifi.set_credentials(&cfg.wifi_ssid, &cfg.wifi_password).unwrap();
    wifi.sim_set_join_after(2);
    let mut session = MqttSession::new(&cfg.broker_url());
    session.sim_refuse_connects(1);

    let client_id = resolve_client_id(&cfg.client_id, &read_mac());
    let conn = ConnectivityManager::new(wifi, session, &client_id, ConnectTiming::from_config(cfg));
    let inputs = RelayInputs::new(
        RelayLine::new(pins::RELAY_A_GPIO),
        RelayLine::new(pins::RELAY_B_GPIO),
    );
    let svc = MonitorService::new(cfg).unwrap();
    (svc, inputs, conn, RecordingDelay::default())
}

fn msg(topic: &str, payload: &str) -> SimPublish {
    SimPublish {
        topic: topic.to_owned(),
        payload: payload.as_bytes().to_vec(),
    }
}

#[test]
fn boot_joins_wifi_and_broker_with_mac_client_id() {
    let cfg = provisioned();
    let (mut svc, _io, mut conn, mut delay) = stack(&cfg);

    svc.boot(&mut conn, &mut delay);

    assert_eq!(conn.state(), ConnectionState::SessionUp);
    assert_eq!(conn.link().joins(), 1);
    assert_eq!(conn.session().connects(), 2);
    assert_eq!(conn.session().sim_client_id(), "machmon-efcafe");
    assert_eq!(conn.session().broker_url(), cfg.broker_url());
}

#[test]
fn relay_edges_reach_the_broker() {
    let cfg = provisioned();
    let (mut svc, mut io, mut conn, mut delay) = stack(&cfg);
    svc.boot(&mut conn, &mut delay);

    // Both lines LOW at power-up: idle announced.
    svc.cycle(&mut io, &mut conn, &mut delay);
    io.line_a_mut().sim_set_level(true);
    svc.cycle(&mut io, &mut conn, &mut delay);

    assert_eq!(
        conn.session().sim_published(),
        &[
            msg("lathe2/R12/OFF", "true"),
            msg("lathe2/R01/ON", "true"),
            msg("lathe2/R12/OFF", "false"),
        ]
    );
}

#[test]
fn gpio_read_error_does_not_fabricate_an_edge() {
    let cfg = provisioned();
    let (mut svc, mut io, mut conn, mut delay) = stack(&cfg);
    svc.boot(&mut conn, &mut delay);

    io.line_a_mut().sim_set_level(true);
    svc.cycle(&mut io, &mut conn, &mut delay);
    let before = conn.session().sim_published().len();

    // Line A reads fail for a whole cycle while the pin actually drops.
    io.line_a_mut().sim_set_level(false);
    io.line_a_mut().sim_fail_reads(3);
    let r = svc.cycle(&mut io, &mut conn, &mut delay);
    assert!(r.events.is_empty());
    assert_eq!(conn.session().sim_published().len(), before);
    assert_eq!(io.read_errors(), 3);
}

#[test]
fn broker_drop_is_recovered_in_one_cycle() {
    let cfg = provisioned();
    let (mut svc, mut io, mut conn, mut delay) = stack(&cfg);
    svc.boot(&mut conn, &mut delay);
    svc.cycle(&mut io, &mut conn, &mut delay);

    conn.session_mut().sim_drop();
    let r = svc.cycle(&mut io, &mut conn, &mut delay);

    assert!(r.reconnected);
    assert!(conn.is_session_alive());
    assert_eq!(conn.link().joins(), 1);
}

#[test]
fn wifi_and_broker_drop_rejoins_both() {
    let cfg = provisioned();
    let (mut svc, mut io, mut conn, mut delay) = stack(&cfg);
    svc.boot(&mut conn, &mut delay);

    conn.link_mut().sim_drop();
    conn.session_mut().sim_drop();
    delay.waits.clear();
    svc.cycle(&mut io, &mut conn, &mut delay);

    assert_eq!(conn.link().joins(), 2);
    assert_eq!(conn.state(), ConnectionState::SessionUp);
    assert!(delay.waits.iter().all(|d| *d == cfg.link_poll_interval()));
}
