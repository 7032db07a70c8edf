//! Machine-state monitor firmware: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  RelayInputs    WifiAdapter   MqttSession   NvsConfigStore   │
//! │  (InputPort)    (LinkPort)    (SessionPort) (ConfigPort)     │
//! │  Esp32Clock + Watchdog (DelayPort)                           │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │  MonitorService (pure logic)                       │      │
//! │  │  latch rules · EventPublisher · Connectivity       │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Result;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use log::{info, warn};

use machmon::adapters::device_id;
use machmon::adapters::hardware::RelayInputs;
use machmon::adapters::mqtt::MqttSession;
use machmon::adapters::nvs::NvsConfigStore;
use machmon::adapters::time::Esp32Clock;
use machmon::adapters::wifi::WifiAdapter;
use machmon::app::connectivity::{ConnectTiming, ConnectivityManager};
use machmon::app::service::MonitorService;
use machmon::config::SystemConfig;
use machmon::drivers::hw_init;
use machmon::drivers::relay_line::RelayLine;
use machmon::drivers::watchdog::Watchdog;
use machmon::error::Error;
use machmon::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  machmon v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Relay inputs ───────────────────────────────────────
    hw_init::init_relay_inputs().map_err(|e| anyhow::anyhow!("relay input init: {e}"))?;
    let mut inputs = RelayInputs::new(
        RelayLine::new(pins::RELAY_A_GPIO),
        RelayLine::new(pins::RELAY_B_GPIO),
    );

    // ── 3. Config from NVS (or defaults) ──────────────────────
    let config = match NvsConfigStore::new() {
        Ok(store) => {
            let (cfg, stored) = store.load_or_default();
            info!("Config source: {}", if stored { "NVS" } else { "build defaults" });
            cfg
        }
        Err(e) => {
            warn!("NVS init failed ({}), running with build defaults", e);
            SystemConfig::default()
        }
    };
    config.validate().map_err(Error::from)?;

    let mut clock = Esp32Clock::with_watchdog(Watchdog::new(config.watchdog_timeout_secs));

    // ── 4. Network adapters ───────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;
    let driver = EspWifi::new(peripherals.modem, sysloop, Some(nvs_partition))?;

    let mut wifi = WifiAdapter::new(driver);
    wifi.set_credentials(&config.wifi_ssid, &config.wifi_password)
        .map_err(Error::from)?;

    let session = MqttSession::new(&config.broker_url());

    let mac = device_id::read_mac();
    let client_id = device_id::resolve_client_id(&config.client_id, &mac);
    info!("Client ID: {}", client_id);

    let mut conn = ConnectivityManager::new(
        wifi,
        session,
        &client_id,
        ConnectTiming::from_config(&config),
    );

    // ── 5. Monitor loop (never returns) ───────────────────────
    let mut service = MonitorService::new(&config).map_err(Error::from)?;
    info!(
        "Monitoring machine '{}' every {} ms",
        config.machine_id, config.cycle_interval_ms
    );
    service.run(&mut inputs, &mut conn, &mut clock)
}
