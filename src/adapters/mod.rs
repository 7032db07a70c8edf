//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements   | Connects to                 |
//! |-------------|--------------|-----------------------------|
//! | `hardware`  | InputPort    | Relay sense GPIOs           |
//! | `wifi`      | LinkPort     | ESP-IDF WiFi STA            |
//! | `mqtt`      | SessionPort  | ESP-IDF MQTT client         |
//! | `nvs`       | ConfigPort   | NVS / in-memory store       |
//! | `time`      | DelayPort    | FreeRTOS sleep + TWDT feed  |
//! | `device_id` | (helper)     | eFuse factory MAC           |

pub mod device_id;
pub mod hardware;
pub mod mqtt;
pub mod nvs;
pub mod time;
pub mod wifi;
