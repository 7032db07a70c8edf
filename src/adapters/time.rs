//! ESP32 clock adapter.
//!
//! Implements [`DelayPort`], the only way the firmware waits.  On ESP-IDF
//! `std::thread::sleep` yields to FreeRTOS; on the host it is a plain
//! thread sleep.
//!
//! Long sleeps are sliced so an attached [`Watchdog`] is fed at least
//! every [`FEED_SLICE`], whatever the retry interval.

use core::time::Duration;

use crate::app::ports::DelayPort;
use crate::drivers::watchdog::Watchdog;

/// Longest uninterrupted sleep between watchdog feeds.
pub const FEED_SLICE: Duration = Duration::from_secs(1);

pub struct Esp32Clock {
    watchdog: Option<Watchdog>,
}

impl Default for Esp32Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32Clock {
    pub fn new() -> Self {
        Self { watchdog: None }
    }

    /// Feed `watchdog` from every delay.
    pub fn with_watchdog(watchdog: Watchdog) -> Self {
        Self {
            watchdog: Some(watchdog),
        }
    }

    pub fn watchdog(&self) -> Option<&Watchdog> {
        self.watchdog.as_ref()
    }

    fn feed(&self) {
        if let Some(wdt) = &self.watchdog {
            wdt.feed();
        }
    }
}

impl DelayPort for Esp32Clock {
    fn delay(&mut self, duration: Duration) {
        let mut remaining = duration;
        self.feed();
        while !remaining.is_zero() {
            let step = remaining.min(FEED_SLICE);
            std::thread::sleep(step);
            remaining -= step;
            self.feed();
        }
    }
}
