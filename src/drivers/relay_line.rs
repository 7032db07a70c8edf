//! Relay sense line driver.
//!
//! One [`RelayLine`] per GPIO, exposed through `embedded_hal::digital::InputPin`
//! so the input adapter stays generic over any HAL pin.  On host builds the
//! level is a settable field, which lets integration tests and the fuzzer
//! drive the adapter without hardware.

use core::fmt;

use embedded_hal::digital::{ErrorKind, ErrorType, InputPin};

#[cfg(target_os = "espidf")]
use super::hw_init::gpio_read;

/// A failed level read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayLineError {
    pub pin: i32,
}

impl fmt::Display for RelayLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{} read failed", self.pin)
    }
}

impl embedded_hal::digital::Error for RelayLineError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct RelayLine {
    pin: i32,
    #[cfg(not(target_os = "espidf"))]
    sim_level: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_fail_reads: u32,
}

impl RelayLine {
    /// Wrap an already-configured input GPIO (see [`super::hw_init`]).
    pub fn new(pin: i32) -> Self {
        Self {
            pin,
            #[cfg(not(target_os = "espidf"))]
            sim_level: false,
            #[cfg(not(target_os = "espidf"))]
            sim_fail_reads: 0,
        }
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }

    #[cfg(target_os = "espidf")]
    fn read_level(&mut self) -> Result<bool, RelayLineError> {
        Ok(gpio_read(self.pin))
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_level(&mut self) -> Result<bool, RelayLineError> {
        if self.sim_fail_reads > 0 {
            self.sim_fail_reads -= 1;
            return Err(RelayLineError { pin: self.pin });
        }
        Ok(self.sim_level)
    }
}

#[cfg(not(target_os = "espidf"))]
impl RelayLine {
    pub fn sim_set_level(&mut self, high: bool) {
        self.sim_level = high;
    }

    /// Fail the next `n` reads.
    pub fn sim_fail_reads(&mut self, n: u32) {
        self.sim_fail_reads = n;
    }
}

impl ErrorType for RelayLine {
    type Error = RelayLineError;
}

impl InputPin for RelayLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.read_level()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.read_level().map(|high| !high)
    }
}
