//! Hardware adapter: bridges the two relay sense lines to [`InputPort`].
//!
//! Generic over any `embedded_hal` input pin so the same adapter serves
//! the ESP32 GPIO driver and host-side simulated lines.  A failed read
//! is logged and the line's last good level is returned, so a transient
//! driver error can never fabricate an edge.

use embedded_hal::digital::{Error as _, InputPin};
use log::warn;

use crate::app::ports::InputPort;
use crate::latch::sample::{Level, Line};

pub struct RelayInputs<A, B> {
    line_a: A,
    line_b: B,
    last: [Level; 2],
    read_errors: u32,
}

impl<A: InputPin, B: InputPin> RelayInputs<A, B> {
    /// Both lines start out assumed LOW until first read.
    pub fn new(line_a: A, line_b: B) -> Self {
        Self {
            line_a,
            line_b,
            last: [Level::Low; 2],
            read_errors: 0,
        }
    }

    /// Reads that failed since construction.
    pub fn read_errors(&self) -> u32 {
        self.read_errors
    }

    pub fn line_a_mut(&mut self) -> &mut A {
        &mut self.line_a
    }

    pub fn line_b_mut(&mut self) -> &mut B {
        &mut self.line_b
    }
}

fn slot(line: Line) -> usize {
    match line {
        Line::A => 0,
        Line::B => 1,
    }
}

impl<A: InputPin, B: InputPin> InputPort for RelayInputs<A, B> {
    fn read(&mut self, line: Line) -> Level {
        let result = match line {
            Line::A => self.line_a.is_high().map_err(|e| e.kind()),
            Line::B => self.line_b.is_high().map_err(|e| e.kind()),
        };
        let i = slot(line);
        match result {
            Ok(high) => {
                self.last[i] = Level::from(high);
            }
            Err(kind) => {
                self.read_errors = self.read_errors.saturating_add(1);
                warn!(
                    "Inputs: line {:?} read failed ({:?}), holding {:?}",
                    line, kind, self.last[i]
                );
            }
        }
        self.last[i]
    }
}
