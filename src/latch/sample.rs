//! Raw input levels as seen by the latch rules.

/// Logic level of a digital input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    High,
    Low,
}

impl Level {
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }

    pub const fn is_low(self) -> bool {
        matches!(self, Self::Low)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

/// The two relay sense lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    /// Relay 1 (forward-run contact).
    A,
    /// Relay 2 (reverse-run contact).
    B,
}

/// One reading of both lines.
///
/// The two levels are read back to back, not atomically; a glitch can
/// land between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sample {
    pub a: Level,
    pub b: Level,
}

impl Sample {
    pub const fn new(a: Level, b: Level) -> Self {
        Self { a, b }
    }

    /// Shorthand for tests and fuzzing: `true` = HIGH.
    pub const fn from_bits(a: bool, b: bool) -> Self {
        Self {
            a: if a { Level::High } else { Level::Low },
            b: if b { Level::High } else { Level::Low },
        }
    }
}
