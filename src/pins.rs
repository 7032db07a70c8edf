//! GPIO pin assignments for the relay monitor board.
//!
//! Single source of truth: the line driver and peripheral bring-up both
//! reference this module rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Relay sense inputs
// ---------------------------------------------------------------------------

/// Line A: relay 1 contact (forward-run).  HIGH = relay energised.
pub const RELAY_A_GPIO: i32 = 4;
/// Line A uses the internal pull-down so an open contact reads LOW.
pub const RELAY_A_INTERNAL_PULLDOWN: bool = true;

/// Line B: relay 2 contact (reverse-run).  HIGH = relay energised.
pub const RELAY_B_GPIO: i32 = 5;
/// Line B is pulled to ground on the board; no internal pull.
pub const RELAY_B_INTERNAL_PULLDOWN: bool = false;

