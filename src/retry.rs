//! Fixed-delay retry policy.
//!
//! Every blocking "try until it works" loop in the firmware (link poll,
//! broker connect, CONNACK wait) goes through [`retry`], parameterised by
//! a [`RetryPolicy`].  `max_attempts = None` means retry forever: the call
//! only returns once the attempt succeeds.
//!
//! ```text
//!  attempt(1) ─fail─▶ delay ─▶ attempt(2) ─fail─▶ delay ─▶ … ─ok─▶ Succeeded
//! ```

use core::time::Duration;

use crate::app::ports::DelayPort;

/// How often and how many times to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause between consecutive attempts.
    pub delay: Duration,
    /// `None` = unbounded.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Retry with `delay` until success, however long that takes.
    pub const fn forever(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Retry with `delay`, giving up after `attempts` tries.
    pub const fn bounded(delay: Duration, attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: Some(attempts),
        }
    }
}

/// Result of a [`retry`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    /// The attempt closure returned `true` on attempt number `attempts`.
    Succeeded { attempts: u32 },
    /// A bounded policy ran out of attempts.
    Exhausted { attempts: u32 },
}

impl RetryOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn attempts(self) -> u32 {
        match self {
            Self::Succeeded { attempts } | Self::Exhausted { attempts } => attempts,
        }
    }
}

/// Run `attempt` until it returns `true` or the policy is exhausted.
///
/// `attempt` receives the 1-based attempt number.  No delay is taken
/// before the first attempt or after the last one.
pub fn retry<D, F>(policy: &RetryPolicy, delay: &mut D, mut attempt: F) -> RetryOutcome
where
    D: DelayPort + ?Sized,
    F: FnMut(u32) -> bool,
{
    let mut n: u32 = 0;
    loop {
        n = n.saturating_add(1);
        if attempt(n) {
            return RetryOutcome::Succeeded { attempts: n };
        }
        if policy.max_attempts.is_some_and(|max| n >= max) {
            return RetryOutcome::Exhausted { attempts: n };
        }
        delay.delay(policy.delay);
    }
}
