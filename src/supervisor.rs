//! Bounded-retry acquisition of the event interception handle. Tap creation
//! fails transiently while the user is still granting the accessibility
//! permission, so failures are retried silently on a fixed cadence and only
//! the exhausted budget is surfaced.

use std::thread;
use std::time::Duration;

use tracing::trace;

use crate::error::DaemonError;

#[derive(Debug, Copy, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// 300 attempts, one second apart: roughly five minutes for the user to
    /// click through the accessibility prompt.
    pub const DEFAULT: RetryPolicy = RetryPolicy {
        attempts: 300,
        delay: Duration::from_secs(1),
    };
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Runs `attempt` until it yields a handle, sleeping `policy.delay` after
/// each failure, for at most `policy.attempts` tries. Exhaustion reports
/// `InterceptionUnavailable` with the attempt count.
pub fn acquire_with_retry<T>(
    policy: RetryPolicy,
    mut attempt: impl FnMut() -> Option<T>,
) -> Result<T, DaemonError> {
    for tried in 1..=policy.attempts {
        if let Some(handle) = attempt() {
            return Ok(handle);
        }
        trace!(tried, "event tap creation failed; retrying");
        if !policy.delay.is_zero() {
            thread::sleep(policy.delay);
        }
    }
    Err(DaemonError::InterceptionUnavailable { attempts: policy.attempts })
}
