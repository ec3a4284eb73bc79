//! Retry with linear backoff.
//!
//! `invoke` calls the operation up to `attempts` times. Before retry `k`
//! (1-based) it sleeps `delay * k`. When every attempt fails the caller gets
//! [`RouteScoutError::RetryExhausted`] carrying the last cause.

use crate::core::error::RouteScoutError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::thread;
use std::time::Duration;
use tracing::{error, warn};

pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FallbackPolicy {
    pub attempts: u32,
    pub delay_ms: u64,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

impl FallbackPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts,
            delay_ms: delay.as_millis().try_into().unwrap_or(u64::MAX),
        }
    }

    /// Delay before retry `k` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        Duration::from_millis(self.delay_ms.saturating_mul(u64::from(retry)))
    }

    /// Run `f(data)` until it succeeds or the attempts are used up.
    pub fn invoke<D, R, E, F>(&self, operation: &str, mut f: F, data: &D) -> Result<R, RouteScoutError>
    where
        D: ?Sized,
        E: Display,
        F: FnMut(&D) -> Result<R, E>,
    {
        let attempts = self.attempts.max(1);
        let mut last_cause = String::new();
        for attempt in 1..=attempts {
            if attempt > 1 {
                let wait = self.backoff(attempt - 1);
                warn!(operation, attempt, wait_ms = wait.as_millis() as u64, cause = %last_cause, "retrying");
                thread::sleep(wait);
            }
            match f(data) {
                Ok(value) => return Ok(value),
                Err(e) => last_cause = e.to_string(),
            }
        }
        error!(operation, attempts, cause = %last_cause, "all attempts failed");
        Err(RouteScoutError::RetryExhausted {
            operation: operation.to_string(),
            attempts,
            last_cause,
        })
    }
}
