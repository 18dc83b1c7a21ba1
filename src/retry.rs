use std::future::Future;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

/// Bounded exponential backoff for upstream calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no backoff
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
        }
    }

    fn delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(2u64.saturating_pow(attempt)))
    }

    /// Run `operation` until it succeeds, fails with an error `is_transient` rejects,
    /// or `max_attempts` is reached. Always runs at least once.
    pub async fn run<F, Fut, T, E>(&self, is_transient: impl Fn(&E) -> bool, operation: F) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(val) => return Ok(val),
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_attempts || !is_transient(&e) {
                        return Err(e);
                    }
                    let delay = self.delay(attempt - 1);
                    debug!("Attempt {attempt} failed: {e}, retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
