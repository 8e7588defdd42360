use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry budget for calls against rate-limited APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_retries: u32,

    /// Delay before the second attempt; doubles for every later attempt
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
        }
    }

    /// Number of times the operation may be invoked. Never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Wait after the failed attempt with zero-based index `attempt`:
    /// `base_delay * 2^attempt`, without jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}
