use std::time::Duration;

use crate::constants::{AUTO_REFRESH_INTERVAL, FETCH_TIMEOUT, MAX_RETRY_COUNT, RETRY_DELAY};

/// Timing of the refresh lifecycle.
///
/// Fixed once the client is built; there is no way to change it at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshConfig {
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub max_retry_count: u32,
    pub retry_delay: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            refresh_interval: AUTO_REFRESH_INTERVAL,
            fetch_timeout: FETCH_TIMEOUT,
            max_retry_count: MAX_RETRY_COUNT,
            retry_delay: RETRY_DELAY,
        }
    }
}

impl RefreshConfig {
    /// Total attempts a cycle makes before giving up.
    pub fn max_attempts(&self) -> u32 {
        self.max_retry_count + 1
    }
}
