//! Errors of a single fetch attempt.

use std::time::Duration;

use thiserror::Error;

const TIMEOUT_MESSAGE: &str = "The server took too long to respond. Please try refreshing.";
const FAILURE_MESSAGE: &str = "Failed to load market data. Please try refreshing.";

/// Why one attempt against the stock data endpoint failed.
///
/// Every variant is retried the same way; only the final user-facing message
/// tells timeouts apart.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response format: {0}")]
    InvalidPayload(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Message shown once a cycle has exhausted its retries.
    pub fn user_message(&self) -> &'static str {
        if self.is_timeout() {
            TIMEOUT_MESSAGE
        } else {
            FAILURE_MESSAGE
        }
    }
}
