//! Quote provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` trait that all providers implement
//! - Yahoo Finance providers (batch quote API and per-symbol chart API)
//! - The KIS (Korea Investment & Securities) open API client
//!
//! Providers only normalize vendor payloads into [`Quote`](crate::models::Quote);
//! ordering and fallback live in the registry module.

mod traits;

pub mod kis;
pub mod yahoo;

pub use traits::QuoteProvider;

use crate::errors::MarketDataError;

/// Browser-like agent; Yahoo rejects requests without one.
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Map a reqwest failure, keeping timeouts distinguishable.
pub(crate) fn request_error(provider: &str, error: reqwest::Error, context: &str) -> MarketDataError {
    if error.is_timeout() {
        MarketDataError::Timeout {
            provider: provider.to_string(),
        }
    } else {
        MarketDataError::provider(provider, format!("{}: {}", context, error))
    }
}
