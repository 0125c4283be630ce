//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`RetryClass`]: Classification for determining fallback behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which determines how the provider chain should handle the error.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The request was malformed before reaching any provider.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider answered but had no quotes for the requested symbols.
    #[error("Empty response: {provider}")]
    EmptyResponse {
        /// The provider that returned nothing
        provider: String,
    },

    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// Upstream data could not be converted into a quote.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },

    /// The chain was built without any provider.
    #[error("No providers available")]
    NoProvidersAvailable,

    /// All providers were tried and all failed.
    #[error("All providers failed")]
    AllProvidersFailed,

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Shorthand for [`MarketDataError::ProviderError`].
    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Returns the retry classification for this error.
    ///
    /// - [`RetryClass::Never`]: Don't try another provider, the error is terminal
    /// - [`RetryClass::NextProvider`]: Try the next provider in the chain
    ///
    /// # Examples
    ///
    /// ```
    /// use dashboard_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "YAHOO_QUOTE".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::NextProvider);
    ///
    /// let error = MarketDataError::InvalidRequest("no symbols".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::InvalidRequest(_) | Self::NoProvidersAvailable | Self::AllProvidersFailed => {
                RetryClass::Never
            }

            Self::RateLimited { .. }
            | Self::Timeout { .. }
            | Self::EmptyResponse { .. }
            | Self::ProviderError { .. }
            | Self::ValidationFailed { .. }
            | Self::Network(_) => RetryClass::NextProvider,
        }
    }
}
