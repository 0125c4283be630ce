//! Quote provider trait definition.
//!
//! This module defines the core `QuoteProvider` trait that every upstream
//! quote source implements.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::Quote;

/// Trait for upstream quote providers.
///
/// Implement this trait to add a new quote source. The provider chain uses
/// the provider's priority to decide the order of attempts.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use dashboard_market_data::provider::QuoteProvider;
///
/// struct StaticProvider;
///
/// #[async_trait]
/// impl QuoteProvider for StaticProvider {
///     fn id(&self) -> &'static str {
///         "STATIC"
///     }
///
///     fn source_label(&self) -> &'static str {
///         "Static quotes"
///     }
///
///     async fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError> {
///         Ok(symbols.iter().map(|s| Quote::new(s.as_str(), 1.0, 0.0, 0.0)).collect())
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs and errors.
    fn id(&self) -> &'static str;

    /// Label reported to clients as the `source` of a payload.
    fn source_label(&self) -> &'static str;

    /// Provider priority for ordering.
    ///
    /// Lower values = higher priority. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Fetch the latest quotes for `symbols`.
    ///
    /// Symbols the provider knows nothing about may be absent from the
    /// result; callers merge by symbol and tolerate gaps.
    async fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError>;
}
