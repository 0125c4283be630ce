//! Provider chain for orchestrating quote providers.
//!
//! The chain owns an ordered list of providers and handles:
//! - Ordering by provider priority
//! - Fallback to the next provider on upstream failure
//! - Reporting which provider actually answered

use std::sync::Arc;

use log::{debug, info, warn};

use crate::errors::{MarketDataError, RetryClass};
use crate::models::Quote;
use crate::provider::QuoteProvider;

/// Quotes produced by the chain together with their origin.
#[derive(Clone, Debug)]
pub struct ChainQuotes {
    pub quotes: Vec<Quote>,
    /// Id of the provider that answered.
    pub provider_id: &'static str,
    /// Label of the provider that answered, reported as the payload `source`.
    pub source: &'static str,
}

/// Ordered set of quote providers tried one after the other.
pub struct ProviderChain {
    providers: Vec<Arc<dyn QuoteProvider>>,
}

impl ProviderChain {
    /// Create a chain; providers are ordered by ascending priority, ties keep
    /// the given order.
    pub fn new(mut providers: Vec<Arc<dyn QuoteProvider>>) -> Self {
        providers.sort_by_key(|p| p.priority());
        Self { providers }
    }

    /// Ids of the providers in the order they are tried.
    pub fn provider_ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Fetch quotes for `symbols`.
    ///
    /// Tries providers in priority order. An error classified as
    /// [`RetryClass::NextProvider`] moves on to the next provider; any other
    /// error is returned immediately.
    pub async fn fetch_quotes(&self, symbols: &[String]) -> Result<ChainQuotes, MarketDataError> {
        if symbols.is_empty() {
            return Err(MarketDataError::InvalidRequest(
                "No symbols requested".to_string(),
            ));
        }

        if self.providers.is_empty() {
            warn!("Quote request with an empty provider chain");
            return Err(MarketDataError::NoProvidersAvailable);
        }

        for provider in &self.providers {
            debug!(
                "Fetching {} quotes from provider '{}'",
                symbols.len(),
                provider.id()
            );

            match provider.get_quotes(symbols).await {
                Ok(quotes) => {
                    debug!(
                        "Provider '{}' returned {} of {} quotes",
                        provider.id(),
                        quotes.len(),
                        symbols.len()
                    );
                    return Ok(ChainQuotes {
                        quotes,
                        provider_id: provider.id(),
                        source: provider.source_label(),
                    });
                }
                Err(e) => match e.retry_class() {
                    RetryClass::NextProvider => {
                        info!(
                            "Provider '{}' failed, falling back to the next provider: {}",
                            provider.id(),
                            e
                        );
                    }
                    RetryClass::Never => {
                        warn!("Provider '{}' failed terminally: {}", provider.id(), e);
                        return Err(e);
                    }
                },
            }
        }

        warn!("All quote providers failed for {:?}", symbols);
        Err(MarketDataError::AllProvidersFailed)
    }
}
