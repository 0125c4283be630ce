//! Yahoo Finance quote providers.
//!
//! Two providers share this module:
//! - [`YahooQuoteProvider`]: the v7 batch quote API, near real-time, which
//!   needs a cookie/crumb pair.
//! - [`YahooChartProvider`]: the v8 chart API, queried per symbol, used as the
//!   fallback when the quote API is unavailable.

mod chart;
mod models;

pub use chart::YahooChartProvider;

use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, redirect, StatusCode};
use tracing::{debug, warn};
use urlencoding::encode;

use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::{self, QuoteProvider, USER_AGENT};

use models::{YahooQuoteItem, YahooQuoteResponse};

const PROVIDER_ID: &str = "YAHOO_QUOTE";

/// How long a cookie/crumb pair is reused before being fetched again.
const CRUMB_TTL: Duration = Duration::from_secs(10 * 60);

const COOKIE_URL: &str = "https://fc.yahoo.com/";
const CRUMB_URL: &str = "https://query2.finance.yahoo.com/v1/test/getcrumb";
const QUOTE_URL: &str = "https://query2.finance.yahoo.com/v7/finance/quote";

// ============================================================================
// Crumb/Cookie Authentication
// ============================================================================

/// Cached Yahoo authentication data
#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
    fetched_at: Instant,
}

impl CrumbData {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

// ============================================================================
// Yahoo Quote Provider
// ============================================================================

/// Yahoo Finance v7 quote API provider.
///
/// The cookie/crumb pair lives in the provider instance, so it survives for
/// as long as the server process keeps the provider around.
pub struct YahooQuoteProvider {
    client: reqwest::Client,
    crumb: RwLock<Option<CrumbData>>,
}

impl YahooQuoteProvider {
    /// Create a provider whose upstream requests are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, MarketDataError> {
        // fc.yahoo.com answers with a redirect carrying the cookie we need.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            crumb: RwLock::new(None),
        })
    }

    /// Ensure we have a valid Yahoo authentication crumb.
    async fn ensure_crumb(&self) -> Result<CrumbData, MarketDataError> {
        {
            let guard = self.crumb.read().unwrap_or_else(|e| e.into_inner());
            if let Some(crumb) = guard.as_ref().filter(|c| c.is_fresh(CRUMB_TTL)) {
                return Ok(crumb.clone());
            }
        }

        self.fetch_crumb().await
    }

    /// Fetch a new Yahoo authentication crumb.
    async fn fetch_crumb(&self) -> Result<CrumbData, MarketDataError> {
        debug!("Fetching Yahoo cookie and crumb");

        // Step 1: Get cookie from fc.yahoo.com
        let response = self
            .client
            .get(COOKIE_URL)
            .send()
            .await
            .map_err(|e| request_error(e, "Failed to get cookie"))?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .map(cookie_pair)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| MarketDataError::provider(PROVIDER_ID, "Failed to parse Yahoo cookie"))?;

        // Step 2: Get crumb using cookie
        let crumb = self
            .client
            .get(CRUMB_URL)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .map_err(|e| request_error(e, "Failed to get crumb"))?
            .text()
            .await
            .map_err(|e| request_error(e, "Failed to read crumb"))?;

        let crumb_data = CrumbData {
            cookie,
            crumb: crumb.trim().to_string(),
            fetched_at: Instant::now(),
        };

        let mut guard = self.crumb.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(crumb_data.clone());

        Ok(crumb_data)
    }

    /// Clear the cached crumb (used when authentication fails)
    fn clear_crumb(&self) {
        let mut guard = self.crumb.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn source_label(&self) -> &'static str {
        "Yahoo Finance (Quote API)"
    }

    fn priority(&self) -> u8 {
        1
    }

    async fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError> {
        let crumb = self.ensure_crumb().await?;

        let query = symbols
            .iter()
            .map(|s| encode(s).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}?symbols={}&crumb={}", QUOTE_URL, query, encode(&crumb.crumb));

        debug!("Fetching {} quotes from Yahoo quote API", symbols.len());

        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await
            .map_err(|e| request_error(e, "Quote request failed"))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED => {
                self.clear_crumb();
                return Err(MarketDataError::provider(
                    PROVIDER_ID,
                    "Yahoo authentication expired",
                ));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                })
            }
            status => {
                return Err(MarketDataError::provider(
                    PROVIDER_ID,
                    format!("Quote API {}", status.as_u16()),
                ))
            }
        }

        let data: YahooQuoteResponse = response
            .json()
            .await
            .map_err(|e| request_error(e, "Failed to parse quote response"))?;

        let items = data.quote_response.result;
        if items.is_empty() {
            return Err(MarketDataError::EmptyResponse {
                provider: PROVIDER_ID.to_string(),
            });
        }

        Ok(items.into_iter().filter_map(item_to_quote).collect())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// First `name=value` pair of a `Set-Cookie` header.
fn cookie_pair(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Convert a v7 quote item, dropping items without a price.
fn item_to_quote(item: YahooQuoteItem) -> Option<Quote> {
    let Some(price) = item.regular_market_price else {
        warn!("Yahoo returned no price for {}, skipping", item.symbol);
        return None;
    };

    Some(
        Quote::new(
            item.symbol,
            price,
            item.regular_market_change.unwrap_or_default(),
            item.regular_market_change_percent.unwrap_or_default(),
        )
        .with_market_time(item.regular_market_time),
    )
}

fn request_error(error: reqwest::Error, context: &str) -> MarketDataError {
    provider::request_error(PROVIDER_ID, error, context)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_pair() {
        assert_eq!(
            cookie_pair("A3=d=AQABBK; Expires=Sun, 01 Jan 2034 00:00:00 GMT; Domain=.yahoo.com"),
            "A3=d=AQABBK"
        );
        assert_eq!(cookie_pair("B=abc"), "B=abc");
        assert_eq!(cookie_pair(""), "");
    }

    #[test]
    fn test_quote_response_parsing() {
        let body = r#"{
            "quoteResponse": {
                "result": [
                    {
                        "symbol": "^KS11",
                        "regularMarketPrice": 2500.5,
                        "regularMarketChange": 12.3,
                        "regularMarketChangePercent": 0.49,
                        "regularMarketTime": 1700000000,
                        "currency": "KRW"
                    },
                    { "symbol": "102110.KS" }
                ],
                "error": null
            }
        }"#;

        let data: YahooQuoteResponse = serde_json::from_str(body).unwrap();
        let quotes: Vec<Quote> = data
            .quote_response
            .result
            .into_iter()
            .filter_map(item_to_quote)
            .collect();

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].symbol, "^KS11");
        assert_eq!(quotes[0].price, 2500.5);
        assert_eq!(quotes[0].change_percent, 0.49);
        assert_eq!(quotes[0].market_time, Some(1_700_000_000));
    }

    #[test]
    fn test_missing_change_defaults_to_zero() {
        let quote = item_to_quote(YahooQuoteItem {
            symbol: "KRW=X".to_string(),
            regular_market_price: Some(1380.0),
            regular_market_change: None,
            regular_market_change_percent: None,
            regular_market_time: None,
        })
        .unwrap();

        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.change_percent, 0.0);
    }

    #[test]
    fn test_crumb_freshness() {
        let crumb = CrumbData {
            cookie: "B=abc".to_string(),
            crumb: "xyz".to_string(),
            fetched_at: Instant::now(),
        };
        assert!(crumb.is_fresh(CRUMB_TTL));
        assert!(!crumb.is_fresh(Duration::ZERO));
    }

    #[test]
    fn test_clear_crumb() {
        let provider = YahooQuoteProvider::new(Duration::from_secs(5)).unwrap();
        *provider.crumb.write().unwrap() = Some(CrumbData {
            cookie: "B=abc".to_string(),
            crumb: "xyz".to_string(),
            fetched_at: Instant::now(),
        });

        provider.clear_crumb();

        assert!(provider.crumb.read().unwrap().is_none());
    }

    #[test]
    fn test_quote_provider_is_preferred() {
        let provider = YahooQuoteProvider::new(Duration::from_secs(5)).unwrap();
        assert_eq!(provider.id(), "YAHOO_QUOTE");
        assert!(provider.priority() < YahooChartProvider::new(Duration::from_secs(5)).unwrap().priority());
    }
}
