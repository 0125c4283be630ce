use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::header;
use tracing::debug;
use urlencoding::encode;

use super::models::{YahooChartMeta, YahooChartResponse};
use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::{request_error, QuoteProvider, USER_AGENT};

const PROVIDER_ID: &str = "YAHOO_CHART";

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API provider.
///
/// Needs no authentication but only serves one symbol per request, so the
/// batch is fanned out concurrently. Symbols that fail are left out of the
/// result instead of failing the whole batch.
pub struct YahooChartProvider {
    client: reqwest::Client,
}

impl YahooChartProvider {
    pub fn new(timeout: Duration) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn fetch_chart_quote(&self, symbol: &str) -> Result<Option<Quote>, MarketDataError> {
        let url = format!("{}/{}?interval=1d&range=5d", CHART_URL, encode(symbol));

        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| request_error(PROVIDER_ID, e, "Chart request failed"))?;

        let data: YahooChartResponse = response
            .json()
            .await
            .map_err(|e| request_error(PROVIDER_ID, e, "Failed to parse chart response"))?;

        Ok(data
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .and_then(|result| meta_to_quote(symbol, &result.meta)))
    }
}

#[async_trait]
impl QuoteProvider for YahooChartProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn source_label(&self) -> &'static str {
        "Yahoo Finance (Chart API)"
    }

    fn priority(&self) -> u8 {
        5
    }

    async fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError> {
        let results = join_all(symbols.iter().map(|s| self.fetch_chart_quote(s))).await;

        let quotes = symbols
            .iter()
            .zip(results)
            .filter_map(|(symbol, result)| match result {
                Ok(quote) => quote,
                Err(e) => {
                    debug!("Chart quote for {} unavailable: {}", symbol, e);
                    None
                }
            })
            .collect();

        Ok(quotes)
    }
}

/// Derive a quote from chart metadata.
///
/// Zero prices count as missing: the current price falls back to the
/// previous close, and no quote is produced without both values.
fn meta_to_quote(symbol: &str, meta: &YahooChartMeta) -> Option<Quote> {
    let non_zero = |v: Option<f64>| v.filter(|p| *p != 0.0);

    let current = non_zero(meta.regular_market_price).or(non_zero(meta.previous_close))?;
    let previous = non_zero(meta.chart_previous_close).or(non_zero(meta.previous_close))?;

    let change = current - previous;
    Some(
        Quote::new(symbol, current, change, change / previous * 100.0)
            .with_market_time(meta.regular_market_time),
    )
}
