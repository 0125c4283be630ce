//! Where the client gets its quote batches from.

use async_trait::async_trait;
use dashboard_market_data::StockDataResponse;
use tracing::debug;

use crate::constants::STOCK_DATA_PATH;
use crate::errors::FetchError;

/// One request for the current quote batch.
///
/// Implementations perform a single attempt; timeout and retry are applied by
/// the client around it.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch(&self) -> Result<StockDataResponse, FetchError>;
}

/// [`QuoteSource`] backed by the proxy server's stock data endpoint.
pub struct HttpQuoteSource {
    client: reqwest::Client,
    url: String,
}

impl HttpQuoteSource {
    /// Source for the endpoint under `base_url`, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), STOCK_DATA_PATH),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    async fn fetch(&self) -> Result<StockDataResponse, FetchError> {
        debug!("GET {}", self.url);

        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.json::<StockDataResponse>().await.map_err(|e| {
            if e.is_decode() {
                FetchError::InvalidPayload(e.to_string())
            } else {
                FetchError::Network(e)
            }
        })
    }
}
