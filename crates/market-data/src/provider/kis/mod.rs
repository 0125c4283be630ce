//! Korea Investment & Securities (KIS) open API client.
//!
//! Serves the domestic quotes behind the `/api/kis-proxy` route:
//! - the KOSPI index (`FHKUP03500100`)
//! - individual stocks by six digit code (`FHKST01010100`)
//!
//! Access tokens are issued with the client-credentials grant and cached in
//! the client instance. KIS tokens live for two hours; the cache drops them
//! ten minutes early.

mod models;

use std::time::{Duration, Instant};

use reqwest::header;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::MarketDataError;
use crate::models::KisQuote;
use crate::provider::request_error;

use models::{
    KisEnvelope, KisIndexOutput, KisStockOutput, KisTokenRequest, KisTokenResponse,
};

const PROVIDER_ID: &str = "KIS";

/// Production endpoint of the KIS open API.
pub const DEFAULT_KIS_BASE_URL: &str = "https://openapi.koreainvestment.com:9443";

/// KIS code of the KOSPI composite index.
pub const KOSPI_INDEX_CODE: &str = "0001";

const TOKEN_TTL: Duration = Duration::from_secs(110 * 60);

const INDEX_TR_ID: &str = "FHKUP03500100";
const STOCK_TR_ID: &str = "FHKST01010100";

/// Credentials and endpoint for the KIS API. Server-side only.
#[derive(Clone)]
pub struct KisConfig {
    pub app_key: String,
    pub app_secret: String,
    pub base_url: String,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Client for the KIS quotation endpoints.
pub struct KisClient {
    client: reqwest::Client,
    config: KisConfig,
    token: Mutex<Option<CachedToken>>,
}

impl KisClient {
    pub fn new(config: KisConfig, timeout: Duration) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    /// Return the cached access token, issuing a new one when it has expired.
    ///
    /// The lock is held across the issuance so concurrent requests share one
    /// token request.
    async fn access_token(&self) -> Result<String, MarketDataError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.expires_at > Instant::now()) {
            debug!("Using cached KIS token");
            return Ok(token.token.clone());
        }

        let response = self
            .client
            .post(format!("{}/oauth2/tokenP", self.config.base_url))
            .json(&KisTokenRequest {
                grant_type: "client_credentials",
                appkey: &self.config.app_key,
                appsecret: &self.config.app_secret,
            })
            .send()
            .await
            .map_err(|e| request_error(PROVIDER_ID, e, "Token request failed"))?;

        let data: KisTokenResponse = response
            .json()
            .await
            .map_err(|e| request_error(PROVIDER_ID, e, "Failed to parse token response"))?;

        let token = data
            .access_token
            .ok_or_else(|| MarketDataError::provider(PROVIDER_ID, "Token issuance failed"))?;

        *cached = Some(CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + TOKEN_TTL,
        });
        info!("New KIS token issued");

        Ok(token)
    }

    async fn inquire<T: DeserializeOwned>(
        &self,
        path: &str,
        tr_id: &str,
        market: &str,
        code: &str,
    ) -> Result<Option<T>, MarketDataError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}{}?fid_cond_mrkt_div_code={}&fid_input_iscd={}",
            self.config.base_url,
            path,
            market,
            urlencoding::encode(code)
        );

        let envelope: KisEnvelope<T> = self
            .client
            .get(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header("appkey", &self.config.app_key)
            .header("appsecret", &self.config.app_secret)
            .header("tr_id", tr_id)
            .send()
            .await
            .map_err(|e| request_error(PROVIDER_ID, e, "Quotation request failed"))?
            .json()
            .await
            .map_err(|e| request_error(PROVIDER_ID, e, "Failed to parse quotation response"))?;

        if envelope.rt_cd != "0" {
            debug!(
                "KIS quotation for {} rejected: {}",
                code,
                envelope.msg1.as_deref().unwrap_or("no message")
            );
            return Ok(None);
        }
        Ok(envelope.output)
    }

    /// Latest value of the KOSPI composite index.
    pub async fn fetch_kospi_index(&self) -> Result<KisQuote, MarketDataError> {
        let output: KisIndexOutput = self
            .inquire(
                "/uapi/domestic-stock/v1/quotations/inquire-index-price",
                INDEX_TR_ID,
                "U",
                KOSPI_INDEX_CODE,
            )
            .await?
            .ok_or_else(|| MarketDataError::provider(PROVIDER_ID, "KOSPI data not available"))?;

        Ok(KisQuote {
            code: KOSPI_INDEX_CODE.to_string(),
            name: "KOSPI".to_string(),
            price: parse_number(&output.bstp_nmix_prpr)?,
            change: parse_number(&output.bstp_nmix_prdy_vrss)?,
            change_percent: signed_rate(&output.prdy_vrss_sign, &output.bstp_nmix_prdy_ctrt)?,
        })
    }

    /// Latest price of the domestic stock identified by `code`.
    pub async fn fetch_stock(&self, code: &str) -> Result<KisQuote, MarketDataError> {
        let output: KisStockOutput = self
            .inquire(
                "/uapi/domestic-stock/v1/quotations/inquire-price",
                STOCK_TR_ID,
                "J",
                code,
            )
            .await?
            .ok_or_else(|| {
                MarketDataError::provider(PROVIDER_ID, format!("Stock {} data not available", code))
            })?;

        Ok(KisQuote {
            code: code.to_string(),
            name: output.hts_kor_isnm,
            price: parse_number(&output.stck_prpr)?,
            change: parse_number(&output.prdy_vrss)?,
            change_percent: signed_rate(&output.prdy_vrss_sign, &output.prdy_ctrt)?,
        })
    }
}

fn parse_number(raw: &str) -> Result<f64, MarketDataError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| MarketDataError::ValidationFailed {
            message: format!("Invalid KIS number: {:?}", raw),
        })
}

/// KIS reports the change rate unsigned next to a sign code; only code `2`
/// (rise) keeps it positive.
fn signed_rate(sign: &str, rate: &str) -> Result<f64, MarketDataError> {
    let value = parse_number(rate)?.abs();
    Ok(if sign == "2" { value } else { -value })
}
