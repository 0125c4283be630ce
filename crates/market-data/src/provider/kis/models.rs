//! KIS open API request and response models.

use serde::{Deserialize, Serialize};

/// Body of `POST /oauth2/tokenP`
#[derive(Debug, Serialize)]
pub struct KisTokenRequest<'a> {
    pub grant_type: &'a str,
    pub appkey: &'a str,
    pub appsecret: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct KisTokenResponse {
    pub access_token: Option<String>,
}

/// Envelope shared by the quotation endpoints; `rt_cd == "0"` means success
#[derive(Debug, Deserialize)]
pub struct KisEnvelope<T> {
    pub rt_cd: String,
    #[serde(default)]
    pub msg1: Option<String>,
    pub output: Option<T>,
}

/// Output of the domestic index price inquiry
#[derive(Debug, Deserialize)]
pub struct KisIndexOutput {
    pub bstp_nmix_prpr: String,
    pub bstp_nmix_prdy_vrss: String,
    pub prdy_vrss_sign: String,
    pub bstp_nmix_prdy_ctrt: String,
}

/// Output of the domestic stock price inquiry
#[derive(Debug, Deserialize)]
pub struct KisStockOutput {
    pub hts_kor_isnm: String,
    pub stck_prpr: String,
    pub prdy_vrss: String,
    pub prdy_vrss_sign: String,
    pub prdy_ctrt: String,
}
