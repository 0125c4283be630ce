use serde::{Deserialize, Serialize};

/// Domestic quote served by the KIS proxy route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KisQuote {
    /// KIS instrument code (`0001` for KOSPI, six digits for stocks).
    pub code: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}
