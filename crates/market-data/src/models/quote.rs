use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Latest market snapshot for one symbol, in the uniform shape every
/// provider is normalized into.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Provider symbol, used as the merge key on the client side.
    pub symbol: String,

    /// Display name, filled in by the server from the instrument catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Last price.
    pub price: f64,

    /// Absolute change against the previous close.
    pub change: f64,

    /// Change against the previous close, in percent.
    pub change_percent: f64,

    /// Market time of the quote, seconds since the UNIX epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_time: Option<i64>,
}

impl Quote {
    /// Create a quote without name or market time.
    pub fn new(symbol: impl Into<String>, price: f64, change: f64, change_percent: f64) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            price,
            change,
            change_percent,
            market_time: None,
        }
    }

    pub fn with_market_time(mut self, market_time: Option<i64>) -> Self {
        self.market_time = market_time;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Payload of `GET /api/stock-data`.
///
/// The client treats anything other than `success == true` with a present
/// `data` collection as a failed attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockDataResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Quote>>,

    /// Human readable name of the upstream that produced `data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// RFC 3339 time at which the server assembled the payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StockDataResponse {
    /// Successful payload stamped with the current time.
    pub fn ok(data: Vec<Quote>, source: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            source: Some(source.into()),
            timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            error: None,
        }
    }

    /// Unsuccessful payload carrying only an error message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            source: None,
            timestamp: None,
            error: Some(message.into()),
        }
    }

    /// Quotes of a usable payload, `None` when the payload must be treated as
    /// a failure.
    pub fn quotes(&self) -> Option<&[Quote]> {
        if !self.success {
            return None;
        }
        self.data.as_deref()
    }
}
