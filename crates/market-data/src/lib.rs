//! Dashboard Market Data Crate
//!
//! Upstream quote fetching for the market dashboard, shared by the proxy
//! server and the dashboard client.
//!
//! # Overview
//!
//! - A fixed catalog of followed instruments (index, ETF, volatility, FX)
//! - Multiple providers: Yahoo Finance quote and chart APIs, KIS open API
//! - Priority ordered fallback across providers
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   Instruments    |  (catalog of followed symbols)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  ProviderChain   |  (priority order, fallback)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |    Providers     |  (Yahoo quote, Yahoo chart)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |      Quote       |  (uniform snapshot, StockDataResponse payload)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Quote`] - Latest snapshot for one symbol
//! - [`StockDataResponse`] - Payload of the stock data endpoint
//! - [`QuoteProvider`] - Trait implemented by every upstream
//! - [`ProviderChain`] - Ordered fallback across providers

pub mod errors;
pub mod instruments;
pub mod models;
pub mod provider;
pub mod registry;

pub use errors::{MarketDataError, RetryClass};

pub use instruments::{default_symbols, display_name_for, InstrumentSpec, DEFAULT_INSTRUMENTS};

pub use models::{KisQuote, Quote, StockDataResponse};

// Re-export provider types
pub use provider::kis::{KisClient, KisConfig, DEFAULT_KIS_BASE_URL};
pub use provider::yahoo::{YahooChartProvider, YahooQuoteProvider};
pub use provider::QuoteProvider;

pub use registry::{ChainQuotes, ProviderChain};
