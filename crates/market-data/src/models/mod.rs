//! Market data models
//!
//! This module contains the core data types shared by the proxy server and
//! the dashboard client:
//! - `quote` - Uniform quote shape (Quote) and the endpoint payload (StockDataResponse)
//! - `kis` - Quote returned by the KIS proxy route (KisQuote)

mod kis;
mod quote;

pub use kis::KisQuote;
pub use quote::{Quote, StockDataResponse};
