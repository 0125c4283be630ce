use std::sync::Arc;

use crate::config::Config;
use dashboard_market_data::{
    default_symbols, KisClient, ProviderChain, QuoteProvider, YahooChartProvider,
    YahooQuoteProvider,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub chain: ProviderChain,
    pub kis: Option<KisClient>,
    /// Symbols requested upstream by the stock data route.
    pub symbols: Vec<String>,
}

impl AppState {
    pub fn new(chain: ProviderChain, kis: Option<KisClient>) -> Self {
        Self {
            chain,
            kis,
            symbols: default_symbols(),
        }
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("DASHBOARD_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let providers: Vec<Arc<dyn QuoteProvider>> = vec![
        Arc::new(YahooQuoteProvider::new(config.upstream_timeout)?),
        Arc::new(YahooChartProvider::new(config.upstream_timeout)?),
    ];
    let chain = ProviderChain::new(providers);
    tracing::info!("Quote providers: {:?}", chain.provider_ids());

    let kis = match &config.kis {
        Some(kis_config) => Some(KisClient::new(kis_config.clone(), config.upstream_timeout)?),
        None => {
            tracing::warn!("KIS_APP_KEY/KIS_APP_SECRET not set, /api/kis-proxy is disabled");
            None
        }
    };

    Ok(Arc::new(AppState::new(chain, kis)))
}
