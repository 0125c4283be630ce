use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use axum::http::HeaderValue;
use dashboard_market_data::{KisConfig, DEFAULT_KIS_BASE_URL};

const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

pub struct Config {
    pub listen_addr: SocketAddr,
    /// The one origin allowed by CORS.
    pub allowed_origin: HeaderValue,
    pub request_timeout: Duration,
    /// Budget for each upstream provider request.
    pub upstream_timeout: Duration,
    /// KIS credentials; the KIS route answers 503 without them.
    pub kis: Option<KisConfig>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("DASHBOARD_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .context("Invalid DASHBOARD_LISTEN_ADDR")?;
        let allowed_origin = std::env::var("DASHBOARD_ALLOWED_ORIGIN")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGIN.into())
            .trim()
            .parse()
            .context("Invalid DASHBOARD_ALLOWED_ORIGIN")?;
        let timeout_ms = env_millis("DASHBOARD_REQUEST_TIMEOUT_MS", 30000);
        let upstream_timeout_ms = env_millis("DASHBOARD_UPSTREAM_TIMEOUT_MS", 10000);

        let kis = match (std::env::var("KIS_APP_KEY"), std::env::var("KIS_APP_SECRET")) {
            (Ok(app_key), Ok(app_secret)) if !app_key.is_empty() && !app_secret.is_empty() => {
                Some(KisConfig {
                    app_key,
                    app_secret,
                    base_url: std::env::var("KIS_BASE_URL")
                        .ok()
                        .map(|v| v.trim().trim_end_matches('/').to_string())
                        .filter(|v| !v.is_empty())
                        .unwrap_or_else(|| DEFAULT_KIS_BASE_URL.to_string()),
                })
            }
            _ => None,
        };

        Ok(Self {
            listen_addr,
            allowed_origin,
            request_timeout: Duration::from_millis(timeout_ms),
            upstream_timeout: Duration::from_millis(upstream_timeout_ms),
            kis,
        })
    }
}

fn env_millis(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
