use std::time::Duration;

use anyhow::Context;
use dashboard_client::RefreshConfig;

pub struct Config {
    /// Base URL of the proxy server.
    pub api_url: String,
    pub firebase_api_key: String,
    pub email: String,
    pub password: String,
    pub refresh: RefreshConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let api_url = std::env::var("DASHBOARD_API_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "http://localhost:3000".to_string());
        let firebase_api_key =
            std::env::var("FIREBASE_API_KEY").context("FIREBASE_API_KEY is not set")?;
        let email = std::env::var("DASHBOARD_EMAIL").context("DASHBOARD_EMAIL is not set")?;
        let password =
            std::env::var("DASHBOARD_PASSWORD").context("DASHBOARD_PASSWORD is not set")?;

        Ok(Self {
            api_url,
            firebase_api_key,
            email,
            password,
            refresh: refresh_config(|key| std::env::var(key).ok()),
        })
    }
}

/// Refresh timing from the defaults, with any valid override applied.
fn refresh_config(lookup: impl Fn(&str) -> Option<String>) -> RefreshConfig {
    let number = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
    let defaults = RefreshConfig::default();

    RefreshConfig {
        refresh_interval: number("DASHBOARD_REFRESH_INTERVAL_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.refresh_interval),
        fetch_timeout: number("DASHBOARD_FETCH_TIMEOUT_MS")
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.fetch_timeout),
        max_retry_count: number("DASHBOARD_MAX_RETRY_COUNT")
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(defaults.max_retry_count),
        retry_delay: number("DASHBOARD_RETRY_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_delay),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_defaults_without_overrides() {
        assert_eq!(refresh_config(|_| None), RefreshConfig::default());
    }

    #[test]
    fn test_refresh_overrides() {
        let config = refresh_config(|key| match key {
            "DASHBOARD_REFRESH_INTERVAL_SECS" => Some("60".to_string()),
            "DASHBOARD_MAX_RETRY_COUNT" => Some(" 4 ".to_string()),
            "DASHBOARD_RETRY_DELAY_MS" => Some("500".to_string()),
            _ => None,
        });

        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.max_retry_count, 4);
        assert_eq!(config.retry_delay, Duration::from_millis(500));
        assert_eq!(config.fetch_timeout, RefreshConfig::default().fetch_timeout);
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let config = refresh_config(|key| match key {
            "DASHBOARD_REFRESH_INTERVAL_SECS" => Some("0".to_string()),
            "DASHBOARD_FETCH_TIMEOUT_MS" => Some("soon".to_string()),
            _ => None,
        });

        assert_eq!(config, RefreshConfig::default());
    }
}
