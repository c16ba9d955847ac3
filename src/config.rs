use std::env;
use std::time::Duration;

/// Configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub poll_interval: Duration,
    pub metrics_interval: Duration,
    pub blocks_interval: Duration,
    pub batch_limit: usize,
    pub request_timeout: Duration,
    pub demo: bool,
    pub rust_log: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

const DEFAULT_API_URL: &str = "http://localhost:3001";

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `TXFLOW_API_URL` (default: http://localhost:3001)
    /// - `TX_POLL_INTERVAL_MS` (default: 3000)
    /// - `METRICS_POLL_INTERVAL_MS` (default: 10000)
    /// - `BLOCKS_POLL_INTERVAL_MS` (default: 15000)
    /// - `TX_BATCH_LIMIT` (default: 20)
    /// - `REQUEST_TIMEOUT_MS` (default: 10000)
    /// - `TXFLOW_DEMO` (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let millis = |key: &str, default: u64| {
            Duration::from_millis(
                lookup(key)
                    .and_then(|s| s.trim().parse().ok())
                    .filter(|ms: &u64| *ms > 0)
                    .unwrap_or(default),
            )
        };

        let api_url = lookup("TXFLOW_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(format!(
                "TXFLOW_API_URL must start with http:// or https://, got '{}'",
                api_url
            )));
        }

        let batch_limit = lookup("TX_BATCH_LIMIT")
            .and_then(|s| s.trim().parse().ok())
            .filter(|limit: &usize| *limit > 0)
            .unwrap_or(20);

        let demo = lookup("TXFLOW_DEMO")
            .map(|s| s.trim().to_lowercase())
            .map(|s| s == "true" || s == "1")
            .unwrap_or(false);

        Ok(Self {
            api_url,
            poll_interval: millis("TX_POLL_INTERVAL_MS", 3_000),
            metrics_interval: millis("METRICS_POLL_INTERVAL_MS", 10_000),
            blocks_interval: millis("BLOCKS_POLL_INTERVAL_MS", 15_000),
            batch_limit,
            request_timeout: millis("REQUEST_TIMEOUT_MS", 10_000),
            demo,
            rust_log: lookup("RUST_LOG"),
        })
    }
}
