use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::error::{AppError, Result};

pub const GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";

/// Sent on every request so upstream can identify the client.
pub const USER_AGENT: &str = concat!("polyterm/", env!("CARGO_PKG_VERSION"));

/// Deadline for the markets fetch (seconds).
pub const FETCH_TIMEOUT_SECS: u64 = 10;

/// Deadline for the single-event peek (seconds).
pub const EVENT_TIMEOUT_SECS: u64 = 8;

/// Auto-refresh interval (seconds).
pub const REFRESH_INTERVAL_SECS: u64 = 30;

/// Markets kept after ranking.
pub const DEFAULT_MARKET_LIMIT: usize = 500;

/// The markets request asks for `limit * FETCH_OVERSAMPLE` rows so the
/// activity filter can still fill `limit`.
pub const FETCH_OVERSAMPLE: usize = 2;

/// Max bytes of raw body carried by a parse error.
pub const PARSE_SNIPPET_LEN: usize = 500;

/// Rows visible before the first resize event arrives.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Screen rows not available to table rows: header 3, controls 1, footer 1,
/// table border and column header 3.
pub const UI_CHROME_ROWS: u16 = 8;

/// UI loop poll interval (milliseconds); also drives the spinner.
pub const TICK_INTERVAL_MS: u64 = 120;

/// Activity threshold: a market qualifies if either bound is exceeded.
pub mod activity_thresholds {
    pub const MIN_VOLUME: f64 = 100.0;
    pub const MIN_VOLUME_24H: f64 = 10.0;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gamma_api_url: String,
    pub log_level: String,
    /// Log destination (LOG_FILE). Logging is off when unset, stdout belongs to the TUI.
    pub log_file: Option<String>,
    /// Markets kept after ranking
    pub market_limit: usize,
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gamma_api_url: GAMMA_API_URL.to_string(),
            log_level: "info".to_string(),
            log_file: None,
            market_limit: DEFAULT_MARKET_LIMIT,
            refresh_interval: Duration::from_secs(REFRESH_INTERVAL_SECS),
            fetch_timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Defaults plus the logging overrides `LOG_LEVEL` and `LOG_FILE`.
    /// Everything else is fixed at build time.
    pub fn from_env() -> Result<Self> {
        let log_level = match std::env::var("LOG_LEVEL") {
            Ok(v) => parse_log_level(&v)?,
            Err(_) => "info".to_string(),
        };
        Ok(Self {
            log_level,
            log_file: std::env::var("LOG_FILE").ok().filter(|s| !s.trim().is_empty()),
            ..Self::default()
        })
    }
}

fn parse_log_level(raw: &str) -> Result<String> {
    let level = raw.trim();
    if level.is_empty() {
        return Ok("info".to_string());
    }
    EnvFilter::try_new(level)
        .map(|_| level.to_string())
        .map_err(|e| AppError::Config(format!("LOG_LEVEL is not a valid filter: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.gamma_api_url, GAMMA_API_URL);
        assert_eq!(cfg.market_limit, DEFAULT_MARKET_LIMIT);
        assert_eq!(cfg.refresh_interval, Duration::from_secs(REFRESH_INTERVAL_SECS));
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(FETCH_TIMEOUT_SECS));
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn log_level_accepts_filters_and_rejects_garbage() {
        assert_eq!(parse_log_level("debug").unwrap(), "debug");
        assert_eq!(parse_log_level(" polyterm=trace,warn ").unwrap(), "polyterm=trace,warn");
        assert_eq!(parse_log_level("").unwrap(), "info");
        let err = parse_log_level("polyterm=loudest").unwrap_err();
        assert!(matches!(err, AppError::Config(_)), "got {err:?}");
    }
}
