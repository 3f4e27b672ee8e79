//! Configuration types for egx-scan

use serde::Deserialize;

/// Environment variable consulted when `telegram.bot_token` is empty
pub const BOT_TOKEN_ENV: &str = "EGX_SCAN_BOT_TOKEN";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub exchange: ExchangeConfig,
    pub session: SessionConfig,
    pub universe: UniverseConfig,
    pub history: HistoryConfig,
    pub channel: ChannelConfig,
    pub scan: ScanConfig,
    pub report: ReportConfig,
    pub telegram: TelegramConfig,
    pub telemetry: TelemetryConfig,
}

/// Exchange identity configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// Exchange code used to qualify tickers (e.g. "EGX")
    pub name: String,
    /// IANA timezone the exchange trades in
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Screener market slug in the scanner URL path
    #[serde(default = "default_screener")]
    pub screener: String,
}

/// Trading-session window configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session open, local time-of-day ("HH:MM")
    #[serde(default = "default_session_open")]
    pub open: String,
    /// Session close, local time-of-day ("HH:MM")
    #[serde(default = "default_session_close")]
    pub close: String,
    /// Weekly non-trading days
    #[serde(default = "default_holidays")]
    pub holidays: Vec<chrono::Weekday>,
}

/// Instrument-universe query configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UniverseConfig {
    /// Scanner API base URL
    #[serde(default = "default_scanner_url")]
    pub base_url: String,
    /// Maximum rows requested from the scanner
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    /// Locale passed to the scanner query
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Description substrings identifying rights issues / subscription
    /// instruments to exclude from the universe
    #[serde(default = "default_exclude_markers")]
    pub exclude_markers: Vec<String>,
    /// Request timeout in seconds
    #[serde(default = "default_universe_timeout")]
    pub timeout_secs: u64,
}

/// Candle-history query configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// UDF API base URL
    #[serde(default = "default_udf_url")]
    pub base_url: String,
    /// Bar resolution in minutes
    #[serde(default = "default_resolution")]
    pub resolution_minutes: u32,
    /// Calendar-day span requested per instrument; a wall-clock buffer wide
    /// enough to yield `min_bars` hourly bars across non-trading gaps
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Series shorter than this are rejected wholesale
    #[serde(default = "default_min_bars")]
    pub min_bars: usize,
    /// Request timeout in seconds
    #[serde(default = "default_history_timeout")]
    pub timeout_secs: u64,
}

/// Channel-indicator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Trailing window length for the high/low channel
    #[serde(default = "default_period")]
    pub period: usize,
    /// Fast EMA span for the trend overlay
    #[serde(default = "default_ema_fast")]
    pub ema_fast: usize,
    /// Slow EMA span for the trend overlay
    #[serde(default = "default_ema_slow")]
    pub ema_slow: usize,
    /// Gate confirmed signals by EMA/VWAP trend direction
    #[serde(default)]
    pub trend_filter: bool,
}

/// Scan orchestration configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Classification strategy
    #[serde(default)]
    pub strategy: crate::classify::Strategy,
    /// Bars walked backward in retrospective mode
    #[serde(default = "default_scan_depth")]
    pub depth: usize,
    /// Concurrent history fetches
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Minimum spacing between history requests (milliseconds)
    #[serde(default = "default_min_request_gap")]
    pub min_request_gap_ms: u64,
    /// Overall wall-clock budget for one scan (seconds)
    #[serde(default = "default_deadline")]
    pub deadline_secs: u64,
}

/// Report rendering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Maximum signals included in one report
    #[serde(default = "default_report_cap")]
    pub cap: usize,
    /// Decimal places for prices and channel bounds
    #[serde(default = "default_price_decimals")]
    pub price_decimals: u32,
}

/// Telegram transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base URL
    #[serde(default = "default_telegram_url")]
    pub base_url: String,
    /// Bot token; when empty, resolved from `EGX_SCAN_BOT_TOKEN` at load
    #[serde(default)]
    pub bot_token: String,
    /// Chat destination identifiers
    #[serde(default)]
    pub destinations: Vec<String>,
    /// Send timeout in seconds
    #[serde(default = "default_telegram_timeout")]
    pub timeout_secs: u64,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn default_timezone() -> String {
    "Africa/Cairo".to_string()
}
fn default_screener() -> String {
    "egypt".to_string()
}
fn default_session_open() -> String {
    "10:00".to_string()
}
fn default_session_close() -> String {
    "14:45".to_string()
}
fn default_holidays() -> Vec<chrono::Weekday> {
    vec![chrono::Weekday::Fri, chrono::Weekday::Sat]
}
fn default_scanner_url() -> String {
    "https://scanner.tradingview.com".to_string()
}
fn default_max_rows() -> usize {
    600
}
fn default_locale() -> String {
    "ar".to_string()
}
fn default_exclude_markers() -> Vec<String> {
    ["Right", "rights issue", "حق", "اكتتاب"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_universe_timeout() -> u64 {
    15
}
fn default_udf_url() -> String {
    "https://udf-data-feed.tradingview.com/udf".to_string()
}
fn default_resolution() -> u32 {
    60
}
fn default_lookback_days() -> u32 {
    30
}
fn default_min_bars() -> usize {
    21
}
fn default_history_timeout() -> u64 {
    10
}
fn default_period() -> usize {
    20
}
fn default_ema_fast() -> usize {
    50
}
fn default_ema_slow() -> usize {
    200
}
fn default_scan_depth() -> usize {
    8
}
fn default_max_concurrency() -> usize {
    8
}
fn default_min_request_gap() -> u64 {
    150
}
fn default_deadline() -> u64 {
    480
}
fn default_report_cap() -> usize {
    20
}
fn default_price_decimals() -> u32 {
    3
}
fn default_telegram_url() -> String {
    "https://api.telegram.org".to_string()
}
fn default_telegram_timeout() -> u64 {
    10
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// An empty `telegram.bot_token` is filled from `EGX_SCAN_BOT_TOKEN`
    /// here so the secret never has to live in the file.
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        if config.telegram.bot_token.is_empty() {
            if let Ok(token) = std::env::var(BOT_TOKEN_ENV) {
                config.telegram.bot_token = token;
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Strategy;

    const MINIMAL_TOML: &str = r#"
        [exchange]
        name = "EGX"

        [session]

        [universe]

        [history]

        [channel]

        [scan]

        [report]

        [telegram]
        destinations = ["12345"]

        [telemetry]
        log_level = "info"
    "#;

    #[test]
    fn test_config_defaults() {
        let config: Config = toml::from_str(MINIMAL_TOML).unwrap();
        assert_eq!(config.exchange.timezone, "Africa/Cairo");
        assert_eq!(config.exchange.screener, "egypt");
        assert_eq!(config.session.open, "10:00");
        assert_eq!(config.session.close, "14:45");
        assert_eq!(
            config.session.holidays,
            vec![chrono::Weekday::Fri, chrono::Weekday::Sat]
        );
        assert_eq!(config.universe.max_rows, 600);
        assert_eq!(config.history.resolution_minutes, 60);
        assert_eq!(config.history.min_bars, 21);
        assert_eq!(config.channel.period, 20);
        assert!(!config.channel.trend_filter);
        assert_eq!(config.scan.strategy, Strategy::FourState);
        assert_eq!(config.report.cap, 20);
    }

    #[test]
    fn test_config_full_deserialize() {
        let toml = r#"
            [exchange]
            name = "EGX"
            timezone = "Africa/Cairo"
            screener = "egypt"

            [session]
            open = "10:00"
            close = "14:45"
            holidays = ["Fri", "Sat"]

            [universe]
            max_rows = 300
            locale = "en"
            exclude_markers = ["Right"]

            [history]
            lookback_days = 20
            min_bars = 60

            [channel]
            period = 20
            trend_filter = true

            [scan]
            strategy = "breakout_only"
            depth = 4
            max_concurrency = 5

            [report]
            cap = 15
            price_decimals = 2

            [telegram]
            bot_token = "token"
            destinations = ["111", "222"]

            [telemetry]
            log_level = "debug"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.universe.max_rows, 300);
        assert_eq!(config.history.min_bars, 60);
        assert_eq!(config.scan.strategy, Strategy::BreakoutOnly);
        assert_eq!(config.scan.max_concurrency, 5);
        assert_eq!(config.report.cap, 15);
        assert_eq!(config.telegram.destinations.len(), 2);
        assert!(config.channel.trend_filter);
    }

    #[test]
    fn test_exclude_markers_default_covers_both_scripts() {
        let config: Config = toml::from_str(MINIMAL_TOML).unwrap();
        let markers = &config.universe.exclude_markers;
        assert!(markers.iter().any(|m| m == "Right"));
        assert!(markers.iter().any(|m| m == "حق"));
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }
}
