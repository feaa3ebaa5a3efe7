//! Terminal Configuration Settings
//!
//! Configuration types for the terminal, loaded from environment variables.
//! Loading goes through a lookup function so tests can supply a fixed map
//! instead of mutating the process environment.

use std::time::Duration;

use crate::application::services::RetryConfig;

/// Default Alpaca market data API base URL.
pub const DEFAULT_DATA_URL: &str = "https://data.alpaca.markets";

/// Market data feed for stock quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFeed {
    /// IEX (Investors Exchange) - Free tier with limited data.
    #[default]
    Iex,
    /// SIP (Securities Information Processor) - Full market data.
    Sip,
}

impl DataFeed {
    /// Parse feed type from string.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "sip" => Self::Sip,
            _ => Self::Iex,
        }
    }

    /// Feed name for the `feed` query parameter.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sip => "sip",
            Self::Iex => "iex",
        }
    }
}

/// Trading environment (paper vs live).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Paper trading environment (simulated).
    #[default]
    Paper,
    /// Live trading environment (real money).
    Live,
}

impl Environment {
    /// Parse environment from string.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "LIVE" => Self::Live,
            _ => Self::Paper,
        }
    }

    /// Check if this is the live environment.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }

    /// Get the environment name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::Live => "live",
        }
    }

    /// Base URL of the trading API (clock, assets).
    #[must_use]
    pub const fn trading_base_url(&self) -> &'static str {
        match self {
            Self::Paper => "https://paper-api.alpaca.markets",
            Self::Live => "https://api.alpaca.markets",
        }
    }
}

/// Alpaca API credentials.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }

    /// Get the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the API secret.
    #[must_use]
    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Alpaca REST connection settings.
#[derive(Debug, Clone)]
pub struct AlpacaSettings {
    /// Trading environment.
    pub environment: Environment,
    /// Stock quote feed.
    pub feed: DataFeed,
    /// API credentials, if configured.
    pub credentials: Option<Credentials>,
    /// Trading API base URL.
    pub trading_url: String,
    /// Market data API base URL.
    pub data_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for AlpacaSettings {
    fn default() -> Self {
        let environment = Environment::default();
        Self {
            environment,
            feed: DataFeed::default(),
            credentials: None,
            trading_url: environment.trading_base_url().to_string(),
            data_url: DEFAULT_DATA_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl AlpacaSettings {
    /// Switch environment, moving the trading URL along unless it was overridden.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        if self.trading_url == self.environment.trading_base_url() {
            self.trading_url = environment.trading_base_url().to_string();
        }
        self.environment = environment;
        self
    }

    /// Credentials, or an error naming the missing variable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` when no credentials were loaded.
    pub fn require_credentials(&self) -> Result<&Credentials, ConfigError> {
        self.credentials
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("ALPACA_KEY".to_string()))
    }
}

/// Quote polling settings.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Wait between polls.
    pub interval: Duration,
    /// Retry policy for transient errors.
    pub retry: RetryConfig,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            retry: RetryConfig::default(),
        }
    }
}

/// Complete terminal configuration.
#[derive(Debug, Clone, Default)]
pub struct TerminalConfig {
    /// Alpaca REST settings.
    pub alpaca: AlpacaSettings,
    /// Quote polling settings.
    pub poll: PollSettings,
}

impl TerminalConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if only one credential is set or either is empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if only one credential is set or either is empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let credentials = match (lookup("ALPACA_KEY"), lookup("ALPACA_SECRET")) {
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingEnvVar("ALPACA_SECRET".to_string())),
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar("ALPACA_KEY".to_string())),
            (Some(api_key), Some(api_secret)) => {
                if api_key.is_empty() {
                    return Err(ConfigError::EmptyValue("ALPACA_KEY".to_string()));
                }
                if api_secret.is_empty() {
                    return Err(ConfigError::EmptyValue("ALPACA_SECRET".to_string()));
                }
                Some(Credentials::new(api_key, api_secret))
            }
        };

        let environment = lookup("ALPACA_ENV")
            .map(|s| Environment::from_str_case_insensitive(&s))
            .unwrap_or_default();

        let feed = lookup("ALPACA_FEED")
            .map(|s| DataFeed::from_str_case_insensitive(&s))
            .unwrap_or_default();

        let defaults = AlpacaSettings::default();
        let alpaca = AlpacaSettings {
            environment,
            feed,
            credentials,
            trading_url: non_empty(&lookup, "ALPACA_BASE_URL")
                .unwrap_or_else(|| environment.trading_base_url().to_string()),
            data_url: non_empty(&lookup, "ALPACA_DATA_URL").unwrap_or(defaults.data_url),
            timeout: parse_duration_secs(&lookup, "ALPACA_HTTP_TIMEOUT_SECS", defaults.timeout),
        };

        let retry_defaults = RetryConfig::default();
        let poll = PollSettings {
            interval: parse_duration_millis(
                &lookup,
                "QUOTE_POLL_INTERVAL_MS",
                PollSettings::default().interval,
            ),
            retry: RetryConfig {
                max_attempts: parse_u32(
                    &lookup,
                    "QUOTE_RETRY_MAX_ATTEMPTS",
                    retry_defaults.max_attempts,
                ),
                initial_delay: parse_duration_millis(
                    &lookup,
                    "QUOTE_RETRY_INITIAL_DELAY_MS",
                    retry_defaults.initial_delay,
                ),
                max_delay: parse_duration_secs(
                    &lookup,
                    "QUOTE_RETRY_MAX_DELAY_SECS",
                    retry_defaults.max_delay,
                ),
                multiplier: parse_f64(&lookup, "QUOTE_RETRY_MULTIPLIER", retry_defaults.multiplier),
                jitter_factor: retry_defaults.jitter_factor,
            },
        };

        Ok(Self { alpaca, poll })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parse_u32(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> u32 {
    lookup(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_f64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> f64 {
    lookup(key)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 1.0)
        .unwrap_or(default)
}

fn parse_duration_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Duration {
    lookup(key)
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .map_or(default, Duration::from_secs)
}

fn parse_duration_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Duration {
    lookup(key)
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .map_or(default, Duration::from_millis)
}
