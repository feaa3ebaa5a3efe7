//! Port Interfaces
//!
//! Driven (outbound) ports for the market data provider. The Alpaca REST
//! adapter in the infrastructure layer implements all of them; tests use
//! `mockall` mocks or hand-written fakes.
//!
//! Every provider failure is classified into a [`ProviderError`] variant by the
//! adapter, so callers switch on the variant instead of inspecting messages.

use async_trait::async_trait;
use chrono::{Local, NaiveTime};

use crate::domain::bars::{BarSet, CryptoBarsRequest};
use crate::domain::market::{AssetInfo, MarketClock};
use crate::domain::quote::Quote;

/// Classified provider failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The symbol is unknown or unsupported by the feed.
    #[error("symbol not found: {symbol}")]
    NotFound {
        /// Symbol that was requested.
        symbol: String,
    },

    /// Credentials were missing or rejected.
    #[error("provider rejected the API credentials")]
    Unauthorized,

    /// Too many requests.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Server-suggested wait.
        retry_after_secs: u64,
    },

    /// Network failure, timeout, 5xx, or unreadable payload.
    #[error("provider unavailable: {message}")]
    Transient {
        /// Error details.
        message: String,
    },

    /// Any other non-success response.
    #[error("provider error {code}: {message}")]
    Api {
        /// HTTP status or provider error code.
        code: String,
        /// Error message from the provider.
        message: String,
    },
}

impl ProviderError {
    /// Whether a retry could plausibly succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Transient { .. })
    }
}

/// Latest-quote lookups for a single symbol.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteProviderPort: Send + Sync {
    /// Fetch the most recent bid/ask for `symbol`.
    async fn latest_quote(&self, symbol: &str) -> Result<Quote, ProviderError>;
}

/// Exchange clock lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketClockPort: Send + Sync {
    /// Fetch the current market clock.
    async fn market_clock(&self) -> Result<MarketClock, ProviderError>;
}

/// Asset reference lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetPort: Send + Sync {
    /// Describe the asset behind `symbol`.
    async fn asset(&self, symbol: &str) -> Result<AssetInfo, ProviderError>;
}

/// Historical crypto bars.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CryptoBarsPort: Send + Sync {
    /// Fetch every page of bars matching `request`.
    async fn crypto_bars(&self, request: &CryptoBarsRequest) -> Result<BarSet, ProviderError>;
}

/// Source of the wall-clock time printed on each row.
pub trait Clock: Send + Sync {
    /// Current local time of day.
    fn now(&self) -> NaiveTime;
}

/// The system's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(ProviderError::RateLimited { retry_after_secs: 1 }.is_retryable());
        assert!(
            ProviderError::Transient {
                message: "timeout".to_string()
            }
            .is_retryable()
        );
        assert!(
            !ProviderError::NotFound {
                symbol: "ZZZZ".to_string()
            }
            .is_retryable()
        );
        assert!(!ProviderError::Unauthorized.is_retryable());
        assert!(
            !ProviderError::Api {
                code: "400".to_string(),
                message: "bad request".to_string()
            }
            .is_retryable()
        );
    }

    #[test]
    fn not_found_message_names_symbol() {
        let err = ProviderError::NotFound {
            symbol: "ZZZZ".to_string(),
        };
        assert_eq!(err.to_string(), "symbol not found: ZZZZ");
    }
}
