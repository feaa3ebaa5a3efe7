//! Crypto Bars Use Case

use std::sync::Arc;

use super::CommandError;
use crate::application::ports::CryptoBarsPort;
use crate::domain::bars::{BarSet, CryptoBarsRequest};

/// Fetches historical crypto bars.
pub struct CryptoBarsUseCase<B>
where
    B: CryptoBarsPort,
{
    bars: Arc<B>,
}

impl<B> CryptoBarsUseCase<B>
where
    B: CryptoBarsPort,
{
    /// Create a new `CryptoBarsUseCase`.
    pub const fn new(bars: Arc<B>) -> Self {
        Self { bars }
    }

    /// Validate the request, fetch every page, and apply the limit.
    pub async fn execute(&self, request: &CryptoBarsRequest) -> Result<BarSet, CommandError> {
        if request.symbols.is_empty() {
            return Err(CommandError::NoSymbols);
        }
        if let Some(end) = request.end.filter(|end| request.start > *end) {
            return Err(CommandError::InvalidRange {
                start: request.start,
                end,
            });
        }

        let mut set = self.bars.crypto_bars(request).await?;
        if let Some(limit) = request.limit {
            set.truncate(limit);
        }

        tracing::debug!(
            symbols = ?request.symbols,
            timeframe = %request.timeframe,
            bars = set.len(),
            "Fetched crypto bars"
        );
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;
    use crate::application::ports::{MockCryptoBarsPort, ProviderError};
    use crate::domain::bars::{Bar, Timeframe};

    fn request() -> CryptoBarsRequest {
        CryptoBarsRequest {
            symbols: vec!["BTC/USD".to_string()],
            timeframe: Timeframe::Day,
            start: NaiveDate::from_ymd_opt(2025, 2, 19).unwrap(),
            end: None,
            limit: None,
        }
    }

    fn bar(day: u32) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2025, 2, day, 0, 0, 0).unwrap(),
            open: Decimal::new(96_000, 0),
            high: Decimal::new(97_000, 0),
            low: Decimal::new(95_000, 0),
            close: Decimal::new(96_500, 0),
            volume: Decimal::new(12_345, 3),
        }
    }

    fn three_bars() -> BarSet {
        let mut set = BarSet::new();
        set.extend("BTC/USD", [bar(19), bar(20), bar(21)]);
        set
    }

    #[tokio::test]
    async fn returns_all_bars() {
        let mut port = MockCryptoBarsPort::new();
        port.expect_crypto_bars().times(1).returning(|_| Ok(three_bars()));

        let use_case = CryptoBarsUseCase::new(Arc::new(port));
        let set = use_case.execute(&request()).await.unwrap();
        assert_eq!(set.len(), 3);
    }

    #[tokio::test]
    async fn applies_limit() {
        let mut port = MockCryptoBarsPort::new();
        port.expect_crypto_bars().returning(|_| Ok(three_bars()));

        let use_case = CryptoBarsUseCase::new(Arc::new(port));
        let set = use_case
            .execute(&CryptoBarsRequest {
                limit: Some(2),
                ..request()
            })
            .await
            .unwrap();
        assert_eq!(set.get("BTC/USD").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rejects_inverted_range_without_calling_provider() {
        let mut port = MockCryptoBarsPort::new();
        port.expect_crypto_bars().never();

        let use_case = CryptoBarsUseCase::new(Arc::new(port));
        let err = use_case
            .execute(&CryptoBarsRequest {
                end: NaiveDate::from_ymd_opt(2025, 2, 1),
                ..request()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidRange { .. }));
    }

    #[tokio::test]
    async fn rejects_empty_symbols() {
        let mut port = MockCryptoBarsPort::new();
        port.expect_crypto_bars().never();

        let use_case = CryptoBarsUseCase::new(Arc::new(port));
        let err = use_case
            .execute(&CryptoBarsRequest {
                symbols: vec![],
                ..request()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::NoSymbols));
    }

    #[tokio::test]
    async fn propagates_provider_error() {
        let mut port = MockCryptoBarsPort::new();
        port.expect_crypto_bars().returning(|_| {
            Err(ProviderError::Transient {
                message: "timeout".to_string(),
            })
        });

        let use_case = CryptoBarsUseCase::new(Arc::new(port));
        let err = use_case.execute(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "provider unavailable: timeout");
    }
}
