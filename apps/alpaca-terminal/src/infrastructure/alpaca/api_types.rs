//! Alpaca REST API wire types.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::bars::Bar;
use crate::domain::market::{AssetInfo, MarketClock};

/// Error body returned by Alpaca APIs.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaErrorResponse {
    /// Error code (numeric or string depending on the API).
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    /// Error message.
    pub message: String,
}

impl AlpacaErrorResponse {
    /// The code as plain text, if present.
    pub fn code_text(&self) -> Option<String> {
        self.code.as_ref().map(|code| match code {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

// ============================================================================
// Market Data
// ============================================================================

/// `GET /v2/stocks/{symbol}/quotes/latest`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LatestQuoteResponse {
    /// Quote payload; empty when the feed has nothing for the symbol.
    #[serde(default)]
    pub quote: QuoteData,
}

/// Quote payload. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteData {
    /// Bid price.
    #[serde(default)]
    pub bp: Option<Decimal>,
    /// Ask price.
    #[serde(default)]
    pub ap: Option<Decimal>,
}

/// `GET /v1beta3/crypto/us/bars`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CryptoBarsResponse {
    /// Bars keyed by symbol.
    #[serde(default)]
    pub bars: HashMap<String, Vec<BarData>>,
    /// Token for the next page, absent on the last page.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// One OHLCV bar.
#[derive(Debug, Clone, Deserialize)]
pub struct BarData {
    /// Bucket start.
    pub t: DateTime<Utc>,
    /// Open.
    pub o: Decimal,
    /// High.
    pub h: Decimal,
    /// Low.
    pub l: Decimal,
    /// Close.
    pub c: Decimal,
    /// Volume.
    pub v: Decimal,
}

impl From<BarData> for Bar {
    fn from(bar: BarData) -> Self {
        Self {
            timestamp: bar.t,
            open: bar.o,
            high: bar.h,
            low: bar.l,
            close: bar.c,
            volume: bar.v,
        }
    }
}

// ============================================================================
// Trading API
// ============================================================================

/// `GET /v2/clock`
#[derive(Debug, Clone, Deserialize)]
pub struct ClockResponse {
    /// Exchange time.
    pub timestamp: DateTime<FixedOffset>,
    /// Whether the market is open.
    pub is_open: bool,
    /// Next session open.
    pub next_open: DateTime<FixedOffset>,
    /// Next session close.
    pub next_close: DateTime<FixedOffset>,
}

impl From<ClockResponse> for MarketClock {
    fn from(clock: ClockResponse) -> Self {
        Self {
            timestamp: clock.timestamp,
            is_open: clock.is_open,
            next_open: clock.next_open,
            next_close: clock.next_close,
        }
    }
}

/// `GET /v2/assets/{symbol}`
#[derive(Debug, Clone, Deserialize)]
pub struct AssetResponse {
    /// Ticker.
    pub symbol: String,
    /// Instrument name.
    #[serde(default)]
    pub name: String,
    /// Listing exchange.
    #[serde(default)]
    pub exchange: String,
    /// Whether Alpaca allows trading it.
    #[serde(default)]
    pub tradable: bool,
}

impl From<AssetResponse> for AssetInfo {
    fn from(asset: AssetResponse) -> Self {
        Self {
            symbol: asset.symbol,
            name: asset.name,
            exchange: asset.exchange,
            tradable: asset.tradable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_quote_parses_numeric_prices() {
        let json = r#"{
            "symbol": "AAPL",
            "quote": {
                "t": "2025-02-21T20:59:59.123456Z",
                "ax": "V", "ap": 245.55, "as": 2,
                "bx": "V", "bp": 245.5, "bs": 1,
                "c": ["R"], "z": "C"
            }
        }"#;
        let response: LatestQuoteResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.quote.bp, Some(Decimal::new(2455, 1)));
        assert_eq!(response.quote.ap, Some(Decimal::new(24555, 2)));
    }

    #[test]
    fn empty_quote_has_no_prices() {
        let response: LatestQuoteResponse =
            serde_json::from_str(r#"{"symbol":"ZZZZ","quote":{}}"#).unwrap();
        assert!(response.quote.bp.is_none());
        assert!(response.quote.ap.is_none());
    }

    #[test]
    fn error_code_may_be_numeric() {
        let body: AlpacaErrorResponse =
            serde_json::from_str(r#"{"code":40010001,"message":"invalid symbol"}"#).unwrap();
        assert_eq!(body.code_text().as_deref(), Some("40010001"));

        let body: AlpacaErrorResponse =
            serde_json::from_str(r#"{"message":"Not Found"}"#).unwrap();
        assert!(body.code_text().is_none());
    }

    #[test]
    fn crypto_bars_page() {
        let json = r#"{
            "bars": {
                "BTC/USD": [
                    {"c": 96500.5, "h": 97000, "l": 95000.25, "n": 1234,
                     "o": 96000, "t": "2025-02-19T06:00:00Z", "v": 12.3456, "vw": 96400.1}
                ]
            },
            "next_page_token": "QlRDL1VTRHwy"
        }"#;
        let page: CryptoBarsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("QlRDL1VTRHwy"));
        let bar: Bar = page.bars["BTC/USD"][0].clone().into();
        assert_eq!(bar.close, Decimal::new(965_005, 1));
        assert_eq!(bar.volume, Decimal::new(123_456, 4));
    }

    #[test]
    fn clock_and_asset() {
        let clock: ClockResponse = serde_json::from_str(
            r#"{"timestamp":"2025-02-21T16:30:00.5-05:00","is_open":false,
                "next_open":"2025-02-24T09:30:00-05:00","next_close":"2025-02-24T16:00:00-05:00"}"#,
        )
        .unwrap();
        assert!(!MarketClock::from(clock).is_open);

        let asset: AssetResponse = serde_json::from_str(
            r#"{"id":"b0b6dd9d","class":"us_equity","exchange":"NASDAQ","symbol":"AAPL",
                "name":"Apple Inc. Common Stock","status":"active","tradable":true}"#,
        )
        .unwrap();
        assert_eq!(AssetInfo::from(asset).banner(), "AAPL - Apple Inc. Common Stock (NASDAQ)");
    }
}
