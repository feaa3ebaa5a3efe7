//! OHLCV Bars
//!
//! Aggregated bars keyed by symbol, plus the timeframe grammar accepted by the
//! market data API (`15Min`, `4Hour`, `1Day`, `1Week`, `3Month`).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::domain::quote::format_currency;

/// Bar aggregation period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeframe {
    /// 1–59 minutes.
    Minute(u8),
    /// 1–23 hours.
    Hour(u8),
    /// One trading day.
    #[default]
    Day,
    /// One week.
    Week,
    /// 1, 2, 3, 4, 6 or 12 months.
    Month(u8),
}

/// Timeframe parse error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timeframe '{0}' (expected e.g. 1Min, 4Hour, 1Day, 1Week, 3Month)")]
pub struct TimeframeError(pub String);

impl FromStr for Timeframe {
    type Err = TimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TimeframeError(s.to_string());
        let split = s.find(|c: char| !c.is_ascii_digit()).ok_or_else(err)?;
        let (amount, unit) = s.split_at(split);
        let amount: u8 = if amount.is_empty() {
            1
        } else {
            amount.parse().map_err(|_| err())?
        };

        let timeframe = match unit.to_ascii_lowercase().as_str() {
            "min" | "t" => Self::Minute(amount),
            "hour" | "h" => Self::Hour(amount),
            "day" | "d" => Self::Day,
            "week" | "w" => Self::Week,
            "month" | "m" => Self::Month(amount),
            _ => return Err(err()),
        };

        let valid = match timeframe {
            Self::Minute(n) => (1..=59).contains(&n),
            Self::Hour(n) => (1..=23).contains(&n),
            Self::Day | Self::Week => amount == 1,
            Self::Month(n) => matches!(n, 1 | 2 | 3 | 4 | 6 | 12),
        };
        if valid { Ok(timeframe) } else { Err(err()) }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minute(n) => write!(f, "{n}Min"),
            Self::Hour(n) => write!(f, "{n}Hour"),
            Self::Day => f.write_str("1Day"),
            Self::Week => f.write_str("1Week"),
            Self::Month(n) => write!(f, "{n}Month"),
        }
    }
}

/// One OHLCV bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    /// Bucket start.
    pub timestamp: DateTime<Utc>,
    /// Open price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Close price.
    pub close: Decimal,
    /// Traded volume (fractional for crypto).
    pub volume: Decimal,
}

/// Parameters for a historical crypto bars request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoBarsRequest {
    /// Pairs such as `BTC/USD`.
    pub symbols: Vec<String>,
    /// Aggregation period.
    pub timeframe: Timeframe,
    /// Inclusive start date (UTC).
    pub start: NaiveDate,
    /// Optional inclusive end date (UTC).
    pub end: Option<NaiveDate>,
    /// Maximum bars to collect across all pages.
    pub limit: Option<usize>,
}

/// Bars grouped by symbol, in the order the provider returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BarSet {
    bars: BTreeMap<String, Vec<Bar>>,
}

impl BarSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bars for a symbol.
    pub fn extend(&mut self, symbol: &str, bars: impl IntoIterator<Item = Bar>) {
        self.bars.entry(symbol.to_string()).or_default().extend(bars);
    }

    /// Total number of bars across symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.values().map(Vec::len).sum()
    }

    /// Whether no bars were returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bars for one symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&[Bar]> {
        self.bars.get(symbol).map(Vec::as_slice)
    }

    /// Iterate `(symbol, bars)` in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Bar])> {
        self.bars.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Drop bars beyond `limit`, keeping earlier symbols first.
    pub fn truncate(&mut self, limit: usize) {
        let mut remaining = limit;
        for bars in self.bars.values_mut() {
            bars.truncate(remaining);
            remaining -= bars.len();
        }
    }
}

/// Render one table per symbol.
#[must_use]
pub fn render_bars(set: &BarSet) -> String {
    let mut out = String::new();
    for (symbol, bars) in set.iter() {
        out.push_str(&format!("{symbol}\n"));
        out.push_str(&format!(
            "{:<20}{:<14}{:<14}{:<14}{:<14}{:<14}\n",
            "Date", "Open", "High", "Low", "Close", "Volume"
        ));
        for bar in bars {
            out.push_str(&format!(
                "{:<20}{:<14}{:<14}{:<14}{:<14}{:<14}\n",
                bar.timestamp.format("%Y-%m-%d %H:%M"),
                format_currency(bar.open),
                format_currency(bar.high),
                format_currency(bar.low),
                format_currency(bar.close),
                bar.volume.round_dp(4).normalize().to_string(),
            ));
        }
        out.push('\n');
    }
    out
}
