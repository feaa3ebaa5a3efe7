//! Quote Snapshots
//!
//! A quote is the latest bid/ask pair for one symbol. Either side may be
//! missing (empty book side, feed gap); a missing side renders as `N/A` and is
//! never treated as an error. The spread is derived on demand and never stored.

use std::fmt;

use chrono::NaiveTime;
use rust_decimal::{Decimal, RoundingStrategy};

/// Placeholder rendered for an unavailable price or spread.
pub const UNAVAILABLE: &str = "N/A";

/// Width of the `Time` column.
pub const TIME_WIDTH: usize = 10;
/// Width of the `Bid` and `Ask` columns.
pub const PRICE_WIDTH: usize = 12;
/// Width of the `Spread` column.
pub const SPREAD_WIDTH: usize = 10;

/// Latest bid/ask snapshot for a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Symbol the quote was requested for.
    pub symbol: String,
    /// Best bid, if the provider reported one.
    pub bid_price: Option<Decimal>,
    /// Best ask, if the provider reported one.
    pub ask_price: Option<Decimal>,
}

impl Quote {
    /// Create a new quote snapshot.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        bid_price: Option<Decimal>,
        ask_price: Option<Decimal>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            bid_price,
            ask_price,
        }
    }

    /// Ask minus bid, when both sides are present.
    #[must_use]
    pub fn spread(&self) -> Option<Decimal> {
        match (self.bid_price, self.ask_price) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }
}

/// Format a value as dollars with exactly two decimals (`$0.05`).
#[must_use]
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${rounded:.2}")
}

/// Format an optional price, falling back to `N/A`.
#[must_use]
pub fn format_price(value: Option<Decimal>) -> String {
    value.map_or_else(|| UNAVAILABLE.to_string(), format_currency)
}

/// The table header printed once before the first row.
#[must_use]
pub fn table_header() -> String {
    format!(
        "{:<TIME_WIDTH$}{:<PRICE_WIDTH$}{:<PRICE_WIDTH$}{:<SPREAD_WIDTH$}",
        "Time", "Bid", "Ask", "Spread"
    )
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRow {
    time: String,
    bid: String,
    ask: String,
    spread: String,
}

impl QuoteRow {
    /// Render a quote observed at `time` (local wall clock).
    #[must_use]
    pub fn new(time: NaiveTime, quote: &Quote) -> Self {
        Self {
            time: time.format("%H:%M:%S").to_string(),
            bid: format_price(quote.bid_price),
            ask: format_price(quote.ask_price),
            spread: format_price(quote.spread()),
        }
    }

    /// The `HH:MM:SS` column.
    #[must_use]
    pub fn time(&self) -> &str {
        &self.time
    }

    /// The spread column.
    #[must_use]
    pub fn spread(&self) -> &str {
        &self.spread
    }

    /// Everything after the time column.
    #[must_use]
    pub fn prices(&self) -> (&str, &str, &str) {
        (&self.bid, &self.ask, &self.spread)
    }
}

impl fmt::Display for QuoteRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<TIME_WIDTH$}{:<PRICE_WIDTH$}{:<PRICE_WIDTH$}{:<SPREAD_WIDTH$}",
            self.time, self.bid, self.ask, self.spread
        )
    }
}
