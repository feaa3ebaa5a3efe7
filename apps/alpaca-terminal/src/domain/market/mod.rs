//! Market Reference Data
//!
//! Exchange clock state and asset descriptions used for one-shot checks.

use chrono::{DateTime, FixedOffset, TimeDelta};

/// Exchange clock snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketClock {
    /// Exchange time when the snapshot was taken.
    pub timestamp: DateTime<FixedOffset>,
    /// Whether the regular session is open.
    pub is_open: bool,
    /// Start of the next regular session.
    pub next_open: DateTime<FixedOffset>,
    /// End of the current or next regular session.
    pub next_close: DateTime<FixedOffset>,
}

impl MarketClock {
    /// Time left until the next open, or `None` while the market is open.
    #[must_use]
    pub fn time_until_open(&self) -> Option<TimeDelta> {
        if self.is_open {
            return None;
        }
        Some((self.next_open - self.timestamp).max(TimeDelta::zero()))
    }

    /// Time left until the close, or `None` while the market is closed.
    #[must_use]
    pub fn time_until_close(&self) -> Option<TimeDelta> {
        if !self.is_open {
            return None;
        }
        Some((self.next_close - self.timestamp).max(TimeDelta::zero()))
    }
}

/// Render a duration as `Xh Ym` (days are folded into hours).
#[must_use]
pub fn format_countdown(delta: TimeDelta) -> String {
    let minutes = delta.num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Asset description shown above the quote table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    /// Ticker symbol.
    pub symbol: String,
    /// Company or instrument name.
    pub name: String,
    /// Listing exchange.
    pub exchange: String,
    /// Whether the asset is tradable at Alpaca.
    pub tradable: bool,
}

impl AssetInfo {
    /// One-line banner: `AAPL - Apple Inc. Common Stock (NASDAQ)`.
    #[must_use]
    pub fn banner(&self) -> String {
        let mut line = format!("{} - {} ({})", self.symbol, self.name, self.exchange);
        if !self.tradable {
            line.push_str(" [not tradable]");
        }
        line
    }
}
