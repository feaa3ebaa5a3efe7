//! Market Clock Use Case

use std::fmt::Write as _;
use std::sync::Arc;

use super::CommandError;
use crate::application::ports::MarketClockPort;
use crate::domain::market::{MarketClock, format_countdown};

/// Fetches the exchange clock.
pub struct MarketClockUseCase<C>
where
    C: MarketClockPort,
{
    clock: Arc<C>,
}

impl<C> MarketClockUseCase<C>
where
    C: MarketClockPort,
{
    /// Create a new `MarketClockUseCase`.
    pub const fn new(clock: Arc<C>) -> Self {
        Self { clock }
    }

    /// Fetch the current clock snapshot.
    pub async fn execute(&self) -> Result<MarketClock, CommandError> {
        let clock = self.clock.market_clock().await?;
        tracing::debug!(is_open = clock.is_open, timestamp = %clock.timestamp, "Fetched market clock");
        Ok(clock)
    }
}

/// Render the clock report printed by the `clock` command.
#[must_use]
pub fn render_clock(clock: &MarketClock) -> String {
    let mut out = String::new();
    let status = if clock.is_open { "OPEN" } else { "CLOSED" };
    let _ = writeln!(out, "Market is {status}");
    let _ = writeln!(out, "Current time: {}", clock.timestamp.format("%Y-%m-%d %H:%M:%S %:z"));
    let _ = writeln!(out, "Next open:    {}", clock.next_open.format("%Y-%m-%d %H:%M:%S %:z"));
    let _ = writeln!(out, "Next close:   {}", clock.next_close.format("%Y-%m-%d %H:%M:%S %:z"));
    if let Some(delta) = clock.time_until_open() {
        let _ = writeln!(out, "Opens in:     {}", format_countdown(delta));
    }
    if let Some(delta) = clock.time_until_close() {
        let _ = writeln!(out, "Closes in:    {}", format_countdown(delta));
    }
    out
}
