//! Application Use Cases
//!
//! One-shot commands that sit next to the quote poller: the market clock
//! check, the asset banner shown before streaming, and the crypto bars fetch.

mod asset_banner;
mod crypto_bars;
mod market_clock;

pub use asset_banner::AssetBannerUseCase;
pub use crypto_bars::CryptoBarsUseCase;
pub use market_clock::{MarketClockUseCase, render_clock};

use chrono::NaiveDate;

use crate::application::ports::ProviderError;

/// Errors from one-shot commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The provider call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The requested date range is empty.
    #[error("start date {start} is after end date {end}")]
    InvalidRange {
        /// Requested start.
        start: NaiveDate,
        /// Requested end.
        end: NaiveDate,
    },

    /// No symbols were requested.
    #[error("at least one symbol is required")]
    NoSymbols,
}
