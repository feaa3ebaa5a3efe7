//! Alpaca REST Adapter
//!
//! Implements the market data ports against Alpaca's REST APIs:
//! - Latest stock quotes (`/v2/stocks/{symbol}/quotes/latest`)
//! - Market clock (`/v2/clock`) and assets (`/v2/assets/{symbol}`)
//! - Historical crypto bars (`/v1beta3/crypto/us/bars`) with pagination
//!
//! HTTP failures are classified into [`ProviderError`](crate::application::ports::ProviderError)
//! variants; retrying is left to the caller.

mod api_types;
mod error;
mod http_client;
mod market_data;

pub use error::AlpacaError;
pub use http_client::AlpacaHttpClient;
pub use market_data::AlpacaMarketData;
