#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Alpaca Terminal - Market Data Console
//!
//! Terminal tools over Alpaca's REST APIs. The centerpiece is a quote poller
//! that prints the latest bid, ask and spread for one symbol every half second
//! until interrupted.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Quotes, symbols, bars and market reference data
//!   - `quote`: Spread derivation and fixed-width row rendering
//!   - `symbol`: Ticker normalization and validation
//!   - `bars`: Timeframes and OHLCV tables
//!   - `market`: Market clock and asset banner
//!
//! - **Application**: Ports, services and use cases
//!   - `ports`: Provider interfaces and the classified `ProviderError`
//!   - `services`: Quote poller and its retry policy
//!   - `use_cases`: Market clock, asset banner, crypto bars
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `alpaca`: REST adapter implementing every port
//!   - `config`: Environment-driven configuration
//!   - `telemetry`: Tracing subscriber and optional OTLP export
//!
//! # Quote Poller
//!
//! ```text
//!             ┌──────── wait poll interval ◄───────┐
//!             ▼                                    │
//! start ─► POLLING ─► latest_quote ─► print row ───┘
//!             │
//!             ├── cancel token ─────► STOPPED (one termination line)
//!             ├── symbol not found ─► STOPPED (one diagnostic line)
//!             └── provider error ───► STOPPED (error line)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Market data types with no I/O.
pub mod domain;

/// Application layer - Ports, services and use cases.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::bars::{Bar, BarSet, CryptoBarsRequest, Timeframe, TimeframeError, render_bars};
pub use domain::market::{AssetInfo, MarketClock};
pub use domain::quote::{Quote, QuoteRow, table_header};
pub use domain::symbol::{Symbol, SymbolError};

// Ports
pub use application::ports::{
    AssetPort, Clock, CryptoBarsPort, LocalClock, MarketClockPort, ProviderError,
    QuoteProviderPort,
};

// Services
pub use application::services::{
    PollSummary, PollerError, PollerState, QuotePoller, QuotePollerConfig, RetryConfig,
    RetryPolicy, StopReason,
};

// Use cases
pub use application::use_cases::{
    AssetBannerUseCase, CommandError, CryptoBarsUseCase, MarketClockUseCase, render_clock,
};

// Infrastructure
pub use infrastructure::alpaca::{AlpacaError, AlpacaHttpClient, AlpacaMarketData};
pub use infrastructure::config::{
    AlpacaSettings, ConfigError, Credentials, DataFeed, Environment, PollSettings, TerminalConfig,
};
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
