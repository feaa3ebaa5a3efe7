//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the quote poller and the one-shot commands, written
//! against port traits so tests can substitute fake providers.

/// Port interfaces for external market data providers.
pub mod ports;

/// Long-running services (the quote poller and its retry policy).
pub mod services;

/// One-shot commands (market clock, crypto bars, asset banner).
pub mod use_cases;
