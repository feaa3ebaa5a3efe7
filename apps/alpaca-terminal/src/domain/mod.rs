//! Domain Layer - Market data snapshots and their terminal rendering.
//!
//! Pure types with no I/O. Every value here is produced fresh from a single
//! provider response and never mutated afterwards.

/// Latest-quote snapshots, spread derivation, and table rows.
pub mod quote;

/// Ticker symbol normalization and validation.
pub mod symbol;

/// Market clock and asset reference data.
pub mod market;

/// OHLCV bars and timeframes.
pub mod bars;
