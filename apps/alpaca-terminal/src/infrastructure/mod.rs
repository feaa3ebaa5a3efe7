//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// Alpaca REST adapters (latest quotes, clock, assets, crypto bars).
pub mod alpaca;

/// Configuration loaded from the environment.
pub mod config;

/// Tracing subscriber and optional OpenTelemetry export.
pub mod telemetry;
