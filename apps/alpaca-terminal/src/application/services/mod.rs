//! Application Services
//!
//! - `QuotePoller`: polls the latest quote for one symbol until stopped
//! - `RetryPolicy`: opt-in exponential backoff for transient provider errors

/// Latest-quote polling loop.
pub mod quote_poller;

/// Backoff policy for retrying transient provider errors.
pub mod retry;

pub use quote_poller::{PollSummary, PollerError, PollerState, QuotePoller, QuotePollerConfig, StopReason};
pub use retry::{RetryConfig, RetryPolicy};
