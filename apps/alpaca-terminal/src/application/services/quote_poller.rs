//! Quote Poller
//!
//! Polls the latest quote for one symbol, prints one fixed-width row per poll,
//! and waits a fixed interval between polls until it is cancelled or the
//! provider fails.
//!
//! # States
//!
//! ```text
//! POLLING ──cancel token fired──────► STOPPED(Cancelled)
//!    │    ──symbol not found────────► STOPPED(SymbolNotFound)
//!    │    ──provider error──────────► STOPPED(ProviderFailed)
//!    └─── ──output closed───────────► STOPPED(OutputClosed)
//! ```
//!
//! STOPPED is terminal. Cancellation is observed at the top of each iteration,
//! while the provider request is in flight, and during the wait between polls,
//! so a stop request never waits longer than one poll interval.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::retry::{RetryConfig, RetryPolicy};
use crate::application::ports::{Clock, LocalClock, ProviderError, QuoteProviderPort};
use crate::domain::quote::{QuoteRow, table_header};

/// Configuration for a quote poller.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotePollerConfig {
    /// Normalized symbol to poll.
    pub symbol: String,
    /// Wait between consecutive polls.
    pub poll_interval: Duration,
    /// Retry policy for transient provider errors (disabled by default).
    pub retry: RetryConfig,
}

impl QuotePollerConfig {
    /// Default wait between polls.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

    /// Create a configuration with the default interval and no retries.
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            retry: RetryConfig::default(),
        }
    }

    /// Set the poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// Why the poller stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The cancellation token fired (Ctrl+C, SIGTERM).
    Cancelled,
    /// The provider does not know the symbol.
    SymbolNotFound,
    /// The provider failed and no retry was allowed.
    ProviderFailed(ProviderError),
    /// Writing a row failed (closed pipe, full disk).
    OutputClosed,
}

impl StopReason {
    /// Whether the stop should be reported as a failure.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Poller lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerState {
    /// Created or running.
    Polling,
    /// Finished; terminal.
    Stopped(StopReason),
}

/// What a finished run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSummary {
    /// Provider requests issued (including failed ones).
    pub requests: u64,
    /// Rows printed.
    pub rows: u64,
    /// Why polling ended.
    pub reason: StopReason,
}

/// Quote poller errors.
#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    /// The output sink rejected a write.
    #[error("failed to write quote output: {0}")]
    Output(#[from] std::io::Error),

    /// `run` was called on a poller that already stopped.
    #[error("quote poller already stopped: {0:?}")]
    AlreadyStopped(StopReason),
}

/// Polls one symbol and renders a row per poll to `W`.
pub struct QuotePoller<W> {
    config: QuotePollerConfig,
    provider: Arc<dyn QuoteProviderPort>,
    clock: Arc<dyn Clock>,
    out: W,
    cancel: CancellationToken,
    state: PollerState,
}

impl<W> std::fmt::Debug for QuotePoller<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotePoller")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<W: Write + Send> QuotePoller<W> {
    /// Create a poller that stamps rows with the local wall clock.
    #[must_use]
    pub fn new(
        config: QuotePollerConfig,
        provider: Arc<dyn QuoteProviderPort>,
        out: W,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            provider,
            clock: Arc::new(LocalClock),
            out,
            cancel,
            state: PollerState::Polling,
        }
    }

    /// Replace the row timestamp source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> &PollerState {
        &self.state
    }

    /// Consume the poller and return the output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Poll until cancelled or the provider fails.
    ///
    /// Prints the table header once, then one row per successful poll. A
    /// cancelled run prints exactly one termination line.
    #[tracing::instrument(skip(self), fields(symbol = %self.config.symbol))]
    pub async fn run(&mut self) -> Result<PollSummary, PollerError> {
        if let PollerState::Stopped(reason) = &self.state {
            return Err(PollerError::AlreadyStopped(reason.clone()));
        }

        let mut requests = 0;
        let mut rows = 0;
        let outcome = self.poll_loop(&mut requests, &mut rows).await;

        let reason = match &outcome {
            Ok(reason) => reason.clone(),
            Err(_) => StopReason::OutputClosed,
        };
        self.state = PollerState::Stopped(reason.clone());

        tracing::info!(requests, rows, reason = ?reason, "Quote poller stopped");

        outcome.map(|reason| PollSummary {
            requests,
            rows,
            reason,
        })
        .map_err(PollerError::from)
    }

    async fn poll_loop(&mut self, requests: &mut u64, rows: &mut u64) -> std::io::Result<StopReason> {
        writeln!(self.out, "{}", table_header())?;
        self.out.flush()?;

        let symbol = self.config.symbol.clone();
        let mut retry = RetryPolicy::new(self.config.retry.clone());

        let reason = loop {
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }

            *requests += 1;
            let result = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break StopReason::Cancelled,
                result = self.provider.latest_quote(&symbol) => result,
            };

            let wait = match result {
                Ok(quote) => {
                    retry.reset();
                    let row = QuoteRow::new(self.clock.now(), &quote);
                    writeln!(self.out, "{row}")?;
                    self.out.flush()?;
                    *rows += 1;
                    self.config.poll_interval
                }
                Err(ProviderError::NotFound { .. }) => {
                    tracing::warn!("Provider does not recognize symbol");
                    writeln!(
                        self.out,
                        "Symbol '{symbol}' not found. It may be invalid or not supported by the data feed."
                    )?;
                    break StopReason::SymbolNotFound;
                }
                Err(err) if err.is_retryable() => {
                    let Some(delay) = retry.next_delay() else {
                        tracing::error!(error = %err, "Quote request failed");
                        writeln!(self.out, "Error fetching quote for {symbol}: {err}")?;
                        break StopReason::ProviderFailed(err);
                    };
                    let delay = match &err {
                        ProviderError::RateLimited { retry_after_secs } => {
                            delay.max(Duration::from_secs(*retry_after_secs))
                        }
                        _ => delay,
                    };
                    tracing::warn!(
                        error = %err,
                        attempt = retry.attempt_count(),
                        max_attempts = retry.max_attempts(),
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Quote request failed, retrying"
                    );
                    writeln!(
                        self.out,
                        "Error fetching quote for {symbol}: {err} (retry {}/{} in {}ms)",
                        retry.attempt_count(),
                        retry.max_attempts(),
                        delay.as_millis()
                    )?;
                    delay
                }
                Err(err) => {
                    tracing::error!(error = %err, "Quote request failed");
                    writeln!(self.out, "Error fetching quote for {symbol}: {err}")?;
                    break StopReason::ProviderFailed(err);
                }
            };

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break StopReason::Cancelled,
                () = tokio::time::sleep(wait) => {}
            }
        };

        if reason == StopReason::Cancelled {
            writeln!(self.out, "\nStopped streaming quotes for {symbol}.")?;
        }
        self.out.flush()?;

        Ok(reason)
    }
}
