//! Quote Poller Integration Tests
//!
//! Drives the poller through the public API with an in-process provider and
//! paused tokio time.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveTime;
use rust_decimal::Decimal;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use alpaca_terminal::{
    Clock, PollerState, ProviderError, Quote, QuotePoller, QuotePollerConfig, QuoteProviderPort,
    RetryConfig, StopReason, table_header,
};

/// Provider whose answer can be changed while the poller runs.
struct SwitchableProvider {
    next: Mutex<Result<Quote, ProviderError>>,
    requested_at: Mutex<Vec<Instant>>,
}

impl SwitchableProvider {
    fn new(initial: Result<Quote, ProviderError>) -> Self {
        Self {
            next: Mutex::new(initial),
            requested_at: Mutex::new(Vec::new()),
        }
    }

    fn set(&self, next: Result<Quote, ProviderError>) {
        *self.next.lock().unwrap() = next;
    }

    fn request_times(&self) -> Vec<Instant> {
        self.requested_at.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteProviderPort for SwitchableProvider {
    async fn latest_quote(&self, _symbol: &str) -> Result<Quote, ProviderError> {
        self.requested_at.lock().unwrap().push(Instant::now());
        self.next.lock().unwrap().clone()
    }
}

/// Counts seconds from 10:00:00.
struct FixedStepClock(AtomicU32);

impl Clock for FixedStepClock {
    fn now(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(10, 0, self.0.fetch_add(1, Ordering::SeqCst)).unwrap()
    }
}

fn spy(bid: i64, ask: i64) -> Quote {
    Quote::new("SPY", Some(Decimal::new(bid, 2)), Some(Decimal::new(ask, 2)))
}

fn cancel_after(token: &CancellationToken, after: Duration) {
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        trigger.cancel();
    });
}

fn build(
    config: QuotePollerConfig,
    provider: Arc<SwitchableProvider>,
    token: &CancellationToken,
) -> QuotePoller<Vec<u8>> {
    QuotePoller::new(config, provider, Vec::new(), token.clone())
        .with_clock(Arc::new(FixedStepClock(AtomicU32::new(0))))
}

#[tokio::test(start_paused = true)]
async fn rows_align_under_header() {
    let provider = Arc::new(SwitchableProvider::new(Ok(spy(60_012, 60_015))));
    let token = CancellationToken::new();
    let mut poller = build(QuotePollerConfig::new("SPY"), provider, &token);

    cancel_after(&token, Duration::from_millis(1100));
    poller.run().await.unwrap();

    let output = String::from_utf8(poller.into_output()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], table_header());
    assert_eq!(lines[1], "10:00:00  $600.12     $600.15     $0.03     ");
    assert_eq!(lines[2], "10:00:01  $600.12     $600.15     $0.03     ");
    assert_eq!(lines[3], "10:00:02  $600.12     $600.15     $0.03     ");
    assert_eq!(lines[4], "");
    assert_eq!(lines[5], "Stopped streaming quotes for SPY.");
    assert_eq!(lines.len(), 6);
}

#[tokio::test(start_paused = true)]
async fn requests_are_spaced_by_poll_interval() {
    let provider = Arc::new(SwitchableProvider::new(Ok(spy(100, 101))));
    let token = CancellationToken::new();
    let interval = Duration::from_millis(250);
    let mut poller = build(
        QuotePollerConfig::new("SPY").with_poll_interval(interval),
        provider.clone(),
        &token,
    );

    cancel_after(&token, Duration::from_millis(900));
    poller.run().await.unwrap();

    let times = provider.request_times();
    assert_eq!(times.len(), 4);
    for pair in times.windows(2) {
        assert_eq!(pair[1] - pair[0], interval);
    }
}

#[tokio::test(start_paused = true)]
async fn gap_in_book_then_recovery() {
    let provider = Arc::new(SwitchableProvider::new(Ok(Quote::new(
        "SPY",
        Some(Decimal::new(60_012, 2)),
        None,
    ))));
    let token = CancellationToken::new();
    let mut poller = build(QuotePollerConfig::new("SPY"), provider.clone(), &token);

    let switch = provider.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        switch.set(Ok(spy(60_012, 60_013)));
    });
    cancel_after(&token, Duration::from_millis(600));
    poller.run().await.unwrap();

    let output = String::from_utf8(poller.into_output()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert!(lines[1].ends_with("N/A         N/A       "));
    assert!(lines[2].ends_with("$0.01     "));
}

#[tokio::test(start_paused = true)]
async fn symbol_disappearing_mid_stream_stops_polling() {
    let provider = Arc::new(SwitchableProvider::new(Ok(spy(100, 101))));
    let token = CancellationToken::new();
    let mut poller = build(QuotePollerConfig::new("SPY"), provider.clone(), &token);

    let switch = provider.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(750)).await;
        switch.set(Err(ProviderError::NotFound {
            symbol: "SPY".to_string(),
        }));
    });

    let summary = poller.run().await.unwrap();
    assert_eq!(summary.reason, StopReason::SymbolNotFound);
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.requests, 3);
    assert_eq!(poller.state(), &PollerState::Stopped(StopReason::SymbolNotFound));

    // Nothing polls after the stop.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(provider.request_times().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_waits_at_least_retry_after() {
    let provider = Arc::new(SwitchableProvider::new(Err(ProviderError::RateLimited {
        retry_after_secs: 2,
    })));
    let token = CancellationToken::new();
    let config = QuotePollerConfig::new("SPY").with_retry(RetryConfig {
        max_attempts: 1,
        initial_delay: Duration::from_millis(100),
        jitter_factor: 0.0,
        ..RetryConfig::default()
    });
    let mut poller = build(config, provider.clone(), &token);

    let summary = poller.run().await.unwrap();
    assert!(matches!(
        summary.reason,
        StopReason::ProviderFailed(ProviderError::RateLimited { .. })
    ));

    let times = provider.request_times();
    assert_eq!(times.len(), 2);
    assert_eq!(times[1] - times[0], Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn cancellation_during_retry_wait_is_prompt() {
    let provider = Arc::new(SwitchableProvider::new(Err(ProviderError::Transient {
        message: "503".to_string(),
    })));
    let token = CancellationToken::new();
    let config = QuotePollerConfig::new("SPY").with_retry(RetryConfig {
        max_attempts: 3,
        initial_delay: Duration::from_secs(5),
        max_delay: Duration::from_secs(5),
        jitter_factor: 0.0,
        ..RetryConfig::default()
    });
    let mut poller = build(config, provider, &token);

    cancel_after(&token, Duration::from_millis(100));
    let started = Instant::now();
    let summary = poller.run().await.unwrap();

    assert_eq!(summary.reason, StopReason::Cancelled);
    assert_eq!(started.elapsed(), Duration::from_millis(100));
}
