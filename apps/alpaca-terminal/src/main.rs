//! Alpaca Terminal Binary
//!
//! # Usage
//!
//! ```bash
//! alpaca-terminal quotes AAPL        # stream bid/ask/spread until Ctrl+C
//! alpaca-terminal quotes             # prompt for the symbol
//! alpaca-terminal clock              # is the market open?
//! alpaca-terminal crypto-bars --symbol BTC/USD --timeframe 1Day --start 2025-02-19
//! ```
//!
//! # Environment Variables
//!
//! ## Required (quotes, clock)
//! - `ALPACA_KEY`: Alpaca API key
//! - `ALPACA_SECRET`: Alpaca API secret
//!
//! ## Optional
//! - `ALPACA_ENV`: paper | live (default: paper)
//! - `ALPACA_FEED`: iex | sip (default: iex)
//! - `ALPACA_BASE_URL` / `ALPACA_DATA_URL`: API base URL overrides
//! - `QUOTE_POLL_INTERVAL_MS`: Poll interval (default: 500)
//! - `QUOTE_RETRY_MAX_ATTEMPTS`: Retries for transient errors (default: 0)
//! - `RUST_LOG`: Log filter (default: alpaca_terminal=warn)

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use alpaca_terminal::infrastructure::telemetry;
use alpaca_terminal::{
    AlpacaMarketData, AssetBannerUseCase, CryptoBarsRequest, CryptoBarsUseCase, Environment,
    MarketClockUseCase, QuotePoller, QuotePollerConfig, Symbol, TerminalConfig, Timeframe,
    render_bars, render_clock,
};
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "alpaca-terminal", version)]
#[command(about = "Alpaca market data in the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Trading environment (overrides ALPACA_ENV)
    #[arg(long, global = true, value_enum)]
    env: Option<EnvArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EnvArg {
    Paper,
    Live,
}

impl From<EnvArg> for Environment {
    fn from(arg: EnvArg) -> Self {
        match arg {
            EnvArg::Paper => Self::Paper,
            EnvArg::Live => Self::Live,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Stream the latest bid/ask/spread for a symbol until interrupted
    Quotes {
        /// Ticker symbol (prompted for when omitted)
        symbol: Option<String>,

        /// Milliseconds between polls (overrides QUOTE_POLL_INTERVAL_MS)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Retries after a transient error (overrides QUOTE_RETRY_MAX_ATTEMPTS)
        #[arg(long)]
        retries: Option<u32>,

        /// Skip the asset lookup printed above the table
        #[arg(long)]
        no_banner: bool,
    },

    /// Show whether the market is open and the next session times
    Clock,

    /// Fetch historical crypto bars
    CryptoBars {
        /// Crypto pair; repeat for several
        #[arg(long = "symbol", default_value = "BTC/USD")]
        symbols: Vec<String>,

        /// Bar timeframe (e.g. 15Min, 1Hour, 1Day)
        #[arg(long, default_value = "1Day")]
        timeframe: Timeframe,

        /// First day (YYYY-MM-DD)
        #[arg(long, default_value = "2025-02-19")]
        start: NaiveDate,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Maximum bars to print
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    load_dotenv();
    let cli = Cli::parse();

    let telemetry_guard = telemetry::init();
    tracing::debug!(otlp = telemetry_guard.is_exporting(), "Telemetry initialized");

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = TerminalConfig::from_env().context("failed to load configuration")?;
    if let Some(env) = cli.env {
        config.alpaca = config.alpaca.with_environment(env.into());
    }

    tracing::info!(
        environment = config.alpaca.environment.as_str(),
        feed = config.alpaca.feed.as_str(),
        authenticated = config.alpaca.credentials.is_some(),
        "Configuration loaded"
    );

    match cli.command {
        Command::Quotes {
            symbol,
            interval_ms,
            retries,
            no_banner,
        } => {
            if let Some(ms) = interval_ms.filter(|ms| *ms > 0) {
                config.poll.interval = Duration::from_millis(ms);
            }
            if let Some(retries) = retries {
                config.poll.retry.max_attempts = retries;
            }
            run_quotes(&config, symbol, no_banner).await
        }
        Command::Clock => run_clock(&config).await,
        Command::CryptoBars {
            symbols,
            timeframe,
            start,
            end,
            limit,
        } => {
            let symbols = symbols
                .iter()
                .map(|s| Symbol::parse(s).map(|s| s.to_string()))
                .collect::<Result<Vec<_>, _>>()
                .context("invalid symbol")?;
            let request = CryptoBarsRequest {
                symbols,
                timeframe,
                start,
                end,
                limit,
            };
            run_crypto_bars(&config, &request).await
        }
    }
}

async fn run_quotes(
    config: &TerminalConfig,
    symbol: Option<String>,
    no_banner: bool,
) -> anyhow::Result<ExitCode> {
    config.alpaca.require_credentials()?;

    let shutdown_token = CancellationToken::new();
    tokio::spawn(await_shutdown(shutdown_token.clone()));

    let symbol = match symbol {
        Some(raw) => Symbol::parse(&raw).context("invalid symbol")?,
        None => match read_symbol(prompt_symbol, &shutdown_token).await? {
            Some(symbol) => symbol,
            None => {
                println!("\nStopped before a symbol was entered.");
                return Ok(ExitCode::SUCCESS);
            }
        },
    };

    let market_data = Arc::new(AlpacaMarketData::new(&config.alpaca)?);

    if !no_banner
        && let Some(banner) = AssetBannerUseCase::new(Arc::clone(&market_data))
            .execute(symbol.as_str(), &shutdown_token)
            .await
    {
        println!("{banner}");
    }

    let poller_config = QuotePollerConfig::new(symbol.as_str())
        .with_poll_interval(config.poll.interval)
        .with_retry(config.poll.retry.clone());

    tracing::info!(
        symbol = %symbol,
        interval_ms = u64::try_from(poller_config.poll_interval.as_millis()).unwrap_or(u64::MAX),
        retries = poller_config.retry.max_attempts,
        "Starting quote poller"
    );

    let mut poller = QuotePoller::new(
        poller_config,
        market_data,
        std::io::stdout(),
        shutdown_token,
    );
    let summary = poller.run().await?;

    Ok(if summary.reason.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn run_clock(config: &TerminalConfig) -> anyhow::Result<ExitCode> {
    config.alpaca.require_credentials()?;

    let market_data = Arc::new(AlpacaMarketData::new(&config.alpaca)?);
    let clock = MarketClockUseCase::new(market_data)
        .execute()
        .await
        .context("failed to fetch market clock")?;

    print!("{}", render_clock(&clock));
    Ok(ExitCode::SUCCESS)
}

async fn run_crypto_bars(
    config: &TerminalConfig,
    request: &CryptoBarsRequest,
) -> anyhow::Result<ExitCode> {
    let market_data = Arc::new(AlpacaMarketData::new(&config.alpaca)?);
    let bars = CryptoBarsUseCase::new(market_data)
        .execute(request)
        .await
        .context("failed to fetch crypto bars")?;

    if bars.is_empty() {
        println!(
            "No {} bars for {} since {}",
            request.timeframe,
            request.symbols.join(", "),
            request.start
        );
    } else {
        print!("{}", render_bars(&bars));
    }
    Ok(ExitCode::SUCCESS)
}

/// Run a blocking symbol prompt on its own thread and race it against shutdown.
///
/// The thread is detached: a read still blocked on stdin when shutdown wins
/// does not keep the process alive.
async fn read_symbol<F>(read: F, shutdown: &CancellationToken) -> anyhow::Result<Option<Symbol>>
where
    F: FnOnce() -> anyhow::Result<Symbol> + Send + 'static,
{
    let (tx, rx) = tokio::sync::oneshot::channel();
    std::thread::Builder::new()
        .name("symbol-prompt".to_string())
        .spawn(move || {
            let _ = tx.send(read());
        })
        .context("failed to start symbol prompt")?;

    tokio::select! {
        biased;
        () = shutdown.cancelled() => Ok(None),
        answer = rx => answer.context("symbol prompt exited without an answer")?.map(Some),
    }
}

/// Ask for a symbol on stdin.
fn prompt_symbol() -> anyhow::Result<Symbol> {
    let mut stdout = std::io::stdout();
    write!(stdout, "Enter a stock symbol: ")?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read symbol from stdin")?;

    Symbol::parse(&line).context("invalid symbol")
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Cancel the token on Ctrl+C or SIGTERM.
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, stopping");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, stopping");
        }
    }

    shutdown_token.cancel();
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn env_flag_maps_to_environment() {
        let cli = Cli::try_parse_from(["alpaca-terminal", "clock", "--env", "live"]).unwrap();
        assert_eq!(cli.env.map(Environment::from), Some(Environment::Live));

        let cli = Cli::try_parse_from(["alpaca-terminal", "--env", "paper", "clock"]).unwrap();
        assert_eq!(cli.env.map(Environment::from), Some(Environment::Paper));
    }

    #[test]
    fn unknown_env_is_rejected() {
        assert!(Cli::try_parse_from(["alpaca-terminal", "--env", "staging", "clock"]).is_err());
    }

    #[tokio::test]
    async fn prompt_answer_is_returned() {
        let symbol = read_symbol(|| Ok(Symbol::parse(" aapl\n")?), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(symbol.as_ref().map(Symbol::as_str), Some("AAPL"));
    }

    #[tokio::test]
    async fn shutdown_interrupts_a_waiting_prompt() {
        let (keep_blocked, blocked) = mpsc::channel::<()>();
        let shutdown = CancellationToken::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let symbol = read_symbol(
            move || {
                let _ = blocked.recv();
                Ok(Symbol::parse("AAPL")?)
            },
            &shutdown,
        )
        .await
        .unwrap();

        assert!(symbol.is_none());
        drop(keep_blocked);
    }

    #[tokio::test]
    async fn prompt_failure_is_reported() {
        let result = read_symbol(|| Ok(Symbol::parse("   ")?), &CancellationToken::new()).await;
        assert!(result.is_err());
    }
}
