//! CLI argument definitions for volscan.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scan` | Scan a ticker list for relative-volume hits |
//! | `classify` | Evaluate one volume sample offline |
//! | `session` | Show the exchange session phase |
//!
//! Every global option can also be set through its `VOLSCAN_*` environment
//! variable.
//!
//! # Examples
//!
//! ```bash
//! volscan scan --tickers "AAPL,TSLA,NVDA"
//! volscan scan --fixture volumes.json --at 2024-06-05T15:30:00Z --format json --pretty
//! volscan classify --previous 1000000 --current 1500000 --elapsed 120
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use volscan_core::{RateLimit, RelativeVolumeBand, ScanConfig, TradingSession, ValidationError};

pub const DEFAULT_TICKERS: &str = "AAPL,TSLA,NVDA,AMD,MSFT,AMZN,GOOGL";

/// Relative-volume stock scanner
///
/// Flags tickers trading between 1x and 3x yesterday's volume whose
/// per-minute pace is running ahead of yesterday's average.
#[derive(Debug, Parser)]
#[command(name = "volscan", author, version, about = "Relative-volume stock scanner")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, env = "VOLSCAN_FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, env = "VOLSCAN_PRETTY", default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and ticker errors as failures (exit code 5).
    #[arg(long, global = true, env = "VOLSCAN_STRICT", default_value_t = false)]
    pub strict: bool,

    /// IANA timezone of the exchange.
    #[arg(long, global = true, env = "VOLSCAN_TIMEZONE", default_value = "America/New_York")]
    pub timezone: String,

    /// Local session open time (HH:MM).
    #[arg(long, global = true, env = "VOLSCAN_SESSION_OPEN", default_value = "09:30")]
    pub session_open: String,

    /// Regular session length in minutes.
    #[arg(long, global = true, env = "VOLSCAN_SESSION_MINUTES", default_value_t = 390)]
    pub session_minutes: u32,

    /// Lowest qualifying relative volume (inclusive).
    #[arg(long, global = true, env = "VOLSCAN_MIN_RVOL", default_value_t = 1.0)]
    pub min_rvol: f64,

    /// Highest qualifying relative volume (inclusive).
    #[arg(long, global = true, env = "VOLSCAN_MAX_RVOL", default_value_t = 3.0)]
    pub max_rvol: f64,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true, env = "VOLSCAN_TIMEOUT_MS", default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Retries per ticker after a transient provider failure.
    #[arg(long, global = true, env = "VOLSCAN_MAX_RETRIES", default_value_t = 2)]
    pub max_retries: u32,

    /// Tickers fetched concurrently.
    #[arg(long, global = true, env = "VOLSCAN_CONCURRENCY", default_value_t = 4)]
    pub concurrency: usize,

    /// Provider requests per minute; 0 disables throttling.
    #[arg(long, global = true, env = "VOLSCAN_RATE_LIMIT", default_value_t = 120)]
    pub rate_limit: u32,

    /// Cookie header sent to Yahoo Finance.
    #[arg(long, global = true, env = "VOLSCAN_YAHOO_COOKIE", hide_env_values = true)]
    pub yahoo_cookie: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn session(&self) -> Result<TradingSession, ValidationError> {
        TradingSession::parse(&self.timezone, &self.session_open, self.session_minutes)
    }

    pub fn scan_config(&self) -> Result<ScanConfig, ValidationError> {
        let config = ScanConfig {
            session: self.session()?,
            band: RelativeVolumeBand::new(self.min_rvol, self.max_rvol)?,
            timeout_ms: self.timeout_ms,
            max_retries: self.max_retries,
            max_concurrency: self.concurrency,
            rate_limit: RateLimit {
                requests: self.rate_limit,
                window: Duration::from_secs(60),
            },
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// Single JSON envelope.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan tickers for relative-volume hits.
    Scan(ScanArgs),
    /// Evaluate one previous/current volume sample without fetching data.
    Classify(ClassifyArgs),
    /// Show where the exchange session stands.
    Session(SessionArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// Comma-separated tickers; blank entries are ignored.
    #[arg(long, env = "VOLSCAN_TICKERS", default_value = DEFAULT_TICKERS)]
    pub tickers: String,

    /// JSON file of daily volumes ({"AAPL": [prev, current]}) used instead of Yahoo.
    #[arg(long, env = "VOLSCAN_FIXTURE")]
    pub fixture: Option<PathBuf>,

    /// Evaluate as of this RFC3339 UTC instant instead of now.
    #[arg(long)]
    pub at: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ClassifyArgs {
    /// Previous full-session volume.
    #[arg(long)]
    pub previous: u64,

    /// Current session volume so far.
    #[arg(long)]
    pub current: u64,

    /// Minutes since the open; clamped into the session.
    #[arg(long, allow_negative_numbers = true)]
    pub elapsed: i64,

    /// Ticker label for the result.
    #[arg(long, default_value = "SAMPLE")]
    pub ticker: String,
}

#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    /// Evaluate as of this RFC3339 UTC instant instead of now.
    #[arg(long)]
    pub at: Option<String>,
}
