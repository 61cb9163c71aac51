//! # volscan core
//!
//! Relative-volume scanning: which tickers are trading between 1x and 3x
//! yesterday's volume while running ahead of yesterday's per-minute pace?
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo chart adapter and JSON fixture source |
//! | [`circuit_breaker`] | Circuit breaker for upstream calls |
//! | [`classifier`] | Pure relative-volume / intraday-pace test |
//! | [`config`] | Scan settings with defaults and validation |
//! | [`data_source`] | Market data trait and structured source errors |
//! | [`domain`] | Symbols, ticker lists, volume samples, timestamps |
//! | [`envelope`] | Response envelope for machine-readable output |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction (reqwest in production) |
//! | [`report`] | Scan summary and presenter contract |
//! | [`retry`] | Backoff and retry policy |
//! | [`scanner`] | Session-gated batch evaluation |
//! | [`session`] | Exchange clock and elapsed-minute math |
//! | [`source`] | Provider identifiers |
//! | [`throttling`] | Request rate limiting |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use volscan_core::{ScanSummary, TickerList, VolumeScanner, YahooAdapter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let scanner = VolumeScanner::new(Arc::new(YahooAdapter::default()));
//!     let report = scanner
//!         .scan(&TickerList::parse("AAPL,TSLA,NVDA"), chrono::Utc::now())
//!         .await;
//!
//!     let summary = ScanSummary::from_report(&report);
//!     println!("{}", summary.headline.message());
//! }
//! ```

pub mod adapters;
pub mod circuit_breaker;
pub mod classifier;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod report;
pub mod retry;
pub mod scanner;
pub mod session;
pub mod source;
pub mod throttling;

pub use adapters::{FixtureSource, YahooAdapter};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use classifier::{
    Evaluation, RelativeVolumeBand, VolumeClassifier, VolumeMetrics, DEFAULT_SESSION_MINUTES,
};
pub use config::{RateLimit, ScanConfig};
pub use data_source::{DailyVolumes, MarketDataSource, SourceError, SourceErrorKind};
pub use domain::{ClassificationResult, Symbol, TickerEntry, TickerList, UtcDateTime, VolumeSample};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};
pub use error::{CoreError, ValidationError};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use report::{Headline, ResultPresenter, ResultRow, ScanSummary};
pub use retry::{Backoff, RetryConfig};
pub use scanner::{ScanReport, TickerOutcome, VolumeScanner};
pub use session::{
    clamp_elapsed_minutes, Clock, FixedClock, SessionPhase, SessionSnapshot, SystemClock,
    TradingSession,
};
pub use source::ProviderId;
pub use throttling::RequestThrottle;
