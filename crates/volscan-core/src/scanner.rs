//! Batch orchestration: session gate, per-ticker fetch, classification.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classifier::{to_result, Evaluation, VolumeClassifier};
use crate::config::{ScanConfig, DEFAULT_MAX_CONCURRENCY};
use crate::data_source::MarketDataSource;
use crate::session::{Clock, SessionPhase, TradingSession};
use crate::throttling::RequestThrottle;
use crate::{
    ClassificationResult, ProviderId, Symbol, TickerEntry, TickerList, UtcDateTime,
    ValidationError, VolumeSample,
};

/// Result of evaluating one input ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickerOutcome {
    Hit(ClassificationResult),
    NoSignal {
        ticker: Symbol,
        relative_volume: f64,
    },
    ZeroPreviousVolume {
        ticker: Symbol,
    },
    DataUnavailable {
        ticker: Symbol,
        code: String,
        message: String,
    },
    InvalidSymbol {
        ticker: String,
        message: String,
    },
}

impl TickerOutcome {
    pub fn ticker(&self) -> &str {
        match self {
            Self::Hit(result) => result.ticker.as_str(),
            Self::NoSignal { ticker, .. }
            | Self::ZeroPreviousVolume { ticker }
            | Self::DataUnavailable { ticker, .. } => ticker.as_str(),
            Self::InvalidSymbol { ticker, .. } => ticker,
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(
            self,
            Self::DataUnavailable { .. } | Self::InvalidSymbol { .. }
        )
    }

    /// Machine-readable code for error outcomes.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::DataUnavailable { code, .. } => Some(code),
            Self::InvalidSymbol { .. } => Some("input.invalid_symbol"),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::DataUnavailable { message, .. } | Self::InvalidSymbol { message, .. } => {
                Some(message)
            }
            _ => None,
        }
    }
}

/// Everything one scan produced, outcomes in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub generated_at: UtcDateTime,
    pub provider: ProviderId,
    pub session: SessionPhase,
    pub outcomes: Vec<TickerOutcome>,
}

impl ScanReport {
    pub const fn market_closed(&self) -> bool {
        !self.session.is_open()
    }

    pub fn hits(&self) -> impl Iterator<Item = &ClassificationResult> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            TickerOutcome::Hit(result) => Some(result),
            _ => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = &TickerOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_error())
    }
}

/// Runs the classifier over a ticker list against one market data source.
pub struct VolumeScanner {
    source: Arc<dyn MarketDataSource>,
    classifier: VolumeClassifier,
    session: TradingSession,
    throttle: Option<RequestThrottle>,
    max_concurrency: usize,
}

impl VolumeScanner {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self {
            source,
            classifier: VolumeClassifier::default(),
            session: TradingSession::default(),
            throttle: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn from_config(
        source: Arc<dyn MarketDataSource>,
        config: &ScanConfig,
    ) -> Result<Self, ValidationError> {
        config.validate()?;

        let mut scanner = Self::new(source)
            .with_classifier(VolumeClassifier::new(config.band)?)
            .with_session(config.session)
            .with_max_concurrency(config.max_concurrency);
        scanner.throttle = config.rate_limit.throttle();
        Ok(scanner)
    }

    pub fn with_classifier(mut self, classifier: VolumeClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_session(mut self, session: TradingSession) -> Self {
        self.session = session;
        self
    }

    pub fn with_throttle(mut self, throttle: RequestThrottle) -> Self {
        self.throttle = Some(throttle);
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn provider(&self) -> ProviderId {
        self.source.id()
    }

    pub const fn session(&self) -> &TradingSession {
        &self.session
    }

    pub async fn scan_with_clock(&self, tickers: &TickerList, clock: &dyn Clock) -> ScanReport {
        self.scan(tickers, clock.now()).await
    }

    /// Scans `tickers` as of `now`.
    ///
    /// Before the session opens nothing is fetched and `outcomes` is empty.
    pub async fn scan(&self, tickers: &TickerList, now: DateTime<Utc>) -> ScanReport {
        let phase = self.session.phase_at(now);
        let provider = self.provider();

        let Some(elapsed_minutes) = phase.elapsed_minutes() else {
            info!(provider = %provider, "market has not opened yet; skipping scan");
            return ScanReport {
                generated_at: UtcDateTime::from_chrono(now),
                provider,
                session: phase,
                outcomes: Vec::new(),
            };
        };

        info!(
            provider = %provider,
            tickers = tickers.len(),
            elapsed_minutes,
            concurrency = self.max_concurrency,
            "starting volume scan"
        );

        let outcomes = stream::iter(tickers.entries())
            .map(|entry| self.evaluate_entry(entry, elapsed_minutes))
            .buffered(self.max_concurrency)
            .collect::<Vec<_>>()
            .await;

        ScanReport {
            generated_at: UtcDateTime::from_chrono(now),
            provider,
            session: phase,
            outcomes,
        }
    }

    async fn evaluate_entry(&self, entry: &TickerEntry, elapsed_minutes: u32) -> TickerOutcome {
        let symbol = match entry {
            TickerEntry::Valid(symbol) => symbol,
            TickerEntry::Rejected { raw, error } => {
                warn!(ticker = %raw, %error, "rejecting invalid ticker");
                return TickerOutcome::InvalidSymbol {
                    ticker: entry.label(),
                    message: error.to_string(),
                };
            }
        };

        if let Some(throttle) = &self.throttle {
            throttle.acquire().await;
        }

        let volumes = match self.source.daily_volumes(symbol).await {
            Ok(volumes) => volumes,
            Err(error) => {
                warn!(ticker = %symbol, code = error.code(), message = error.message(), "volume fetch failed");
                return TickerOutcome::DataUnavailable {
                    ticker: symbol.clone(),
                    code: error.code().to_owned(),
                    message: error.message().to_owned(),
                };
            }
        };

        let sample = VolumeSample::new(
            volumes.previous_session,
            volumes.current_session,
            i64::from(elapsed_minutes),
            self.session.length_minutes(),
        );

        match self.classifier.evaluate(&sample) {
            Evaluation::ZeroPreviousVolume => {
                debug!(ticker = %symbol, "previous session volume is zero; skipping");
                TickerOutcome::ZeroPreviousVolume {
                    ticker: symbol.clone(),
                }
            }
            Evaluation::NoSignal(metrics) => {
                debug!(ticker = %symbol, relative_volume = metrics.relative_volume, "no signal");
                TickerOutcome::NoSignal {
                    ticker: symbol.clone(),
                    relative_volume: metrics.relative_volume,
                }
            }
            Evaluation::Hit(metrics) => {
                debug!(ticker = %symbol, relative_volume = metrics.relative_volume, "volume hit");
                TickerOutcome::Hit(to_result(symbol, &metrics))
            }
        }
    }
}
