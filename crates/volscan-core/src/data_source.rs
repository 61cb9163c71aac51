//! Market data contract consumed by the scanner.
//!
//! A [`MarketDataSource`] answers one question per ticker: what were the two
//! most recent daily volumes (previous full session, current session so far)?
//! Anything that prevents a clean answer is a [`SourceError`].
//!
//! # Example
//!
//! ```rust,ignore
//! use volscan_core::{FixtureSource, MarketDataSource, Symbol};
//!
//! async fn show(source: &FixtureSource) -> Result<(), volscan_core::SourceError> {
//!     let symbol = Symbol::parse("AAPL")?;
//!     let volumes = source.daily_volumes(&symbol).await?;
//!     println!("{}: {} -> {}", symbol, volumes.previous_session, volumes.current_session);
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{ProviderId, Symbol, ValidationError};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    NotFound,
    InsufficientHistory,
    InvalidRequest,
    Internal,
}

/// Structured error returned by market data sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn insufficient_history(symbol: &Symbol, observed: usize) -> Self {
        Self {
            kind: SourceErrorKind::InsufficientHistory,
            message: format!(
                "{symbol} has {observed} daily volume observation(s); need previous and current session"
            ),
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::InsufficientHistory => "source.insufficient_history",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(value: ValidationError) -> Self {
        Self::invalid_request(value.to_string())
    }
}

/// Previous full-session volume and current session-to-date volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyVolumes {
    pub symbol: Symbol,
    pub previous_session: u64,
    pub current_session: u64,
}

impl DailyVolumes {
    pub fn new(symbol: Symbol, previous_session: u64, current_session: u64) -> Self {
        Self {
            symbol,
            previous_session,
            current_session,
        }
    }

    /// Takes the last two entries of an oldest-first daily volume history.
    pub fn from_history(symbol: Symbol, history: &[u64]) -> Result<Self, SourceError> {
        match history {
            [.., previous, current] => Ok(Self::new(symbol, *previous, *current)),
            _ => Err(SourceError::insufficient_history(&symbol, history.len())),
        }
    }
}

/// Market data adapter contract.
///
/// Implementations must be `Send + Sync`; the scanner fans requests out
/// concurrently against a shared instance.
pub trait MarketDataSource: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Fetches the two most recent daily volumes for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the symbol is unknown, the provider is
    /// unreachable or rate limited, the payload is malformed, or fewer than two
    /// sessions of history exist.
    fn daily_volumes<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<DailyVolumes, SourceError>> + Send + 'a>>;
}
