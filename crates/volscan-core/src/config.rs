//! Runtime settings shared by every scan in one invocation.

use std::num::NonZeroU32;
use std::time::Duration;

use crate::classifier::RelativeVolumeBand;
use crate::retry::RetryConfig;
use crate::session::TradingSession;
use crate::throttling::RequestThrottle;
use crate::ValidationError;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
pub const DEFAULT_RATE_LIMIT: u32 = 120;

/// Request budget per time window. `requests == 0` disables throttling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub requests: u32,
    pub window: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests: DEFAULT_RATE_LIMIT,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimit {
    pub fn per_minute(requests: u32) -> Self {
        Self {
            requests,
            window: Duration::from_secs(60),
        }
    }

    pub fn throttle(&self) -> Option<RequestThrottle> {
        let limit = NonZeroU32::new(self.requests)?;
        Some(RequestThrottle::new(self.window, limit))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub session: TradingSession,
    pub band: RelativeVolumeBand,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub max_concurrency: usize,
    pub rate_limit: RateLimit,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            session: TradingSession::default(),
            band: RelativeVolumeBand::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            rate_limit: RateLimit::default(),
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.band.validate()?;

        if self.timeout_ms == 0 {
            return Err(ValidationError::ZeroValue {
                field: "timeout_ms",
            });
        }
        if self.max_concurrency == 0 {
            return Err(ValidationError::ZeroValue {
                field: "max_concurrency",
            });
        }
        if self.rate_limit.requests > 0 && self.rate_limit.window.is_zero() {
            return Err(ValidationError::ZeroValue {
                field: "rate_limit.window",
            });
        }

        Ok(())
    }

    pub fn retry(&self) -> RetryConfig {
        RetryConfig::exponential(self.max_retries)
    }
}
