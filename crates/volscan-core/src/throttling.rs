use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Request budget shared by every ticker fetch of one scan.
///
/// Allows bursts of up to `limit` requests, then refills one cell every
/// `window / limit`.
#[derive(Clone)]
pub struct RequestThrottle {
    limiter: Arc<DirectRateLimiter>,
}

impl std::fmt::Debug for RequestThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestThrottle").finish_non_exhaustive()
    }
}

impl RequestThrottle {
    pub fn new(window: Duration, limit: NonZeroU32) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota_from_window(window, limit))),
        }
    }

    /// Waits until a request slot is available.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Takes a slot without waiting; `false` when the budget is exhausted.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

fn quota_from_window(window: Duration, limit: NonZeroU32) -> Quota {
    let seconds_per_cell = (window.as_secs_f64() / f64::from(limit.get())).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(limit))
        .allow_burst(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).expect("non-zero")
    }

    #[test]
    fn allows_burst_then_blocks() {
        let throttle = RequestThrottle::new(Duration::from_secs(60), nz(2));

        assert!(throttle.try_acquire());
        assert!(throttle.try_acquire());
        assert!(!throttle.try_acquire());
    }

    #[test]
    fn clones_share_one_budget() {
        let throttle = RequestThrottle::new(Duration::from_secs(60), nz(1));
        let clone = throttle.clone();

        assert!(throttle.try_acquire());
        assert!(!clone.try_acquire());
    }

    #[tokio::test]
    async fn acquire_returns_immediately_with_budget() {
        let throttle = RequestThrottle::new(Duration::from_secs(60), nz(3));
        tokio::time::timeout(Duration::from_millis(200), throttle.acquire())
            .await
            .expect("slot should be available");
    }
}
