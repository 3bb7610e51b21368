//! Per-adapter request budgets.
//!
//! Each provider adapter owns one [`RateLimiter`], injected at construction. Every upstream
//! call acquires a slot first. Slots are spaced by `per / calls`, with up to `burst` calls
//! allowed back-to-back (generic cell rate algorithm). The limiter state is only locked
//! while a slot is reserved, never across the network call it guards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::core::FsError;
use crate::core::models::Provider;

/// A provider's request budget: `calls` per `per`, with `burst` calls allowed at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub calls: u32,
    pub per: Duration,
    pub burst: u32,
}

impl RateLimit {
    /// A budget of `calls` per `per` without bursting.
    #[must_use]
    pub const fn new(calls: u32, per: Duration) -> Self {
        Self {
            calls,
            per,
            burst: 1,
        }
    }

    /// Allow up to `burst` calls back-to-back before spacing applies.
    #[must_use]
    pub const fn burst(mut self, burst: u32) -> Self {
        self.burst = burst;
        self
    }

    /// The minimum interval between calls once the burst is used up.
    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.per / self.calls.max(1)
    }

    pub(crate) fn validate(&self, provider: Provider) -> Result<(), FsError> {
        if self.calls == 0 || self.burst == 0 || self.per.is_zero() {
            return Err(FsError::Config(format!(
                "{provider}: rate limit needs non-zero calls, burst and window"
            )));
        }
        Ok(())
    }
}

/// What happens when a call arrives before its slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RateLimitMode {
    /// Sleep until the slot opens. (Default)
    #[default]
    Wait,
    /// Return [`FsError::RateLimited`] with the remaining wait.
    FailFast,
}

#[derive(Debug)]
pub struct RateLimiter {
    provider: Provider,
    limit: RateLimit,
    mode: RateLimitMode,
    /// Theoretical arrival time of the next call; `None` until the first call.
    tat: Mutex<Option<Instant>>,
    total_requests: AtomicU64,
    waited_requests: AtomicU64,
    rejected_requests: AtomicU64,
}

impl RateLimiter {
    #[must_use]
    pub fn new(provider: Provider, limit: RateLimit, mode: RateLimitMode) -> Self {
        Self {
            provider,
            limit,
            mode,
            tat: Mutex::new(None),
            total_requests: AtomicU64::new(0),
            waited_requests: AtomicU64::new(0),
            rejected_requests: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub const fn limit(&self) -> RateLimit {
        self.limit
    }

    #[must_use]
    pub const fn mode(&self) -> RateLimitMode {
        self.mode
    }

    /// Reserves the next slot, waiting or failing per the configured mode.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::RateLimited`] in [`RateLimitMode::FailFast`] when the budget is used up.
    pub async fn acquire(&self) -> Result<(), FsError> {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let interval = self.limit.min_interval();
        let tolerance = interval * self.limit.burst.saturating_sub(1);

        let wait = {
            let mut tat = self.tat.lock().await;
            let now = Instant::now();
            let current = tat.map_or(now, |t| t.max(now));
            let allowed_at = current.checked_sub(tolerance).unwrap_or(now);

            if allowed_at > now && self.mode == RateLimitMode::FailFast {
                self.rejected_requests.fetch_add(1, Ordering::Relaxed);
                return Err(FsError::RateLimited {
                    provider: self.provider,
                    retry_after: allowed_at - now,
                });
            }

            *tat = Some(current + interval);
            allowed_at.saturating_duration_since(now)
        };

        if !wait.is_zero() {
            self.waited_requests.fetch_add(1, Ordering::Relaxed);
            #[cfg(feature = "tracing")]
            tracing::debug!(provider = %self.provider, ?wait, "rate limiter delaying call");
            tokio::time::sleep(wait).await;
        }
        Ok(())
    }

    /// Whether a call made now would go through without waiting.
    pub async fn can_acquire_immediately(&self) -> bool {
        let tolerance = self.limit.min_interval() * self.limit.burst.saturating_sub(1);
        let now = Instant::now();
        self.tat
            .lock()
            .await
            .is_none_or(|t| t.checked_sub(tolerance).is_none_or(|allowed| allowed <= now))
    }

    #[must_use]
    pub fn stats(&self) -> RateLimiterStats {
        RateLimiterStats {
            provider: self.provider,
            total_requests: self.total_requests.load(Ordering::Relaxed),
            waited_requests: self.waited_requests.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
        }
    }
}

/// Usage counters of one limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterStats {
    pub provider: Provider,
    pub total_requests: u64,
    pub waited_requests: u64,
    pub rejected_requests: u64,
}
