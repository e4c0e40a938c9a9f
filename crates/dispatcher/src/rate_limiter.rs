//! Process-wide admission control using fixed-window counting
//!
//! One [`RateLimiter`] is shared by every concurrent dispatch so the external
//! gateway never sees more than `limit_for_period` calls per window, whatever
//! the number of envelopes in flight.
//!
//! # Fixed Window Algorithm
//!
//! - A window tracks `(start, issued)`
//! - When `now - start >= refresh_period` the window rolls: `start = now`, `issued = 0`
//! - A permit is granted while `issued < limit_for_period`
//! - Otherwise the caller sleeps until the window rolls, or gives up at its deadline
//!
//! ```text
//! limit 18 / 1500ms, 50 instantaneous sends
//! - t=0      18 granted
//! - t=1.5s   18 granted (window rolled)
//! - t=3.0s   14 granted
//! ```
//!
//! A fixed window admits up to `2 × limit_for_period` calls around a window
//! boundary (a full window's worth right before the roll, another right after).
//! The upstream SMS quota tolerates this since it is itself evaluated per second
//! with slack. Callers needing strict sliding-window fairness should put a
//! token-bucket limiter behind the same `acquire` contract.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use contracts::{ContractError, RateLimitConfig};
use tokio::sync::Mutex;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{debug, trace};

/// Result of an [`RateLimiter::acquire`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A permit was issued; the caller may call the gateway
    Granted,
    /// No permit could be issued before the acquire timeout
    TimedOut,
}

impl Admission {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Current window state
#[derive(Debug)]
struct Window {
    /// When the current window opened
    start: Instant,
    /// Permits issued in the current window
    issued: u32,
}

impl Window {
    /// Roll the window if the refresh period has elapsed, then try to take a permit.
    ///
    /// Returns `Err(next_roll)` when the window is exhausted.
    fn try_take(&mut self, now: Instant, limit: u32, period: Duration) -> Result<(), Instant> {
        if now.saturating_duration_since(self.start) >= period {
            self.start = now;
            self.issued = 0;
        }

        if self.issued < limit {
            self.issued += 1;
            Ok(())
        } else {
            Err(self.start + period)
        }
    }
}

/// Fixed-window rate limiter shared across all dispatch workers
///
/// Window state sits behind a FIFO async mutex. A caller that has to wait for
/// the next window keeps the lock while it sleeps, so waiters are admitted in
/// arrival order and no window ever issues more than `limit_for_period` permits.
#[derive(Debug)]
pub struct RateLimiter {
    limit_for_period: u32,
    refresh_period: Duration,
    window: Mutex<Window>,
    granted_total: AtomicU64,
    timed_out_total: AtomicU64,
}

impl RateLimiter {
    /// Create a limiter issuing `limit_for_period` permits per `refresh_period`
    ///
    /// # Errors
    /// Returns [`ContractError::ConfigValidation`] when either value is zero.
    pub fn new(limit_for_period: u32, refresh_period: Duration) -> Result<Self, ContractError> {
        if limit_for_period == 0 {
            return Err(ContractError::config_validation(
                "rate_limit.limit_for_period",
                "limit_for_period must be > 0",
            ));
        }
        if refresh_period.is_zero() {
            return Err(ContractError::config_validation(
                "rate_limit.refresh_period_ms",
                "refresh_period must be > 0",
            ));
        }

        Ok(Self {
            limit_for_period,
            refresh_period,
            window: Mutex::new(Window {
                start: Instant::now(),
                issued: 0,
            }),
            granted_total: AtomicU64::new(0),
            timed_out_total: AtomicU64::new(0),
        })
    }

    /// Create a limiter from configuration
    pub fn from_config(config: &RateLimitConfig) -> Result<Self, ContractError> {
        Self::new(config.limit_for_period, config.refresh_period())
    }

    pub fn limit_for_period(&self) -> u32 {
        self.limit_for_period
    }

    pub fn refresh_period(&self) -> Duration {
        self.refresh_period
    }

    /// Wait for a permit, for at most `timeout`
    ///
    /// Never spins: the caller sleeps until the window rolls. If the next roll
    /// lies beyond the deadline the wait cannot succeed and `TimedOut` is
    /// returned right away.
    pub async fn acquire(&self, timeout: Duration) -> Admission {
        let deadline = Instant::now() + timeout;

        let Ok(mut window) = timeout_at(deadline, self.window.lock()).await else {
            return self.timed_out("queued past deadline");
        };

        loop {
            match window.try_take(Instant::now(), self.limit_for_period, self.refresh_period) {
                Ok(()) => {
                    self.granted_total.fetch_add(1, Ordering::Relaxed);
                    trace!(issued = window.issued, "Permit granted");
                    return Admission::Granted;
                }
                Err(next_roll) if next_roll > deadline => {
                    return self.timed_out("window exhausted until after deadline");
                }
                Err(next_roll) => {
                    debug!(
                        wait_ms = next_roll
                            .saturating_duration_since(Instant::now())
                            .as_millis() as u64,
                        "Window exhausted, waiting for roll"
                    );
                    sleep_until(next_roll).await;
                }
            }
        }
    }

    /// Snapshot of limiter counters
    pub fn stats(&self) -> RateLimiterStats {
        RateLimiterStats {
            limit_for_period: self.limit_for_period,
            refresh_period: self.refresh_period,
            granted_total: self.granted_total.load(Ordering::Relaxed),
            timed_out_total: self.timed_out_total.load(Ordering::Relaxed),
        }
    }

    fn timed_out(&self, cause: &'static str) -> Admission {
        self.timed_out_total.fetch_add(1, Ordering::Relaxed);
        debug!(cause, "Permit acquire timed out");
        Admission::TimedOut
    }
}

/// Counters for monitoring a limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterStats {
    pub limit_for_period: u32,
    pub refresh_period: Duration,
    /// Permits issued since creation
    pub granted_total: u64,
    /// Acquire calls that timed out since creation
    pub timed_out_total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_zero_limit_is_rejected() {
        let err = RateLimiter::new(0, Duration::from_millis(1500)).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }

    #[test]
    fn test_zero_period_is_rejected() {
        assert!(RateLimiter::new(18, Duration::ZERO).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_grants_up_to_limit_immediately() {
        let limiter = RateLimiter::new(3, Duration::from_millis(1000)).unwrap();
        let start = Instant::now();

        for _ in 0..3 {
            assert_eq!(limiter.acquire(Duration::ZERO).await, Admission::Granted);
        }
        assert_eq!(limiter.acquire(Duration::ZERO).await, Admission::TimedOut);
        assert_eq!(Instant::now(), start);

        let stats = limiter.stats();
        assert_eq!(stats.granted_total, 3);
        assert_eq!(stats.timed_out_total, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_window_roll() {
        let limiter = RateLimiter::new(2, Duration::from_millis(1500)).unwrap();
        let start = Instant::now();

        assert!(limiter.acquire(Duration::from_millis(1500)).await.is_granted());
        assert!(limiter.acquire(Duration::from_millis(1500)).await.is_granted());
        assert!(limiter.acquire(Duration::from_millis(1500)).await.is_granted());

        assert_eq!(Instant::now() - start, Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_roll_is_past_deadline() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10)).unwrap();
        assert!(limiter.acquire(Duration::from_millis(100)).await.is_granted());

        let before = Instant::now();
        assert_eq!(
            limiter.acquire(Duration::from_millis(100)).await,
            Admission::TimedOut
        );
        assert!(Instant::now() - before <= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_window_never_over_issues() {
        let limiter = Arc::new(RateLimiter::new(18, Duration::from_millis(1500)).unwrap());
        let start = Instant::now();

        let mut tasks = Vec::new();
        for _ in 0..4 {
            let limiter = Arc::clone(&limiter);
            tasks.push(tokio::spawn(async move {
                let mut grants = Vec::new();
                for _ in 0..20 {
                    if limiter.acquire(Duration::from_secs(10)).await.is_granted() {
                        grants.push(Instant::now() - start);
                    }
                }
                grants
            }));
        }

        let mut per_window = std::collections::BTreeMap::new();
        let mut total = 0;
        for task in tasks {
            for offset in task.await.unwrap() {
                let window = offset.as_millis() / 1500;
                *per_window.entry(window).or_insert(0u32) += 1;
                total += 1;
            }
        }

        assert_eq!(total, 80);
        assert!(per_window.values().all(|&n| n <= 18), "{per_window:?}");
    }
}
