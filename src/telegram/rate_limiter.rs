//! Per-user fixed-window request limiter.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

pub const DEFAULT_MAX_REQUESTS: u32 = 5;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Whole seconds (rounded up) until the window resets; zero when allowed.
    pub reset_in_secs: u64,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<u64, Window>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub async fn check(&self, user_id: u64) -> RateDecision {
        self.check_at(user_id, Instant::now()).await
    }

    pub(crate) async fn check_at(&self, user_id: u64, now: Instant) -> RateDecision {
        let mut windows = self.windows.lock().await;

        match windows.get_mut(&user_id) {
            Some(window) if now <= window.reset_at => {
                if window.count >= self.max_requests {
                    let left = window.reset_at.saturating_duration_since(now);
                    return RateDecision {
                        allowed: false,
                        remaining: 0,
                        reset_in_secs: left.as_millis().div_ceil(1000) as u64,
                    };
                }
                window.count += 1;
                RateDecision {
                    allowed: true,
                    remaining: self.max_requests - window.count,
                    reset_in_secs: 0,
                }
            }
            _ => {
                windows.insert(
                    user_id,
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                RateDecision {
                    allowed: true,
                    remaining: self.max_requests - 1,
                    reset_in_secs: 0,
                }
            }
        }
    }

    /// Forgets users whose window has elapsed. Returns how many were dropped.
    pub async fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now()).await
    }

    async fn cleanup_at(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, window| now <= window.reset_at);
        before - windows.len()
    }

    pub async fn tracked_users(&self) -> usize {
        self.windows.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sixth_request_in_window_is_rejected() {
        let limiter = RateLimiter::default();
        let start = Instant::now();

        for expected_remaining in (0..5).rev() {
            let decision = limiter.check_at(7, start).await;
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let decision = limiter.check_at(7, start + Duration::from_millis(100)).await;
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert_eq!(decision.reset_in_secs, 60);
    }

    #[tokio::test]
    async fn window_resets_after_expiry() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.check_at(1, start).await.allowed);
        assert!(!limiter.check_at(1, start + Duration::from_secs(5)).await.allowed);

        let decision = limiter.check_at(1, start + Duration::from_secs(11)).await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[tokio::test]
    async fn users_are_limited_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check_at(1, now).await.allowed);
        assert!(!limiter.check_at(1, now).await.allowed);
        assert!(limiter.check_at(2, now).await.allowed);
    }

    #[tokio::test]
    async fn cleanup_drops_expired_windows() {
        let limiter = RateLimiter::new(3, Duration::from_secs(1));
        let now = Instant::now();
        limiter.check_at(1, now).await;
        limiter.check_at(2, now + Duration::from_secs(5)).await;

        let dropped = limiter.cleanup_at(now + Duration::from_secs(3)).await;
        assert_eq!(dropped, 1);
        assert_eq!(limiter.tracked_users().await, 1);
    }
}
