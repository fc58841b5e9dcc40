// src/services/rate_limit.rs
// DOCUMENTATION: Per-client request throttling
// PURPOSE: Guard the cinema endpoints that call Apollo Kino on every request

use crate::errors::CinemaError;
use governor::{
    clock::DefaultClock,
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Keyed rate limiter, one bucket per client address
pub struct CinemaRateLimiter {
    limiter: KeyedLimiter,
    per_minute: u32,
}

impl CinemaRateLimiter {
    /// Allow `per_minute` requests per client per minute (at least one)
    pub fn new(per_minute: u32) -> Self {
        let quota = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::keyed(Quota::per_minute(quota)),
            per_minute: quota.get(),
        }
    }

    pub fn per_minute(&self) -> u32 {
        self.per_minute
    }

    /// Count a request from `client`
    pub fn check(&self, client: &str) -> Result<(), CinemaError> {
        self.limiter.check_key(&client.to_string()).map_err(|_| {
            log::warn!("Rate limit exceeded for {}", client);
            CinemaError::RateLimitExceeded
        })
    }

    /// Forget clients whose buckets have refilled
    pub fn cleanup(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        let after = self.limiter.len();

        if before > after {
            log::debug!(
                "Rate limiter cleanup: dropped {} idle clients ({} remaining)",
                before - after,
                after
            );
        }
    }
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically drops idle client buckets
pub fn start_cleanup_task(limiter: Arc<CinemaRateLimiter>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            limiter.cleanup();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_each_client_separately() {
        let limiter = CinemaRateLimiter::new(2);

        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(matches!(
            limiter.check("10.0.0.1"),
            Err(CinemaError::RateLimitExceeded)
        ));

        assert!(limiter.check("10.0.0.2").is_ok());
    }

    #[test]
    fn test_zero_quota_allows_one_request() {
        let limiter = CinemaRateLimiter::new(0);

        assert_eq!(limiter.per_minute(), 1);
        assert!(limiter.check("client").is_ok());
        assert!(limiter.check("client").is_err());
    }

    #[tokio::test]
    async fn test_cleanup_keeps_working_limiter() {
        let limiter = CinemaRateLimiter::new(5);
        limiter.check("client").unwrap();

        limiter.cleanup();

        assert!(limiter.check("client").is_ok());
    }
}
