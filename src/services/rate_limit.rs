// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user token bucket for the apply endpoint.
//!
//! The limiter is injected through `AppState`; callers never reach a
//! process-wide default.

use crate::error::{AppError, Result};
use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Allows `capacity` apply calls per user per `window`, refilling continuously.
#[derive(Debug)]
pub struct ApplyRateLimiter {
    buckets: DashMap<String, Bucket>,
    capacity: f64,
    refill_per_sec: f64,
}

impl ApplyRateLimiter {
    pub fn new(capacity: u32, window: Duration) -> Self {
        let capacity = f64::from(capacity.max(1));
        let window_secs = window.as_secs_f64().max(0.001);
        Self {
            buckets: DashMap::new(),
            capacity,
            refill_per_sec: capacity / window_secs,
        }
    }

    /// Take one token for `user_id`, or fail with `AppError::RateLimited`.
    pub fn check(&self, user_id: &str) -> Result<()> {
        if self.try_acquire(user_id, Instant::now()) {
            Ok(())
        } else {
            tracing::warn!(user_id, "Apply rate limit exceeded");
            Err(AppError::RateLimited)
        }
    }

    fn try_acquire(&self, user_id: &str, now: Instant) -> bool {
        let mut bucket = self
            .buckets
            .entry(user_id.to_string())
            .or_insert_with(|| Bucket {
                tokens: self.capacity,
                last_refill: now,
            });

        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        bucket.last_refill = now;
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_per_user() {
        let limiter = ApplyRateLimiter::new(2, Duration::from_secs(60));

        assert!(limiter.check("alice").is_ok());
        assert!(limiter.check("alice").is_ok());
        assert!(matches!(limiter.check("alice"), Err(AppError::RateLimited)));

        // Another user has their own bucket
        assert!(limiter.check("bob").is_ok());
    }

    #[test]
    fn test_bucket_refills_over_time() {
        let limiter = ApplyRateLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.try_acquire("u", start));
        assert!(!limiter.try_acquire("u", start + Duration::from_secs(1)));
        assert!(limiter.try_acquire("u", start + Duration::from_secs(12)));
    }
}
