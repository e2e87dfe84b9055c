//! Rate limiter for admin login attempts
//!
//! Two sliding windows, both configured from `rate_limit`:
//! - failed logins per email (default 5 per 15 minutes)
//! - login requests per client IP (default 10 per minute)

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::net::IpAddr;
use tokio::sync::RwLock;

use crate::config::RateLimitConfig;

/// Outcome of a limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Throttle {
    Allowed,
    /// Rejected; retry after this many seconds
    Limited { retry_after: i64 },
}

/// Login rate limiter
#[derive(Debug)]
pub struct LoginRateLimiter {
    config: RateLimitConfig,
    failed_by_email: RwLock<HashMap<String, Vec<DateTime<Utc>>>>,
    requests_by_ip: RwLock<HashMap<IpAddr, Vec<DateTime<Utc>>>>,
}

impl LoginRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            failed_by_email: RwLock::new(HashMap::new()),
            requests_by_ip: RwLock::new(HashMap::new()),
        }
    }

    fn email_window(&self) -> Duration {
        Duration::seconds(self.config.failed_attempt_window_seconds)
    }

    fn ip_window(&self) -> Duration {
        Duration::seconds(self.config.ip_window_seconds)
    }

    /// Check the per-email failure window
    pub async fn check_email(&self, email: &str) -> Throttle {
        let mut attempts = self.failed_by_email.write().await;
        let entry = attempts.entry(normalize_email(email)).or_default();
        check_window(
            entry,
            Utc::now(),
            self.email_window(),
            self.config.max_failed_attempts,
        )
    }

    /// Record a failed login for `email`
    pub async fn record_failure(&self, email: &str) {
        let mut attempts = self.failed_by_email.write().await;
        attempts
            .entry(normalize_email(email))
            .or_default()
            .push(Utc::now());
    }

    /// Forget failures for `email` after a successful login
    pub async fn clear_failures(&self, email: &str) {
        self.failed_by_email
            .write()
            .await
            .remove(&normalize_email(email));
    }

    /// Check the per-IP window, counting this request when it is allowed
    pub async fn hit_ip(&self, ip: IpAddr) -> Throttle {
        let mut requests = self.requests_by_ip.write().await;
        let now = Utc::now();
        let entry = requests.entry(ip).or_default();
        let throttle = check_window(entry, now, self.ip_window(), self.config.max_ip_requests);
        if throttle == Throttle::Allowed {
            entry.push(now);
        }
        throttle
    }

    /// Drop expired entries. Called periodically from a background task.
    pub async fn cleanup(&self) {
        let now = Utc::now();

        {
            let cutoff = now - self.email_window();
            let mut attempts = self.failed_by_email.write().await;
            attempts.retain(|_, times| {
                times.retain(|time| *time > cutoff);
                !times.is_empty()
            });
        }

        {
            let cutoff = now - self.ip_window();
            let mut requests = self.requests_by_ip.write().await;
            requests.retain(|_, times| {
                times.retain(|time| *time > cutoff);
                !times.is_empty()
            });
        }
    }

    /// Number of tracked emails and IPs
    pub async fn tracked(&self) -> (usize, usize) {
        (
            self.failed_by_email.read().await.len(),
            self.requests_by_ip.read().await.len(),
        )
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Prune `times` to the window ending at `now`, then compare against `max`.
fn check_window(
    times: &mut Vec<DateTime<Utc>>,
    now: DateTime<Utc>,
    window: Duration,
    max: usize,
) -> Throttle {
    let cutoff = now - window;
    times.retain(|time| *time > cutoff);

    if times.len() < max {
        return Throttle::Allowed;
    }

    let retry_after = times
        .first()
        .map(|oldest| (*oldest + window - now).num_seconds().max(1))
        .unwrap_or(1);
    Throttle::Limited { retry_after }
}
