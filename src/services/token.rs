//! Token issuance
//!
//! Access and refresh tokens are bare opaque bearer strings (UUID v4). They
//! carry no claims and no signature; holding one is the whole proof.
//! Expiry instants come from a [`TtlPolicy`] with two refresh tiers.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::Session;

/// Lifetimes of issued tokens, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
    pub remember_me_refresh_ttl_seconds: i64,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            access_ttl_seconds: 60 * 60,
            refresh_ttl_seconds: 24 * 60 * 60,
            remember_me_refresh_ttl_seconds: 30 * 24 * 60 * 60,
        }
    }
}

impl TtlPolicy {
    /// Refresh lifetime for the selected tier
    pub fn refresh_ttl_seconds(&self, remember_me: bool) -> i64 {
        if remember_me {
            self.remember_me_refresh_ttl_seconds
        } else {
            self.refresh_ttl_seconds
        }
    }

    /// Check that every tier is positive and access expires before either refresh tier.
    pub fn validate(&self) -> Result<(), String> {
        if self.access_ttl_seconds <= 0
            || self.refresh_ttl_seconds <= 0
            || self.remember_me_refresh_ttl_seconds <= 0
        {
            return Err("token lifetimes must be positive".to_string());
        }
        if self.access_ttl_seconds >= self.refresh_ttl_seconds {
            return Err(format!(
                "access_ttl_seconds ({}) must be lower than refresh_ttl_seconds ({})",
                self.access_ttl_seconds, self.refresh_ttl_seconds
            ));
        }
        if self.refresh_ttl_seconds > self.remember_me_refresh_ttl_seconds {
            return Err(format!(
                "refresh_ttl_seconds ({}) must not exceed remember_me_refresh_ttl_seconds ({})",
                self.refresh_ttl_seconds, self.remember_me_refresh_ttl_seconds
            ));
        }
        Ok(())
    }
}

/// A freshly generated access/refresh pair
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Issues token pairs and stamps their expiry
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenIssuer {
    policy: TtlPolicy,
}

impl TokenIssuer {
    pub fn new(policy: TtlPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TtlPolicy {
        &self.policy
    }

    /// Generate two unrelated random tokens
    pub fn issue(&self) -> TokenPair {
        TokenPair {
            access: Uuid::new_v4().to_string(),
            refresh: Uuid::new_v4().to_string(),
        }
    }

    /// Issue a session starting now
    pub fn issue_session(&self, remember_me: bool) -> Session {
        self.issue_session_at(Utc::now(), remember_me)
    }

    /// Issue a session whose lifetimes start at `now`.
    ///
    /// Arithmetic happens on milliseconds since the epoch. An instant that
    /// falls outside chrono's range saturates to the maximum representable one.
    pub fn issue_session_at(&self, now: DateTime<Utc>, remember_me: bool) -> Session {
        let pair = self.issue();
        let now_ms = now.timestamp_millis();
        let access_expires_at =
            expires_at(now_ms, self.policy.access_ttl_seconds);
        let refresh_expires_at =
            expires_at(now_ms, self.policy.refresh_ttl_seconds(remember_me));

        Session {
            access_token: pair.access,
            refresh_token: pair.refresh,
            access_token_expires_at: access_expires_at,
            refresh_token_expires_at: refresh_expires_at,
            remember_me,
        }
    }
}

fn expires_at(now_ms: i64, ttl_seconds: i64) -> DateTime<Utc> {
    let expiry_ms = now_ms.saturating_add(ttl_seconds.saturating_mul(1000));
    DateTime::from_timestamp_millis(expiry_ms).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_issue_returns_distinct_uuids() {
        let issuer = TokenIssuer::default();
        let pair = issuer.issue();

        assert_ne!(pair.access, pair.refresh);
        assert!(Uuid::parse_str(&pair.access).is_ok());
        assert!(Uuid::parse_str(&pair.refresh).is_ok());
        assert_ne!(issuer.issue().access, pair.access);
    }

    #[test]
    fn test_short_tier_expiry() {
        let issuer = TokenIssuer::default();
        let session = issuer.issue_session_at(fixed_now(), false);

        assert_eq!(session.access_expires_iso(), "2026-10-16T13:00:00.000Z");
        assert_eq!(session.refresh_expires_iso(), "2026-10-17T12:00:00.000Z");
        assert!(!session.remember_me);
    }

    #[test]
    fn test_remember_me_tier_expiry() {
        let issuer = TokenIssuer::default();
        let session = issuer.issue_session_at(fixed_now(), true);

        assert_eq!(session.refresh_expires_iso(), "2026-11-15T12:00:00.000Z");
        assert!(session.remember_me);
    }

    #[test]
    fn test_millisecond_precision_is_kept() {
        let now = DateTime::from_timestamp_millis(1_760_000_000_123).unwrap();
        let session = TokenIssuer::default().issue_session_at(now, false);

        assert_eq!(
            session.access_token_expires_at.timestamp_millis(),
            1_760_000_000_123 + 3_600_000
        );
    }

    #[test]
    fn test_validate_policy() {
        assert!(TtlPolicy::default().validate().is_ok());

        let inverted = TtlPolicy {
            access_ttl_seconds: 100,
            refresh_ttl_seconds: 50,
            remember_me_refresh_ttl_seconds: 500,
        };
        assert!(inverted.validate().is_err());

        let zero = TtlPolicy {
            access_ttl_seconds: 0,
            ..TtlPolicy::default()
        };
        assert!(zero.validate().is_err());

        let shrinking_tier = TtlPolicy {
            access_ttl_seconds: 10,
            refresh_ttl_seconds: 500,
            remember_me_refresh_ttl_seconds: 100,
        };
        assert!(shrinking_tier.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let pair = TokenIssuer::default().issue();
        let rendered = format!("{:?}", pair);
        assert!(!rendered.contains(&pair.access));
        assert!(!rendered.contains(&pair.refresh));
    }
}
