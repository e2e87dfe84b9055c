//! Session model

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Session minted by login or refresh. Never persisted.
#[derive(Clone)]
pub struct Session {
    /// Short-lived bearer token
    pub access_token: String,
    /// Longer-lived token, only used to mint a new pair
    pub refresh_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
    /// Selects the long refresh tier
    pub remember_me: bool,
}

impl Session {
    /// Access expiry as ISO-8601 with millisecond precision
    pub fn access_expires_iso(&self) -> String {
        to_iso(&self.access_token_expires_at)
    }

    /// Refresh expiry as ISO-8601 with millisecond precision
    pub fn refresh_expires_iso(&self) -> String {
        to_iso(&self.refresh_token_expires_at)
    }

    /// Timing and flags only. Token values stay in cookies.
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            access_token_expires_at: self.access_expires_iso(),
            refresh_token_expires_at: self.refresh_expires_iso(),
            remember_me: self.remember_me,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("access_token_expires_at", &self.access_token_expires_at)
            .field("refresh_token_expires_at", &self.refresh_token_expires_at)
            .field("remember_me", &self.remember_me)
            .finish()
    }
}

fn to_iso(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Client-visible view of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub access_token_expires_at: String,
    pub refresh_token_expires_at: String,
    pub remember_me: bool,
}
