//! Session lookup capability
//!
//! Nothing is persisted: [`PresenceOnlyStore`] reports every non-empty token
//! as known. Tokens are never revoked before their cookie expires, and a
//! rotated refresh token stays usable.
//! A store backed by real records would implement [`SessionStore`] and be
//! swapped in through `AppState`.

use anyhow::Result;
use async_trait::async_trait;

/// Record returned for a known token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token_id: String,
}

/// Resolves a presented token to a session record
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// `Ok(None)` means the token is unknown
    async fn lookup(&self, token_id: &str) -> Result<Option<SessionRecord>>;
}

/// Presence equals validity
#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceOnlyStore;

#[async_trait]
impl SessionStore for PresenceOnlyStore {
    async fn lookup(&self, token_id: &str) -> Result<Option<SessionRecord>> {
        if token_id.is_empty() {
            return Ok(None);
        }
        Ok(Some(SessionRecord {
            token_id: token_id.to_string(),
        }))
    }
}
