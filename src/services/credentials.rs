//! Admin credential verification
//!
//! Login handlers only see ok / not-ok through [`CredentialVerifier`]. The
//! shipped implementation checks a single identity taken from configuration.

use anyhow::Result;
use async_trait::async_trait;

use crate::config::AuthConfig;
use crate::models::AdminUser;
use crate::services::password::{burn_verification, is_valid_hash, verify_password};

/// Checks submitted credentials
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// `Ok(Some(user))` on a match, `Ok(None)` on any mismatch
    async fn verify(&self, email: &str, password: &str) -> Result<Option<AdminUser>>;
}

/// Verifies against the configured admin email and argon2 hash
#[derive(Debug, Clone)]
pub struct StaticAdminVerifier {
    email: String,
    password_hash: String,
}

impl StaticAdminVerifier {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_lowercase(),
            password_hash: password_hash.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        let verifier = Self::new(&config.admin_email, &config.admin_password_hash);
        if !verifier.is_configured() {
            tracing::warn!(
                "auth.admin_password_hash is missing or malformed; every admin login will be rejected"
            );
        }
        verifier
    }

    /// Whether a usable password hash is configured
    pub fn is_configured(&self) -> bool {
        is_valid_hash(&self.password_hash)
    }
}

#[async_trait]
impl CredentialVerifier for StaticAdminVerifier {
    async fn verify(&self, email: &str, password: &str) -> Result<Option<AdminUser>> {
        let email_matches = email.trim().to_lowercase() == self.email;

        // Both failure paths run a full argon2 check.
        let password_matches = if self.is_configured() {
            verify_password(password, &self.password_hash)?
        } else {
            burn_verification(password)
        };

        if email_matches && password_matches {
            Ok(Some(AdminUser::new(self.email.clone())))
        } else {
            Ok(None)
        }
    }
}
