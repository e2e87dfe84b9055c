//! Services layer - session business logic
//!
//! Token issuance, credential checks, login throttling and the session
//! lookup seam. Nothing here touches HTTP.

pub mod credentials;
pub mod password;
pub mod rate_limiter;
pub mod session_store;
pub mod token;

pub use credentials::{CredentialVerifier, StaticAdminVerifier};
pub use password::{hash_password, verify_password};
pub use rate_limiter::{LoginRateLimiter, Throttle};
pub use session_store::{PresenceOnlyStore, SessionRecord, SessionStore};
pub use token::{TokenIssuer, TokenPair, TtlPolicy};
