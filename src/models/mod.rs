//! Data models
//!
//! Session state lives only in cookies; these types describe it while a
//! request is being handled, plus the non-secret views returned to clients.

mod session;
mod user;

pub use session::{Session, SessionInfo};
pub use user::{AdminUser, UserRole};
