//! Admin user model
//!
//! The back-office has a single configured identity. This is the
//! non-secret descriptor handed back to clients after login or refresh.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an authenticated principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

/// Authenticated admin, safe to serialize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub email: String,
    pub role: UserRole,
}

impl AdminUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role: UserRole::Admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_user_serialization() {
        let json = serde_json::to_value(AdminUser::new("owner@example.com")).unwrap();
        assert_eq!(json, serde_json::json!({"email": "owner@example.com", "role": "admin"}));
    }

    #[test]
    fn test_role_display() {
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }
}
