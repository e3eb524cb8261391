//! Authentication identity types.

use serde::Serialize;

use crate::db::UserRole;

/// Identity attached to a request after successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i64,
    pub role: UserRole,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// The fields of a stored user the auth layer reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub role: UserRole,
    /// Currently valid refresh token, if a session is open
    pub refresh_token: Option<String>,
}

impl UserRecord {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
        }
    }

    /// Whether `presented` is exactly the refresh token on record.
    pub fn holds_refresh_token(&self, presented: &str) -> bool {
        self.refresh_token.as_deref() == Some(presented)
    }
}
