//! Admin user domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trustline_core::{AdminUserId, Email};

/// An administrator account (domain type).
///
/// The password hash never leaves the server: it is skipped on serialization.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    /// Unique admin user ID.
    pub id: AdminUserId,
    /// Normalized email address.
    pub email: Email,
    /// Argon2id PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the admin was created.
    pub created_at: DateTime<Utc>,
}

/// Request body for creating an admin.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAdminInput {
    pub email: String,
    pub password: String,
}

/// Request body for resetting an admin's password.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePasswordInput {
    pub id: AdminUserId,
    pub password: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let admin = AdminUser {
            id: AdminUserId::new(7),
            email: Email::parse("treasurer@example.org").unwrap(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&admin).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "treasurer@example.org");
        assert!(json.get("password_hash").is_none());
    }
}
