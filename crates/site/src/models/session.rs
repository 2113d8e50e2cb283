//! Session identity types.

use serde::{Deserialize, Serialize};

use trustline_core::{AdminUserId, Email};

/// Subject claim used for the environment-configured super admin.
pub const ENV_SUPER_ADMIN_SUBJECT: &str = "env-super-admin";

/// Who a session was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSubject {
    /// A stored admin record.
    Stored(AdminUserId),
    /// The fallback super admin from configuration, with no stored record.
    EnvSuperAdmin,
}

impl SessionSubject {
    /// Parse the `sub` claim of a token.
    #[must_use]
    pub fn from_claim(sub: &str) -> Option<Self> {
        if sub == ENV_SUPER_ADMIN_SUBJECT {
            return Some(Self::EnvSuperAdmin);
        }
        sub.parse::<i32>().ok().map(|id| Self::Stored(AdminUserId::new(id)))
    }

    /// Render as a `sub` claim.
    #[must_use]
    pub fn to_claim(self) -> String {
        match self {
            Self::Stored(id) => id.to_string(),
            Self::EnvSuperAdmin => ENV_SUPER_ADMIN_SUBJECT.to_string(),
        }
    }
}

/// Signed claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub email: String,
    pub sub: String,
    /// Expiry as Unix seconds.
    pub exp: i64,
}

/// Identity extracted from a verified session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentAdmin {
    pub email: Email,
    pub subject: SessionSubject,
}

impl CurrentAdmin {
    /// The subject id as presented to clients.
    #[must_use]
    pub fn subject_id(&self) -> String {
        self.subject.to_claim()
    }
}
