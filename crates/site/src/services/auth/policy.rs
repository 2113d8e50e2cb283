//! Super-admin authorization policy.

use trustline_core::Email;

use crate::models::AdminUser;

/// Decides which identity may manage other admins.
#[derive(Debug, Clone, Default)]
pub struct SuperAdminPolicy {
    email: Option<Email>,
}

impl SuperAdminPolicy {
    #[must_use]
    pub const fn new(email: Option<Email>) -> Self {
        Self { email }
    }

    /// The configured super-admin email, if any.
    #[must_use]
    pub const fn email(&self) -> Option<&Email> {
        self.email.as_ref()
    }

    /// Case-insensitive match against the configured email. Always `false`
    /// when no super admin is configured.
    #[must_use]
    pub fn is_super_admin(&self, email: &str) -> bool {
        self.email
            .as_ref()
            .is_some_and(|configured| configured.as_str() == Email::normalize(email))
    }

    /// Whether `admin` is the stored record of the super admin.
    #[must_use]
    pub fn is_protected(&self, admin: &AdminUser) -> bool {
        self.is_super_admin(admin.email.as_str())
    }
}
