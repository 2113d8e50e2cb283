//! Credential providers.
//!
//! Login runs an ordered chain of providers. The first provider that
//! recognizes the email decides the outcome; later providers are not asked.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use trustline_core::Email;

use super::AuthError;
use super::password::{hash_password_blocking, is_phc_hash, verify_password_blocking};
use crate::config::{FallbackPassword, SuperAdminConfig};
use crate::db::CredentialStore;
use crate::models::{CurrentAdmin, SessionSubject};

/// What a provider concluded about an email/password pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    /// The provider does not know this email; ask the next one.
    Unknown,
    /// The provider knows the email and the password matched.
    Authenticated(CurrentAdmin),
    /// The provider knows the email and the password did not match.
    Rejected,
}

/// One link of the login chain.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Check `password` for `email`.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure failures; a wrong password is
    /// `ProviderOutcome::Rejected`.
    async fn authenticate(&self, email: &Email, password: &str)
    -> Result<ProviderOutcome, AuthError>;
}

/// Authenticates against the credential store.
pub struct StoredCredentialProvider {
    store: Arc<dyn CredentialStore>,
}

impl StoredCredentialProvider {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialProvider for StoredCredentialProvider {
    fn name(&self) -> &'static str {
        "stored"
    }

    async fn authenticate(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<ProviderOutcome, AuthError> {
        let Some(admin) = self.store.get_by_email(email).await? else {
            return Ok(ProviderOutcome::Unknown);
        };

        match verify_password_blocking(password.to_string(), admin.password_hash).await {
            Ok(()) => Ok(ProviderOutcome::Authenticated(CurrentAdmin {
                email: admin.email,
                subject: SessionSubject::Stored(admin.id),
            })),
            Err(AuthError::InvalidCredentials) => Ok(ProviderOutcome::Rejected),
            Err(e) => Err(e),
        }
    }
}

/// Authenticates the configured super admin when no stored record exists.
///
/// The configured password is held only as an Argon2 hash.
pub struct FallbackSuperAdminProvider {
    email: Email,
    password_hash: SecretString,
}

impl std::fmt::Debug for FallbackSuperAdminProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackSuperAdminProvider")
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

impl FallbackSuperAdminProvider {
    /// Build the provider from configuration. Plaintext passwords are hashed here.
    ///
    /// Returns `Ok(None)` when no fallback password is configured.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if a configured hash is not a PHC
    /// string or hashing fails.
    pub async fn from_config(config: &SuperAdminConfig) -> Result<Option<Self>, AuthError> {
        let password_hash = match &config.fallback_password {
            None => return Ok(None),
            Some(FallbackPassword::Hashed(hash)) => {
                if !is_phc_hash(hash.expose_secret()) {
                    tracing::error!("SUPER_ADMIN_PASSWORD_HASH is not a valid PHC string");
                    return Err(AuthError::PasswordHash);
                }
                hash.clone()
            }
            Some(FallbackPassword::Plain(plain)) => SecretString::from(
                hash_password_blocking(plain.expose_secret().to_string()).await?,
            ),
        };

        Ok(Some(Self {
            email: config.email.clone(),
            password_hash,
        }))
    }
}

#[async_trait]
impl CredentialProvider for FallbackSuperAdminProvider {
    fn name(&self) -> &'static str {
        "env-super-admin"
    }

    async fn authenticate(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<ProviderOutcome, AuthError> {
        if email != &self.email {
            return Ok(ProviderOutcome::Unknown);
        }

        match verify_password_blocking(
            password.to_string(),
            self.password_hash.expose_secret().to_string(),
        )
        .await
        {
            Ok(()) => Ok(ProviderOutcome::Authenticated(CurrentAdmin {
                email: self.email.clone(),
                subject: SessionSubject::EnvSuperAdmin,
            })),
            Err(AuthError::InvalidCredentials) => Ok(ProviderOutcome::Rejected),
            Err(e) => Err(e),
        }
    }
}
