//! Admin authentication service.
//!
//! Issues and verifies stateless session tokens. Login runs the
//! credential-provider chain (stored admins first, then the configured
//! super-admin fallback) and signs a 7-day token for the winner.

mod error;
pub mod password;
pub mod policy;
pub mod providers;
pub mod token;

pub use error::{AuthError, SessionError};
pub use policy::SuperAdminPolicy;
pub use providers::{
    CredentialProvider, FallbackSuperAdminProvider, ProviderOutcome, StoredCredentialProvider,
};
pub use token::{SESSION_TTL_SECONDS, TokenSigner};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use trustline_core::Email;

use crate::config::SessionConfig;
use crate::db::CredentialStore;
use crate::models::{CurrentAdmin, SessionClaims, SessionSubject};

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub admin: CurrentAdmin,
    pub expires_at: DateTime<Utc>,
}

/// Session issuer and verifier.
pub struct SessionAuthority {
    providers: Vec<Box<dyn CredentialProvider>>,
    signer: TokenSigner,
    policy: SuperAdminPolicy,
}

impl SessionAuthority {
    #[must_use]
    pub fn new(
        providers: Vec<Box<dyn CredentialProvider>>,
        signer: TokenSigner,
        policy: SuperAdminPolicy,
    ) -> Self {
        Self {
            providers,
            signer,
            policy,
        }
    }

    /// Build the standard provider chain from session configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the fallback password cannot be prepared.
    pub async fn from_config(
        config: &SessionConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, AuthError> {
        let mut providers: Vec<Box<dyn CredentialProvider>> =
            vec![Box::new(StoredCredentialProvider::new(credentials))];

        if let Some(super_admin) = &config.super_admin
            && let Some(fallback) = FallbackSuperAdminProvider::from_config(super_admin).await?
        {
            providers.push(Box::new(fallback));
        }

        Ok(Self::new(
            providers,
            TokenSigner::new(config.signing_secret.clone()),
            SuperAdminPolicy::new(config.super_admin_email().cloned()),
        ))
    }

    #[must_use]
    pub const fn policy(&self) -> &SuperAdminPolicy {
        &self.policy
    }

    /// Authenticate `email`/`password` and mint a session token.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidEmail` / `AuthError::MissingPassword` for bad input
    /// - `AuthError::InvalidCredentials` when no provider authenticates the pair
    /// - `AuthError::Repository` if the credential store fails
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedSession, AuthError> {
        self.login_at(email, password, Utc::now()).await
    }

    async fn login_at(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedSession, AuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }

        let admin = self.authenticate(&email, password).await?;
        self.issue(admin, now)
    }

    async fn authenticate(&self, email: &Email, password: &str) -> Result<CurrentAdmin, AuthError> {
        for provider in &self.providers {
            match provider.authenticate(email, password).await? {
                ProviderOutcome::Unknown => {}
                ProviderOutcome::Authenticated(admin) => {
                    tracing::info!(provider = provider.name(), "Admin authenticated");
                    return Ok(admin);
                }
                ProviderOutcome::Rejected => {
                    tracing::info!(provider = provider.name(), "Admin login rejected");
                    return Err(AuthError::InvalidCredentials);
                }
            }
        }

        tracing::info!("Login attempt for unknown admin");
        Err(AuthError::InvalidCredentials)
    }

    fn issue(&self, admin: CurrentAdmin, now: DateTime<Utc>) -> Result<IssuedSession, AuthError> {
        let exp = now.timestamp() + SESSION_TTL_SECONDS;
        let claims = SessionClaims {
            email: admin.email.as_str().to_string(),
            sub: admin.subject.to_claim(),
            exp,
        };
        let token = self
            .signer
            .sign(&claims)
            .map_err(|e| AuthError::TaskFailed(e.to_string()))?;
        let expires_at = DateTime::from_timestamp(exp, 0).unwrap_or(now);

        Ok(IssuedSession {
            token,
            admin,
            expires_at,
        })
    }

    /// Verify a token and return the identity it was issued to.
    ///
    /// # Errors
    ///
    /// Returns the [`SessionError`] for the first failed check.
    pub fn verify(&self, token: &str) -> Result<CurrentAdmin, SessionError> {
        self.verify_at(token, Utc::now())
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<CurrentAdmin, SessionError> {
        let claims = self.signer.verify(token, now)?;
        let email = Email::parse(&claims.email).map_err(|_| SessionError::InvalidClaims)?;
        let subject =
            SessionSubject::from_claim(&claims.sub).ok_or(SessionError::InvalidClaims)?;

        Ok(CurrentAdmin { email, subject })
    }
}
