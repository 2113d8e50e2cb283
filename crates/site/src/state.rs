//! Application state shared across handlers.

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::PgPool;

use crate::config::{SessionConfig, SiteConfig};
use crate::db::memory::{MemoryCredentialStore, MemoryDonationStore, MemoryExpenditureStore};
use crate::db::{
    AdminUserRepository, CredentialStore, DonationRepository, DonationStore,
    ExpenditureRepository, ExpenditureStore,
};
use crate::services::auth::{AuthError, SessionAuthority};

/// Handles to the three persistent collections.
#[derive(Clone)]
pub struct Stores {
    pub credentials: Arc<dyn CredentialStore>,
    pub donations: Arc<dyn DonationStore>,
    pub expenditures: Arc<dyn ExpenditureStore>,
}

impl Stores {
    /// Stores backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            credentials: Arc::new(AdminUserRepository::new(pool.clone())),
            donations: Arc::new(DonationRepository::new(pool.clone())),
            expenditures: Arc::new(ExpenditureRepository::new(pool.clone())),
        }
    }

    /// Empty in-memory stores.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            credentials: Arc::new(MemoryCredentialStore::new()),
            donations: Arc::new(MemoryDonationStore::new()),
            expenditures: Arc::new(MemoryExpenditureStore::new()),
        }
    }
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    stores: Stores,
    auth: SessionAuthority,
    secure_cookies: bool,
    console_dir: PathBuf,
}

impl AppState {
    /// Build state from the session configuration and a set of stores.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the fallback super-admin password cannot be prepared.
    pub async fn new(
        session: &SessionConfig,
        stores: Stores,
        console_dir: PathBuf,
    ) -> Result<Self, AuthError> {
        let auth = SessionAuthority::from_config(session, Arc::clone(&stores.credentials)).await?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                stores,
                auth,
                secure_cookies: session.secure_cookies,
                console_dir,
            }),
        })
    }

    /// Build state for the server from the full site configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the fallback super-admin password cannot be prepared.
    pub async fn from_config(config: &SiteConfig, pool: &PgPool) -> Result<Self, AuthError> {
        Self::new(
            &config.session,
            Stores::postgres(pool),
            config.console_dir.clone(),
        )
        .await
    }

    #[must_use]
    pub fn credentials(&self) -> &dyn CredentialStore {
        self.inner.stores.credentials.as_ref()
    }

    #[must_use]
    pub fn donations(&self) -> &dyn DonationStore {
        self.inner.stores.donations.as_ref()
    }

    #[must_use]
    pub fn expenditures(&self) -> &dyn ExpenditureStore {
        self.inner.stores.expenditures.as_ref()
    }

    #[must_use]
    pub fn auth(&self) -> &SessionAuthority {
        &self.inner.auth
    }

    /// Whether session cookies carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.inner.secure_cookies
    }

    #[must_use]
    pub fn console_dir(&self) -> &std::path::Path {
        &self.inner.console_dir
    }
}
