//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Seed the first admin (no-op once any admin exists)
//! tl-cli admin seed -e founder@example.org -p 'a long passphrase'
//!
//! # Create another admin directly
//! tl-cli admin create -e treasurer@example.org -p 'another passphrase'
//! ```
//!
//! # Environment Variables
//!
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use trustline_site::db::{AdminUserRepository, CredentialStore};
use trustline_site::models::AdminUser;
use trustline_site::services::AdminUserService;
use trustline_site::services::auth::SuperAdminPolicy;

use super::{CommandError, connect};

/// Create the first admin if the credential store is empty.
pub async fn seed(email: &str, password: &str) -> Result<(), CommandError> {
    let pool = connect().await?;
    let store = AdminUserRepository::new(pool);

    match seed_first_admin(&store, email, password).await? {
        Some(admin) => tracing::info!(
            "Seeded first admin. ID: {}, Email: {}",
            admin.id,
            admin.email
        ),
        None => tracing::warn!("Admins already exist; seed skipped"),
    }
    Ok(())
}

/// Create an admin user.
pub async fn create(email: &str, password: &str) -> Result<(), CommandError> {
    let pool = connect().await?;
    let store = AdminUserRepository::new(pool);
    let policy = SuperAdminPolicy::new(None);

    let admin = AdminUserService::new(&store, &policy)
        .create(email, password)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        admin.id,
        admin.email
    );
    Ok(())
}

/// Insert an admin only when none exist yet.
async fn seed_first_admin(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
) -> Result<Option<AdminUser>, CommandError> {
    let existing = store.count().await?;
    if existing > 0 {
        tracing::info!(existing, "Credential store is not empty");
        return Ok(None);
    }

    let policy = SuperAdminPolicy::new(None);
    let admin = AdminUserService::new(store, &policy)
        .create(email, password)
        .await?;
    Ok(Some(admin))
}
