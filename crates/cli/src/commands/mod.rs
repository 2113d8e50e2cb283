//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod secret;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use trustline_site::db::RepositoryError;
use trustline_site::services::AdminUserError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Admin account operation failed.
    #[error(transparent)]
    Admin(#[from] AdminUserError),

    /// Store query failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Connect using `SITE_DATABASE_URL`, falling back to `DATABASE_URL`.
async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("SITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("SITE_DATABASE_URL"))?;

    tracing::info!("Connecting to site database...");
    Ok(trustline_site::db::create_pool(&database_url).await?)
}
