//! Database migration command.
//!
//! Migrations live in `crates/site/migrations/` and are embedded at build
//! time.
//!
//! # Environment Variables
//!
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use super::{CommandError, connect};

/// Run all pending site migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running site migrations...");
    sqlx::migrate!("../site/migrations").run(&pool).await?;

    tracing::info!("Site migrations complete!");
    Ok(())
}
