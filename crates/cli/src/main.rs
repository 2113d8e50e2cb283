//! Trustline CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! tl-cli migrate
//!
//! # Seed the first admin into an empty database
//! tl-cli admin seed -e founder@example.org -p 'a long passphrase'
//!
//! # Create an admin user
//! tl-cli admin create -e treasurer@example.org -p 'another passphrase'
//!
//! # Generate a session signing secret
//! tl-cli secret generate
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tl-cli")]
#[command(author, version, about = "Trustline CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage secrets
    Secret {
        #[command(subcommand)]
        action: SecretAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create the first admin; does nothing if any admin exists
    Seed {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password
        #[arg(short, long, env = "SEED_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SecretAction {
    /// Print a random value for `SESSION_SIGNING_SECRET`
    Generate,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Seed { email, password } => {
                commands::admin::seed(&email, &password).await?;
            }
            AdminAction::Create { email, password } => {
                commands::admin::create(&email, &password).await?;
            }
        },
        Commands::Secret { action } => match action {
            SecretAction::Generate => commands::secret::generate(),
        },
    }
    Ok(())
}
