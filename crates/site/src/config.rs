//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SITE_BASE_URL` - Public URL of the site (https enables `Secure` cookies)
//! - `SESSION_SIGNING_SECRET` - HMAC key for session tokens (min 32 chars, high entropy)
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SITE_CONSOLE_DIR` - Directory holding the built admin console (default: crates/site/console)
//! - `SUPER_ADMIN_EMAIL` - The single account allowed to manage other admins
//! - `SUPER_ADMIN_PASSWORD` - Fallback password for the super admin when no stored record exists
//! - `SUPER_ADMIN_PASSWORD_HASH` - Argon2 PHC hash, preferred over `SUPER_ADMIN_PASSWORD`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//!
//! ## Optional (TLS)
//! - `SITE_TLS_CERT` - PEM-encoded certificate chain
//! - `SITE_TLS_KEY` - PEM-encoded private key

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use trustline_core::Email;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_CONSOLE_DIR: &str = "crates/site/console";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the site
    pub base_url: String,
    /// Directory the admin console assets are served from
    pub console_dir: PathBuf,
    /// Session signing and super-admin identity
    pub session: SessionConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// TLS configuration for HTTPS (optional)
    pub tls: Option<TlsConfig>,
}

/// Everything the session issuer and verifier need, injected at startup.
///
/// Implements `Debug` manually to redact the signing secret and the fallback password.
#[derive(Clone)]
pub struct SessionConfig {
    /// HMAC-SHA256 key for session tokens.
    pub signing_secret: SecretString,
    /// Super-admin identity, if one is configured.
    pub super_admin: Option<SuperAdminConfig>,
    /// Whether the session cookie carries the `Secure` attribute.
    pub secure_cookies: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("signing_secret", &"[REDACTED]")
            .field("super_admin", &self.super_admin)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

/// The designated super-admin and its optional environment fallback credential.
#[derive(Clone)]
pub struct SuperAdminConfig {
    /// Normalized super-admin email.
    pub email: Email,
    /// Credential accepted when no stored admin record matches the email.
    pub fallback_password: Option<FallbackPassword>,
}

impl std::fmt::Debug for SuperAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperAdminConfig")
            .field("email", &self.email)
            .field(
                "fallback_password",
                &self.fallback_password.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// How the fallback super-admin password was supplied.
#[derive(Clone)]
pub enum FallbackPassword {
    /// Plaintext from `SUPER_ADMIN_PASSWORD`; hashed once at startup.
    Plain(SecretString),
    /// Argon2 PHC string from `SUPER_ADMIN_PASSWORD_HASH`.
    Hashed(SecretString),
}

impl SessionConfig {
    /// Build a session configuration from its recognized keys.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InsecureSecret` if the signing secret is too short,
    /// and `ConfigError::InvalidEnvVar` if the super-admin email is malformed or a
    /// fallback password is given without an email.
    pub fn new(
        signing_secret: SecretString,
        super_admin_email: Option<&str>,
        fallback_password: Option<FallbackPassword>,
        secure_cookies: bool,
    ) -> Result<Self, ConfigError> {
        validate_session_secret(&signing_secret, "SESSION_SIGNING_SECRET")?;

        let super_admin = match (super_admin_email, fallback_password) {
            (Some(email), fallback_password) => {
                let email = Email::parse(email).map_err(|e| {
                    ConfigError::InvalidEnvVar("SUPER_ADMIN_EMAIL".to_string(), e.to_string())
                })?;
                Some(SuperAdminConfig {
                    email,
                    fallback_password,
                })
            }
            (None, None) => None,
            (None, Some(_)) => {
                return Err(ConfigError::InvalidEnvVar(
                    "SUPER_ADMIN_PASSWORD".to_string(),
                    "SUPER_ADMIN_EMAIL must be set when a fallback password is configured"
                        .to_string(),
                ));
            }
        };

        Ok(Self {
            signing_secret,
            super_admin,
            secure_cookies,
        })
    }

    fn from_env(secure_cookies: bool) -> Result<Self, ConfigError> {
        let signing_secret = get_validated_secret("SESSION_SIGNING_SECRET")?;
        let email = get_optional_env("SUPER_ADMIN_EMAIL");

        let fallback_password = match (
            get_optional_env("SUPER_ADMIN_PASSWORD_HASH"),
            get_optional_env("SUPER_ADMIN_PASSWORD"),
        ) {
            (Some(hash), _) => Some(FallbackPassword::Hashed(SecretString::from(hash))),
            (None, Some(plain)) => {
                tracing::warn!(
                    "SUPER_ADMIN_PASSWORD is set in plaintext; prefer SUPER_ADMIN_PASSWORD_HASH"
                );
                Some(FallbackPassword::Plain(SecretString::from(plain)))
            }
            (None, None) => None,
        };

        if email.is_none() {
            tracing::warn!("SUPER_ADMIN_EMAIL is not set; admin management will be unavailable");
        }

        Self::new(
            signing_secret,
            email.as_deref(),
            fallback_password,
            secure_cookies,
        )
    }

    /// Returns the configured super-admin email, if any.
    #[must_use]
    pub fn super_admin_email(&self) -> Option<&Email> {
        self.super_admin.as_ref().map(|s| &s.email)
    }
}

/// TLS configuration for HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_pem: String,
    /// PEM-encoded private key
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[CERTIFICATE]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl TlsConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let cert_pem = get_optional_env("SITE_TLS_CERT");
        let key_pem = get_optional_env("SITE_TLS_KEY");

        match (cert_pem, key_pem) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert_pem: cert,
                key_pem: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "SITE_TLS_*".to_string(),
                "Both SITE_TLS_CERT and SITE_TLS_KEY must be set together".to_string(),
            )),
        }
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails validation (length, placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SITE_DATABASE_URL")?;
        let host = get_env_or_default("SITE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SITE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("SITE_BASE_URL")?;
        let console_dir = PathBuf::from(get_env_or_default("SITE_CONSOLE_DIR", DEFAULT_CONSOLE_DIR));
        let session = SessionConfig::from_env(base_url.starts_with("https://"))?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let tls = TlsConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            console_dir,
            session,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            tls,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret (tl-cli secret generate)."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
