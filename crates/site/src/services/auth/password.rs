//! Argon2id password hashing.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::AuthError;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::MissingPassword` for an empty password and
/// `AuthError::WeakPassword` for one shorter than [`MIN_PASSWORD_LENGTH`].
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::MissingPassword);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id with a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a PHC hash string.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch or an unreadable hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Returns `true` if `hash` is a well-formed PHC string.
#[must_use]
pub fn is_phc_hash(hash: &str) -> bool {
    PasswordHash::new(hash).is_ok()
}

/// [`hash_password`] on the blocking thread pool.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` or `AuthError::TaskFailed`.
pub async fn hash_password_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::TaskFailed(e.to_string()))?
}

/// [`verify_password`] on the blocking thread pool.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` or `AuthError::TaskFailed`.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<(), AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::TaskFailed(e.to_string()))?
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse battery", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_rejects() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(!is_phc_hash("not-a-phc-string"));
    }

    #[test]
    fn test_validate_password() {
        assert!(matches!(validate_password(""), Err(AuthError::MissingPassword)));
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long-enough").is_ok());
    }

    #[tokio::test]
    async fn test_blocking_variants() {
        let hash = hash_password_blocking("on-the-pool".to_string())
            .await
            .unwrap();
        assert!(
            verify_password_blocking("on-the-pool".to_string(), hash)
                .await
                .is_ok()
        );
    }
}
