//! Signed session tokens.
//!
//! Format: `base64url(claims_json) "." base64url(hmac_sha256(key, claims_segment))`,
//! both segments unpadded.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use super::SessionError;
use crate::models::SessionClaims;

/// Session lifetime in seconds (7 days).
pub const SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Signs and verifies session tokens with a single HMAC-SHA256 key.
#[derive(Clone)]
pub struct TokenSigner {
    key: SecretString,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl TokenSigner {
    #[must_use]
    pub const fn new(key: SecretString) -> Self {
        Self { key }
    }

    fn mac(&self) -> Result<Hmac<Sha256>, SessionError> {
        Hmac::<Sha256>::new_from_slice(self.key.expose_secret().as_bytes())
            .map_err(|e| SessionError::InvalidKey(e.to_string()))
    }

    /// Produce a token for `claims`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidClaims` if the claims cannot be encoded.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        let json = serde_json::to_vec(claims).map_err(|_| SessionError::InvalidClaims)?;
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{payload}.{signature}"))
    }

    /// Check a token's shape, signature and expiry, returning its claims.
    ///
    /// The signature is checked in constant time before the claims are decoded.
    ///
    /// # Errors
    ///
    /// Returns the [`SessionError`] describing the first failed check.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, SessionError> {
        let (payload, signature) = token.split_once('.').ok_or(SessionError::Malformed)?;
        if payload.is_empty() || signature.is_empty() || signature.contains('.') {
            return Err(SessionError::Malformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SessionError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::BadSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| SessionError::InvalidClaims)?;
        let claims: SessionClaims =
            serde_json::from_slice(&json).map_err(|_| SessionError::InvalidClaims)?;

        if claims.exp <= now.timestamp() {
            return Err(SessionError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(SecretString::from("k9#Vq2!xLm7@Rt4$Zp8^Wc3&Hn6*Jb1%"))
    }

    fn claims(exp: i64) -> SessionClaims {
        SessionClaims {
            email: "founder@example.org".to_string(),
            sub: "3".to_string(),
            exp,
        }
    }

    #[test]
    fn test_sign_then_verify() {
        let now = Utc::now();
        let claims = claims(now.timestamp() + SESSION_TTL_SECONDS);
        let token = signer().sign(&claims).unwrap();

        assert_eq!(signer().verify(&token, now).unwrap(), claims);
    }

    #[test]
    fn test_expired_token_rejected_even_with_valid_signature() {
        let now = Utc::now();
        let token = signer().sign(&claims(now.timestamp() - 1)).unwrap();
        assert_eq!(signer().verify(&token, now), Err(SessionError::Expired));

        let token = signer().sign(&claims(now.timestamp())).unwrap();
        assert_eq!(signer().verify(&token, now), Err(SessionError::Expired));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let now = Utc::now();
        let token = signer()
            .sign(&claims(now.timestamp() + SESSION_TTL_SECONDS))
            .unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let mut forged = claims(now.timestamp() + SESSION_TTL_SECONDS);
        forged.email = "intruder@example.org".to_string();
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());

        let result = signer().verify(&format!("{forged_payload}.{signature}"), now);
        assert_eq!(result, Err(SessionError::BadSignature));
    }

    #[test]
    fn test_other_key_rejected() {
        let now = Utc::now();
        let token = signer()
            .sign(&claims(now.timestamp() + SESSION_TTL_SECONDS))
            .unwrap();
        let other = TokenSigner::new(SecretString::from("a-different-key-with-enough-length!!"));

        assert_eq!(other.verify(&token, now), Err(SessionError::BadSignature));
    }

    #[test]
    fn test_malformed_tokens() {
        let now = Utc::now();
        for token in ["", "no-dot", ".sig", "payload.", "a.b.c", "payload.***"] {
            assert_eq!(
                signer().verify(token, now),
                Err(SessionError::Malformed),
                "token {token:?}"
            );
        }
    }
}
