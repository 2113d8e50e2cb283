//! Secret generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

/// Bytes of randomness in a generated signing secret.
const SECRET_BYTES: usize = 48;

/// Print a fresh signing secret to stdout.
#[allow(clippy::print_stdout)]
pub fn generate() {
    println!("{}", signing_secret());
}

fn signing_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_secret_shape() {
        let secret = signing_secret();
        assert_eq!(secret.len(), 64);
        assert!(
            secret
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(secret, signing_secret());
    }
}
