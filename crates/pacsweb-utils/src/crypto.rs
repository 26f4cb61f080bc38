//! Password based encryption of the API token.
//!
//! The envelope is `v1:` followed by the base64 of `salt | nonce | ciphertext`.
//! The key is derived from the password with Argon2 and the token is sealed
//! with ChaCha20-Poly1305, so a wrong password fails authentication instead
//! of producing garbage.

use argon2::Argon2;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::{rngs::OsRng, RngCore};

use crate::error::{Result, UtilsError};

const ENVELOPE_PREFIX: &str = "v1:";
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

fn derive_key(password: &str, salt: &[u8]) -> Result<[u8; 32]> {
    let mut key = [0u8; 32];
    Argon2::default()
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| UtilsError::crypto(format!("Key derivation failed: {e}")))?;
    Ok(key)
}

/// Encrypts `token` with a key derived from `password`.
pub fn encrypt_token(password: &str, token: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(password, &salt)?;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), token.as_bytes())
        .map_err(|_| UtilsError::crypto("Failed to encrypt token"))?;

    let mut sealed = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&salt);
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);
    Ok(format!("{}{}", ENVELOPE_PREFIX, BASE64.encode(sealed)))
}

/// Decrypts an envelope produced by [`encrypt_token`].
///
/// Returns [`UtilsError::Decryption`] for a wrong password or a malformed
/// envelope.
pub fn decrypt_token(password: &str, envelope: &str) -> Result<String> {
    let encoded = envelope
        .strip_prefix(ENVELOPE_PREFIX)
        .ok_or(UtilsError::Decryption)?;
    let sealed = BASE64.decode(encoded).map_err(|_| UtilsError::Decryption)?;
    if sealed.len() <= SALT_LEN + NONCE_LEN {
        return Err(UtilsError::Decryption);
    }
    let (salt, rest) = sealed.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let key = derive_key(password, salt)?;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| UtilsError::Decryption)?;
    String::from_utf8(plaintext).map_err(|_| UtilsError::Decryption)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let envelope = encrypt_token("hunter2", "abc123token").unwrap();
        assert!(envelope.starts_with("v1:"));
        assert!(!envelope.contains("abc123token"));
        assert_eq!(decrypt_token("hunter2", &envelope).unwrap(), "abc123token");
    }

    #[test]
    fn wrong_password_is_a_decryption_error() {
        let envelope = encrypt_token("hunter2", "abc123token").unwrap();
        assert!(matches!(
            decrypt_token("hunter3", &envelope),
            Err(UtilsError::Decryption)
        ));
    }

    #[test]
    fn malformed_envelope_is_a_decryption_error() {
        assert!(matches!(decrypt_token("pw", "garbage"), Err(UtilsError::Decryption)));
        assert!(matches!(decrypt_token("pw", "v1:@@@"), Err(UtilsError::Decryption)));
        assert!(matches!(decrypt_token("pw", "v1:AAAA"), Err(UtilsError::Decryption)));
    }

    #[test]
    fn same_token_encrypts_differently() {
        let a = encrypt_token("pw", "token").unwrap();
        let b = encrypt_token("pw", "token").unwrap();
        assert_ne!(a, b);
    }
}
