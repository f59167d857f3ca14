//! At-Rest Message Encryption
//!
//! AES-256-GCM wrapper protecting message content before it reaches storage.
//! Output is a single base64 string of `nonce || ciphertext || tag` with a
//! fresh 96-bit random nonce per call.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Nonce length in bytes (96 bits, the recommended GCM nonce size)
const NONCE_LEN: usize = 12;

/// Key length in bytes (256 bits)
const KEY_LEN: usize = 32;

/// Encryption errors
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Failed to encrypt message content")]
    EncryptionFailed,

    #[error("Failed to decrypt message content")]
    DecryptionFailed,

    #[error("Ciphertext is too short to contain a nonce")]
    MalformedCiphertext,

    #[error("Decrypted content is not valid UTF-8")]
    InvalidUtf8,
}

/// Authenticated-encryption adapter for message content at rest.
///
/// The key is derived once from the configured secret: shorter secrets are
/// zero-padded to 32 bytes, longer ones truncated. This is a direct key
/// mapping, not a KDF, and should not be reused outside this system's
/// threat model.
pub struct EncryptionAdapter {
    cipher: Aes256Gcm,
}

impl EncryptionAdapter {
    /// Build the adapter from the configured secret.
    pub fn new(secret: &str) -> Self {
        let mut key_bytes = [0u8; KEY_LEN];
        let secret_bytes = secret.as_bytes();
        let len = secret_bytes.len().min(KEY_LEN);
        key_bytes[..len].copy_from_slice(&secret_bytes[..len]);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
        Self { cipher }
    }

    /// Encrypt plaintext, returning base64-encoded `nonce || ciphertext || tag`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        aes_gcm::aead::rand_core::RngCore::fill_bytes(&mut OsRng, &mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(&combined))
    }

    /// Decrypt a base64-encoded `nonce || ciphertext || tag` token.
    ///
    /// Input that is not valid base64 is returned unchanged: message rows
    /// written before encryption was introduced hold raw plaintext, and
    /// those must keep decoding. A token that decodes but fails tag
    /// verification is a hard error and is never masked as plaintext.
    pub fn decrypt(&self, encoded: &str) -> Result<String, CryptoError> {
        let combined = match BASE64.decode(encoded) {
            Ok(bytes) => bytes,
            Err(_) => return Ok(encoded.to_string()),
        };

        if combined.len() < NONCE_LEN {
            return Err(CryptoError::MalformedCiphertext);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
    }
}

impl std::fmt::Debug for EncryptionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionAdapter").finish_non_exhaustive()
    }
}
