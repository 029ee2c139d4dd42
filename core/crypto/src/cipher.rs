//! Common interface for symmetric ciphers.

use symcrypt_common::Result;
use crate::engine::AesEngine;

/// Byte and Base64 encryption surface shared by symmetric ciphers.
pub trait SymmetricCipher: Send + Sync {
    /// Encrypt raw bytes.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt bytes produced by [`SymmetricCipher::encrypt`].
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Encrypt raw bytes and Base64-encode the result.
    fn encrypt_base64(&self, plaintext: &[u8]) -> Result<String>;

    /// Base64-decode and decrypt, returning the plaintext as text.
    fn decrypt_base64(&self, encoded: &str) -> Result<String>;
}

impl SymmetricCipher for AesEngine {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        AesEngine::encrypt(self, plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        AesEngine::decrypt(self, ciphertext)
    }

    fn encrypt_base64(&self, plaintext: &[u8]) -> Result<String> {
        AesEngine::encrypt_base64(self, plaintext)
    }

    fn decrypt_base64(&self, encoded: &str) -> Result<String> {
        AesEngine::decrypt_base64(self, encoded)
    }
}
