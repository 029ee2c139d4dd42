//! IV and nonce strategies.
//!
//! A strategy produces the IV (CBC) or nonce (GCM) for each encryption and
//! recovers it from the packed buffer on decryption. The built-in random
//! strategies place the IV at the front of the buffer, which is where
//! [`AppendPacker`](crate::packer::AppendPacker) puts it.
//!
//! # Nonce reuse
//! The engine does not track nonces. A custom strategy used in GCM mode must
//! never return the same nonce twice under one key: doing so exposes the
//! plaintexts' XOR and lets an attacker forge tags.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use zeroize::Zeroizing;

use symcrypt_common::{Error, Result};
use crate::block::{BLOCK_SIZE, GCM_NONCE_SIZE};

/// Produces and recovers per-message IV material.
pub trait IvStrategy: Send + Sync {
    /// Create the IV or nonce for one encryption.
    ///
    /// `plaintext` is the data about to be encrypted (already padded in CBC
    /// mode). The built-in strategies ignore both arguments.
    fn create_for_encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Recover the IV or nonce used for `combined`.
    fn extract_for_decrypt(&self, key: &[u8], combined: &[u8]) -> Result<Vec<u8>>;
}

/// Random 16-byte IV for CBC mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIv;

impl IvStrategy for RandomIv {
    fn create_for_encrypt(&self, _key: &[u8], _plaintext: &[u8]) -> Result<Vec<u8>> {
        random_bytes(BLOCK_SIZE)
    }

    fn extract_for_decrypt(&self, _key: &[u8], combined: &[u8]) -> Result<Vec<u8>> {
        leading_bytes(combined, BLOCK_SIZE, "IV")
    }
}

/// Random 12-byte nonce for GCM mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGcmNonce;

impl IvStrategy for RandomGcmNonce {
    fn create_for_encrypt(&self, _key: &[u8], _plaintext: &[u8]) -> Result<Vec<u8>> {
        random_bytes(GCM_NONCE_SIZE)
    }

    fn extract_for_decrypt(&self, _key: &[u8], combined: &[u8]) -> Result<Vec<u8>> {
        leading_bytes(combined, GCM_NONCE_SIZE, "nonce")
    }
}

/// Caller-supplied IV or nonce, returned unchanged for every message.
///
/// Meant for pairing with [`PurePacker`](crate::packer::PurePacker) when an
/// outer protocol carries the IV. Build a fresh `FixedIv` per message in GCM
/// mode; see the module docs on nonce reuse.
#[derive(Clone)]
pub struct FixedIv {
    iv: Zeroizing<Vec<u8>>,
}

impl FixedIv {
    /// Wrap an IV (16 bytes for CBC) or nonce (12 bytes for GCM).
    ///
    /// Length is checked by the cipher at use time.
    pub fn new(iv: impl Into<Vec<u8>>) -> Self {
        Self {
            iv: Zeroizing::new(iv.into()),
        }
    }

    /// Get the IV bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.iv
    }
}

impl std::fmt::Debug for FixedIv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FixedIv({} bytes)", self.iv.len())
    }
}

impl IvStrategy for FixedIv {
    fn create_for_encrypt(&self, _key: &[u8], _plaintext: &[u8]) -> Result<Vec<u8>> {
        Ok(self.iv.to_vec())
    }

    fn extract_for_decrypt(&self, _key: &[u8], _combined: &[u8]) -> Result<Vec<u8>> {
        Ok(self.iv.to_vec())
    }
}

fn random_bytes(len: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Entropy(format!("Failed to generate random IV: {}", e)))?;
    Ok(bytes)
}

fn leading_bytes(combined: &[u8], len: usize, what: &str) -> Result<Vec<u8>> {
    if combined.len() < len {
        return Err(Error::Validation(format!(
            "Ciphertext too short to contain {}",
            what
        )));
    }
    Ok(combined[..len].to_vec())
}
