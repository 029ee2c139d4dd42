//! Key types with secure memory handling.
//!
//! An [`AesKey`] can only be built from 16, 24, or 32 bytes. The key bytes
//! are zeroized when the key is dropped.

use std::fmt;

use zeroize::Zeroizing;

use symcrypt_common::{Error, Result};

/// The three legal AES key sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySize {
    /// 128-bit key (16 bytes).
    Aes128,
    /// 192-bit key (24 bytes).
    Aes192,
    /// 256-bit key (32 bytes).
    Aes256,
}

impl KeySize {
    /// Map a raw key length to its key size.
    ///
    /// # Errors
    /// - Returns `Error::Configuration` for any length other than 16, 24, or 32
    pub fn from_len(len: usize) -> Result<Self> {
        match len {
            16 => Ok(KeySize::Aes128),
            24 => Ok(KeySize::Aes192),
            32 => Ok(KeySize::Aes256),
            other => Err(Error::Configuration(format!(
                "Invalid key size: must be 16, 24, or 32 bytes, got {}",
                other
            ))),
        }
    }

    /// Key length in bytes.
    pub fn byte_len(&self) -> usize {
        match self {
            KeySize::Aes128 => 16,
            KeySize::Aes192 => 24,
            KeySize::Aes256 => 32,
        }
    }

    /// Key length in bits.
    pub fn bits(&self) -> usize {
        self.byte_len() * 8
    }
}

/// A validated AES key.
///
/// The bytes are copied on construction so later changes to the caller's
/// buffer do not affect the key.
#[derive(Clone)]
pub struct AesKey {
    bytes: Zeroizing<Vec<u8>>,
    size: KeySize,
}

impl AesKey {
    /// Create a key from raw bytes.
    ///
    /// # Errors
    /// - Returns `Error::Configuration` if the length is not 16, 24, or 32
    pub fn from_slice(key: &[u8]) -> Result<Self> {
        let size = KeySize::from_len(key.len())?;
        Ok(Self {
            bytes: Zeroizing::new(key.to_vec()),
            size,
        })
    }

    /// Size of this key.
    pub fn size(&self) -> KeySize {
        self.size
    }

    /// Get the key bytes.
    ///
    /// Crate-private; the engine never exposes its key.
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for AesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AesKey({:?}, [REDACTED])", self.size)
    }
}
