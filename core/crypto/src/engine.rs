//! AES encryption engine.
//!
//! An [`AesEngine`] owns a validated key, the expanded cipher block, and one
//! strategy each for IVs, padding, and result packing. All of these are
//! fixed at construction, so an engine can be shared across threads and
//! used concurrently without locking.
//!
//! # Packed format (default strategies)
//! - CBC: `iv (16) || ciphertext (PKCS#7 padded)`
//! - GCM: `nonce (12) || ciphertext || tag (16)`

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;

use symcrypt_common::{Error, Result};
use crate::block::{CipherBlock, BLOCK_SIZE};
use crate::iv::{IvStrategy, RandomGcmNonce, RandomIv};
use crate::keys::{AesKey, KeySize};
use crate::packer::{AppendPacker, ResultPacker};
use crate::padding::{PaddingStrategy, Pkcs7Padding};

/// Block cipher mode of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AesMode {
    /// Cipher block chaining with PKCS#7 padding. Not authenticated.
    #[default]
    Cbc,
    /// Galois/counter mode. Authenticated.
    Gcm,
}

impl fmt::Display for AesMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AesMode::Cbc => write!(f, "cbc"),
            AesMode::Gcm => write!(f, "gcm"),
        }
    }
}

impl FromStr for AesMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cbc" => Ok(AesMode::Cbc),
            "gcm" => Ok(AesMode::Gcm),
            other => Err(Error::Configuration(format!("Unknown AES mode: {}", other))),
        }
    }
}

/// Engine configuration.
///
/// Unset strategies resolve at construction: `RandomIv` for CBC or
/// `RandomGcmNonce` for GCM, `AppendPacker`, and `Pkcs7Padding`. Padding is
/// only consulted in CBC mode.
#[derive(Clone, Default)]
pub struct AesOptions {
    pub mode: AesMode,
    pub iv_strategy: Option<Arc<dyn IvStrategy>>,
    pub result_packer: Option<Arc<dyn ResultPacker>>,
    pub padding_strategy: Option<Arc<dyn PaddingStrategy>>,
}

impl AesOptions {
    /// Options with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mode.
    pub fn with_mode(mut self, mode: AesMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set a custom IV strategy.
    ///
    /// # Warning
    /// In GCM mode the strategy alone is responsible for never repeating a
    /// nonce under the same key.
    pub fn with_iv_strategy(mut self, strategy: impl IvStrategy + 'static) -> Self {
        self.iv_strategy = Some(Arc::new(strategy));
        self
    }

    /// Set a custom result packer.
    pub fn with_result_packer(mut self, packer: impl ResultPacker + 'static) -> Self {
        self.result_packer = Some(Arc::new(packer));
        self
    }

    /// Set a custom padding strategy.
    pub fn with_padding_strategy(mut self, padding: impl PaddingStrategy + 'static) -> Self {
        self.padding_strategy = Some(Arc::new(padding));
        self
    }
}

impl fmt::Debug for AesOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesOptions")
            .field("mode", &self.mode)
            .field("custom_iv_strategy", &self.iv_strategy.is_some())
            .field("custom_result_packer", &self.result_packer.is_some())
            .field("custom_padding_strategy", &self.padding_strategy.is_some())
            .finish()
    }
}

/// AES encryption engine.
#[derive(Clone)]
pub struct AesEngine {
    key: AesKey,
    mode: AesMode,
    iv_strategy: Arc<dyn IvStrategy>,
    result_packer: Arc<dyn ResultPacker>,
    padding_strategy: Arc<dyn PaddingStrategy>,
    block: CipherBlock,
}

impl AesEngine {
    /// Create a CBC engine with the default strategies.
    ///
    /// # Errors
    /// - `Error::Configuration` if `key` is not 16, 24, or 32 bytes
    pub fn new(key: &[u8]) -> Result<Self> {
        Self::with_options(key, AesOptions::default())
    }

    /// Create an engine from `options`, filling unset fields with the
    /// defaults for the chosen mode.
    ///
    /// # Preconditions
    /// - `key` must be 16, 24, or 32 bytes
    ///
    /// # Postconditions
    /// - The cipher block is fully constructed; no later call re-derives it
    ///
    /// # Errors
    /// - `Error::Configuration` if the key length is invalid
    pub fn with_options(key: &[u8], options: AesOptions) -> Result<Self> {
        let key = AesKey::from_slice(key)?;
        let mode = options.mode;

        let iv_strategy: Arc<dyn IvStrategy> = match options.iv_strategy {
            Some(strategy) => {
                if mode == AesMode::Gcm {
                    debug!("Custom nonce strategy in GCM mode; nonce uniqueness is not enforced");
                }
                strategy
            }
            None => match mode {
                AesMode::Cbc => Arc::new(RandomIv),
                AesMode::Gcm => Arc::new(RandomGcmNonce),
            },
        };
        let result_packer: Arc<dyn ResultPacker> = options
            .result_packer
            .unwrap_or_else(|| Arc::new(AppendPacker));
        let padding_strategy: Arc<dyn PaddingStrategy> = options
            .padding_strategy
            .unwrap_or_else(|| Arc::new(Pkcs7Padding));

        let block = CipherBlock::new(&key)?;

        debug!(mode = %mode, key_bits = key.size().bits(), "AES engine created");

        Ok(Self {
            key,
            mode,
            iv_strategy,
            result_packer,
            padding_strategy,
            block,
        })
    }

    /// Mode this engine was built with.
    pub fn mode(&self) -> AesMode {
        self.mode
    }

    /// Size of the engine's key.
    pub fn key_size(&self) -> KeySize {
        self.key.size()
    }

    /// Encrypt `plaintext` and return the packed result.
    ///
    /// # Errors
    /// - `Error::Validation` if `plaintext` is empty
    /// - `Error::Entropy` if the random source fails
    /// - `Error::Configuration` if a custom strategy yields IV material of
    ///   the wrong size
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        if plaintext.is_empty() {
            return Err(Error::Validation("Empty data to encrypt".to_string()));
        }

        match self.mode {
            AesMode::Cbc => self.encrypt_cbc(plaintext),
            AesMode::Gcm => self.encrypt_gcm(plaintext),
        }
    }

    /// Decrypt a packed result produced by [`AesEngine::encrypt`].
    ///
    /// No partial plaintext is ever returned on failure.
    ///
    /// # Errors
    /// - `Error::Validation` for empty, truncated, or misaligned input
    /// - `Error::Padding` if CBC padding is invalid
    /// - `Error::Authentication` if the GCM tag does not verify
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.is_empty() {
            return Err(Error::Validation("Empty cipher data".to_string()));
        }

        match self.mode {
            AesMode::Cbc => self.decrypt_cbc(ciphertext),
            AesMode::Gcm => self.decrypt_gcm(ciphertext),
        }
    }

    /// Encrypt and encode the packed result as standard Base64.
    pub fn encrypt_base64(&self, plaintext: &[u8]) -> Result<String> {
        let packed = self.encrypt(plaintext)?;
        Ok(STANDARD.encode(packed))
    }

    /// Decode standard Base64, decrypt, and return the plaintext as text.
    ///
    /// # Errors
    /// - `Error::Encoding` if `encoded` is not valid Base64 (checked before
    ///   any decryption) or the plaintext is not valid UTF-8
    /// - Any error from [`AesEngine::decrypt`]
    pub fn decrypt_base64(&self, encoded: &str) -> Result<String> {
        let packed = STANDARD
            .decode(encoded)
            .map_err(|e| Error::Encoding(format!("Invalid base64 data: {}", e)))?;
        let plaintext = self.decrypt(&packed)?;
        String::from_utf8(plaintext)
            .map_err(|_| Error::Encoding("Decrypted data is not valid UTF-8".to_string()))
    }

    fn encrypt_cbc(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let padded = self.padding_strategy.pad(plaintext, BLOCK_SIZE)?;
        let iv = self
            .iv_strategy
            .create_for_encrypt(self.key.as_bytes(), &padded)?;
        let ciphertext = self.block.cbc_encrypt(&iv, &padded)?;
        Ok(self.result_packer.combine(&iv, ciphertext))
    }

    fn decrypt_cbc(&self, combined: &[u8]) -> Result<Vec<u8>> {
        let iv = self
            .iv_strategy
            .extract_for_decrypt(self.key.as_bytes(), combined)?;
        let ciphertext = self.result_packer.separate(combined, iv.len())?;
        if ciphertext.is_empty() {
            return Err(Error::Validation("Truncated ciphertext".to_string()));
        }
        let padded = self.block.cbc_decrypt(&iv, ciphertext)?;
        self.padding_strategy.unpad(padded)
    }

    fn encrypt_gcm(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = self
            .iv_strategy
            .create_for_encrypt(self.key.as_bytes(), plaintext)?;
        let sealed = self.block.gcm_seal(&nonce, plaintext)?;
        Ok(self.result_packer.combine(&nonce, sealed))
    }

    fn decrypt_gcm(&self, combined: &[u8]) -> Result<Vec<u8>> {
        let nonce = self
            .iv_strategy
            .extract_for_decrypt(self.key.as_bytes(), combined)?;
        let sealed = self.result_packer.separate(combined, nonce.len())?;
        self.block.gcm_open(&nonce, sealed)
    }
}

impl fmt::Debug for AesEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesEngine")
            .field("mode", &self.mode)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
