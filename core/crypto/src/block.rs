//! Keyed AES block cipher and the CBC/GCM transforms built on it.
//!
//! The key schedule is expanded once, when the engine is constructed, and
//! shared read-only by every later call. Mode wrappers (CBC chaining state,
//! the GCM hash key) are per-call values layered over a clone of the
//! expanded schedule.

use std::fmt;

use aes::cipher::{
    block_padding::NoPadding, BlockCipher, BlockDecryptMut, BlockEncrypt, BlockEncryptMut,
    BlockSizeUser, InnerIvInit, KeyInit,
};
use aes::{Aes128, Aes192, Aes256};
use aes_gcm::{
    aead::{
        consts::{U12, U16},
        generic_array::GenericArray,
        Aead,
    },
    AesGcm,
};

use symcrypt_common::{Error, Result};
use crate::keys::{AesKey, KeySize};

/// AES block size (16 bytes).
pub const BLOCK_SIZE: usize = 16;

/// GCM nonce size (12 bytes).
pub const GCM_NONCE_SIZE: usize = 12;

/// GCM authentication tag size (16 bytes).
pub const GCM_TAG_SIZE: usize = 16;

/// AES cipher keyed with a validated key.
#[derive(Clone)]
pub(crate) enum CipherBlock {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl CipherBlock {
    /// Expand the key schedule for `key`.
    ///
    /// # Errors
    /// - `Error::Configuration` if the cipher rejects the key. Unreachable
    ///   for an `AesKey`, which is length-checked on construction.
    pub(crate) fn new(key: &AesKey) -> Result<Self> {
        let bytes = key.as_bytes();
        let block = match key.size() {
            KeySize::Aes128 => Aes128::new_from_slice(bytes).map(CipherBlock::Aes128),
            KeySize::Aes192 => Aes192::new_from_slice(bytes).map(CipherBlock::Aes192),
            KeySize::Aes256 => Aes256::new_from_slice(bytes).map(CipherBlock::Aes256),
        };
        block.map_err(|_| Error::Configuration("Failed to create cipher block".to_string()))
    }

    /// CBC-encrypt block-aligned data. No padding is applied.
    pub(crate) fn cbc_encrypt(&self, iv: &[u8], padded: &[u8]) -> Result<Vec<u8>> {
        if padded.len() % BLOCK_SIZE != 0 {
            return Err(Error::Configuration(format!(
                "Padded plaintext length {} is not a multiple of block size {}",
                padded.len(),
                BLOCK_SIZE
            )));
        }
        match self {
            CipherBlock::Aes128(c) => cbc_encrypt_with(c, iv, padded),
            CipherBlock::Aes192(c) => cbc_encrypt_with(c, iv, padded),
            CipherBlock::Aes256(c) => cbc_encrypt_with(c, iv, padded),
        }
    }

    /// CBC-decrypt block-aligned data. Padding is left in place.
    pub(crate) fn cbc_decrypt(&self, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(Error::Validation(
                "Ciphertext length is not a multiple of block size".to_string(),
            ));
        }
        match self {
            CipherBlock::Aes128(c) => cbc_decrypt_with(c, iv, ciphertext),
            CipherBlock::Aes192(c) => cbc_decrypt_with(c, iv, ciphertext),
            CipherBlock::Aes256(c) => cbc_decrypt_with(c, iv, ciphertext),
        }
    }

    /// Seal `plaintext` with AES-GCM. Returns ciphertext || tag.
    pub(crate) fn gcm_seal(&self, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        check_nonce(nonce)?;
        match self {
            CipherBlock::Aes128(c) => gcm_seal_with(c, nonce, plaintext),
            CipherBlock::Aes192(c) => gcm_seal_with(c, nonce, plaintext),
            CipherBlock::Aes256(c) => gcm_seal_with(c, nonce, plaintext),
        }
    }

    /// Open ciphertext || tag produced by [`CipherBlock::gcm_seal`].
    pub(crate) fn gcm_open(&self, nonce: &[u8], sealed: &[u8]) -> Result<Vec<u8>> {
        check_nonce(nonce)?;
        match self {
            CipherBlock::Aes128(c) => gcm_open_with(c, nonce, sealed),
            CipherBlock::Aes192(c) => gcm_open_with(c, nonce, sealed),
            CipherBlock::Aes256(c) => gcm_open_with(c, nonce, sealed),
        }
    }
}

impl fmt::Debug for CipherBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CipherBlock::Aes128(_) => "Aes128",
            CipherBlock::Aes192(_) => "Aes192",
            CipherBlock::Aes256(_) => "Aes256",
        };
        write!(f, "CipherBlock({}, [REDACTED])", name)
    }
}

fn cbc_encrypt_with<C>(cipher: &C, iv: &[u8], padded: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockEncryptMut + Clone,
{
    let encryptor = cbc::Encryptor::<C>::inner_iv_slice_init(cipher.clone(), iv)
        .map_err(|_| invalid_iv(iv.len()))?;
    Ok(encryptor.encrypt_padded_vec_mut::<NoPadding>(padded))
}

fn cbc_decrypt_with<C>(cipher: &C, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockDecryptMut + Clone,
{
    let decryptor = cbc::Decryptor::<C>::inner_iv_slice_init(cipher.clone(), iv)
        .map_err(|_| invalid_iv(iv.len()))?;
    decryptor
        .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
        .map_err(|_| {
            Error::Validation("Ciphertext length is not a multiple of block size".to_string())
        })
}

fn gcm_seal_with<C>(cipher: &C, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt + Clone,
{
    let aead = AesGcm::<C, U12>::from(cipher.clone());
    aead.encrypt(GenericArray::from_slice(nonce), plaintext)
        .map_err(|_| Error::Validation("Plaintext too large for GCM".to_string()))
}

fn gcm_open_with<C>(cipher: &C, nonce: &[u8], sealed: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt + Clone,
{
    let aead = AesGcm::<C, U12>::from(cipher.clone());
    aead.decrypt(GenericArray::from_slice(nonce), sealed)
        .map_err(|_| Error::Authentication)
}

// GenericArray::from_slice panics on a length mismatch.
fn check_nonce(nonce: &[u8]) -> Result<()> {
    if nonce.len() != GCM_NONCE_SIZE {
        return Err(Error::Configuration(format!(
            "Invalid nonce size: expected {}, got {}",
            GCM_NONCE_SIZE,
            nonce.len()
        )));
    }
    Ok(())
}

fn invalid_iv(len: usize) -> Error {
    Error::Configuration(format!(
        "Invalid IV size: expected {}, got {}",
        BLOCK_SIZE, len
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(len: usize) -> CipherBlock {
        let key = AesKey::from_slice(&vec![0x42u8; len]).unwrap();
        CipherBlock::new(&key).unwrap()
    }

    #[test]
    fn test_cbc_roundtrip_all_key_sizes() {
        let iv = [9u8; BLOCK_SIZE];
        let data = [0xABu8; 48];
        for len in [16, 24, 32] {
            let cb = block(len);
            let ct = cb.cbc_encrypt(&iv, &data).unwrap();
            assert_eq!(ct.len(), data.len());
            assert_ne!(&ct[..], &data[..]);
            assert_eq!(cb.cbc_decrypt(&iv, &ct).unwrap(), data);
        }
    }

    #[test]
    fn test_cbc_known_answer_aes128() {
        // NIST SP 800-38A F.2.1, first block.
        let key: [u8; 16] = [
            0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf,
            0x4f, 0x3c,
        ];
        let iv: [u8; 16] = core::array::from_fn(|i| i as u8);
        let plaintext: [u8; 16] = [
            0x6b, 0xc1, 0xbe, 0xe2, 0x2e, 0x40, 0x9f, 0x96, 0xe9, 0x3d, 0x7e, 0x11, 0x73, 0x93,
            0x17, 0x2a,
        ];
        let expected: [u8; 16] = [
            0x76, 0x49, 0xab, 0xac, 0x81, 0x19, 0xb2, 0x46, 0xce, 0xe9, 0x8e, 0x9b, 0x12, 0xe9,
            0x19, 0x7d,
        ];
        let cb = CipherBlock::new(&AesKey::from_slice(&key).unwrap()).unwrap();
        assert_eq!(cb.cbc_encrypt(&iv, &plaintext).unwrap(), expected);
    }

    #[test]
    fn test_cbc_rejects_unaligned() {
        let cb = block(16);
        let iv = [0u8; BLOCK_SIZE];
        assert!(matches!(
            cb.cbc_encrypt(&iv, &[1u8; 15]),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            cb.cbc_decrypt(&iv, &[1u8; 17]),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_cbc_rejects_wrong_iv_size() {
        let cb = block(32);
        let result = cb.cbc_encrypt(&[0u8; 12], &[0u8; 16]);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_gcm_roundtrip_and_tag_size() {
        let nonce = [3u8; GCM_NONCE_SIZE];
        for len in [16, 24, 32] {
            let cb = block(len);
            let sealed = cb.gcm_seal(&nonce, b"attack at dawn").unwrap();
            assert_eq!(sealed.len(), 14 + GCM_TAG_SIZE);
            assert_eq!(cb.gcm_open(&nonce, &sealed).unwrap(), b"attack at dawn");
        }
    }

    #[test]
    fn test_gcm_wrong_nonce_size_is_configuration_error() {
        let cb = block(16);
        assert!(matches!(
            cb.gcm_seal(&[0u8; 16], b"data"),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            cb.gcm_open(&[0u8; 8], &[0u8; 32]),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_gcm_tamper_is_authentication_error() {
        let cb = block(24);
        let nonce = [1u8; GCM_NONCE_SIZE];
        let mut sealed = cb.gcm_seal(&nonce, b"payload").unwrap();
        sealed[0] ^= 0x01;
        assert!(matches!(
            cb.gcm_open(&nonce, &sealed),
            Err(Error::Authentication)
        ));
    }

    #[test]
    fn test_gcm_short_sealed_is_authentication_error() {
        let cb = block(16);
        let nonce = [1u8; GCM_NONCE_SIZE];
        assert!(matches!(
            cb.gcm_open(&nonce, &[0u8; 4]),
            Err(Error::Authentication)
        ));
    }

    #[test]
    fn test_debug_redacts() {
        let debug = format!("{:?}", block(32));
        assert_eq!(debug, "CipherBlock(Aes256, [REDACTED])");
    }
}
