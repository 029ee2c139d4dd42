//! Block padding for CBC mode.

use subtle::{Choice, ConstantTimeEq};

use symcrypt_common::{Error, Result};

/// Pads plaintext to a block multiple and strips that padding again.
pub trait PaddingStrategy: Send + Sync {
    /// Pad `data` to a multiple of `block_size`.
    fn pad(&self, data: &[u8], block_size: usize) -> Result<Vec<u8>>;

    /// Remove padding added by [`PaddingStrategy::pad`].
    fn unpad(&self, padded: Vec<u8>) -> Result<Vec<u8>>;
}

/// PKCS#7 padding.
///
/// Always appends between 1 and `block_size` bytes, each holding the pad
/// length.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pkcs7Padding;

impl PaddingStrategy for Pkcs7Padding {
    fn pad(&self, data: &[u8], block_size: usize) -> Result<Vec<u8>> {
        if block_size == 0 || block_size > 255 {
            return Err(Error::Configuration(format!(
                "Invalid block size: {}",
                block_size
            )));
        }

        let pad_len = block_size - data.len() % block_size;
        let mut padded = Vec::with_capacity(data.len() + pad_len);
        padded.extend_from_slice(data);
        padded.resize(data.len() + pad_len, pad_len as u8);
        Ok(padded)
    }

    /// # Security
    /// Every padding byte is compared in constant time and all failures
    /// return the same `Error::Padding`.
    fn unpad(&self, mut padded: Vec<u8>) -> Result<Vec<u8>> {
        let pad_byte = match padded.last() {
            Some(&b) => b,
            None => return Err(Error::Padding),
        };
        let pad_len = pad_byte as usize;
        if pad_len == 0 || pad_len > padded.len() {
            return Err(Error::Padding);
        }

        let mut valid = Choice::from(1u8);
        for b in &padded[padded.len() - pad_len..] {
            valid &= b.ct_eq(&pad_byte);
        }
        if !bool::from(valid) {
            return Err(Error::Padding);
        }

        padded.truncate(padded.len() - pad_len);
        Ok(padded)
    }
}
