//! Framing of IV material and ciphertext into one buffer.

use symcrypt_common::{Error, Result};

/// Combines an IV with its ciphertext and splits them apart again.
///
/// `separate` must agree with the IV strategy's `extract_for_decrypt` on
/// where the IV lives.
pub trait ResultPacker: Send + Sync {
    /// Frame `iv` and `ciphertext` for transport.
    fn combine(&self, iv: &[u8], ciphertext: Vec<u8>) -> Vec<u8>;

    /// Return the ciphertext portion of `combined`, given an IV of `iv_size`
    /// bytes.
    fn separate<'a>(&self, combined: &'a [u8], iv_size: usize) -> Result<&'a [u8]>;
}

/// Packs as `iv || ciphertext`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppendPacker;

impl ResultPacker for AppendPacker {
    fn combine(&self, iv: &[u8], ciphertext: Vec<u8>) -> Vec<u8> {
        let mut result = Vec::with_capacity(iv.len() + ciphertext.len());
        result.extend_from_slice(iv);
        result.extend_from_slice(&ciphertext);
        result
    }

    fn separate<'a>(&self, combined: &'a [u8], iv_size: usize) -> Result<&'a [u8]> {
        if combined.len() < iv_size {
            return Err(Error::Validation("Truncated ciphertext".to_string()));
        }
        Ok(&combined[iv_size..])
    }
}

/// Emits the bare ciphertext. The IV travels out of band.
#[derive(Debug, Clone, Copy, Default)]
pub struct PurePacker;

impl ResultPacker for PurePacker {
    fn combine(&self, _iv: &[u8], ciphertext: Vec<u8>) -> Vec<u8> {
        ciphertext
    }

    fn separate<'a>(&self, combined: &'a [u8], _iv_size: usize) -> Result<&'a [u8]> {
        Ok(combined)
    }
}
