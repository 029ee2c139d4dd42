//! AES symmetric encryption for symcrypt.
//!
//! This module provides:
//! - An AES engine supporting CBC and GCM modes with 128, 192, or 256-bit keys
//! - Pluggable IV/nonce, padding, and result-packing strategies
//! - Base64 adapters for string transport
//!
//! # Security Guarantees
//! - Key material is zeroized on drop and redacted from `Debug` output
//! - No plaintext or key material is ever logged
//! - PKCS#7 padding is verified in constant time with a single generic error
//! - GCM authentication failures are reported without distinguishing cause
//!
//! # Nonce reuse
//! The engine never checks nonce uniqueness. Custom IV strategies used with
//! GCM must guarantee it themselves.

mod block;
pub mod cipher;
pub mod engine;
pub mod iv;
pub mod keys;
pub mod packer;
pub mod padding;

pub use block::{BLOCK_SIZE, GCM_NONCE_SIZE, GCM_TAG_SIZE};
pub use cipher::SymmetricCipher;
pub use engine::{AesEngine, AesMode, AesOptions};
pub use iv::{FixedIv, IvStrategy, RandomGcmNonce, RandomIv};
pub use keys::{AesKey, KeySize};
pub use packer::{AppendPacker, PurePacker, ResultPacker};
pub use padding::{PaddingStrategy, Pkcs7Padding};
pub use symcrypt_common::{Error, Result};
