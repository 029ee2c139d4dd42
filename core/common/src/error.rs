//! Common error types for symcrypt.

use thiserror::Error;

/// Top-level error type for symmetric encryption operations.
///
/// `Padding` and `Authentication` deliberately carry no detail. Callers must
/// treat either one as "cannot decrypt" and nothing more.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid engine configuration, such as a bad key length or an IV
    /// strategy producing material of the wrong size.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input rejected before any cryptographic transform was attempted.
    #[error("Validation error: {0}")]
    Validation(String),

    /// PKCS7 unpadding failed.
    #[error("Invalid padding")]
    Padding,

    /// AEAD tag verification failed.
    #[error("Authentication failed")]
    Authentication,

    /// Malformed Base64 input or non UTF-8 plaintext.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The secure random source could not supply bytes.
    #[error("Entropy error: {0}")]
    Entropy(String),
}

impl Error {
    /// Returns true for failures that must be reported to untrusted parties
    /// only as a generic "cannot decrypt".
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, Error::Padding | Error::Authentication)
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
