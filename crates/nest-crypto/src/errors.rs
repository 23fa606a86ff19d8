//! Crypto error types.
//!
//! Verification failures are deliberately coarse: every integrity, padding
//! or format problem inside a decrypt maps to a single variant so that callers
//! cannot learn which step rejected the input.

use std::fmt;
use thiserror::Error;

/// Which half of the key pair an operation needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyHalf {
    /// Public key (encryption)
    Public,
    /// Private key (decryption)
    Private,
}

impl fmt::Display for KeyHalf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyHalf::Public => f.write_str("public"),
            KeyHalf::Private => f.write_str("private"),
        }
    }
}

/// Cryptographic operation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The key pair has no key for the requested half
    #[error("{0} key is not configured")]
    KeyNotConfigured(KeyHalf),

    /// Symmetric key has the wrong length
    #[error("Invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Plaintext exceeds what the asymmetric scheme can carry directly
    #[error("Payload too large: at most {max} bytes, got {actual}")]
    PayloadTooLarge {
        /// Largest accepted plaintext in bytes
        max: usize,
        /// Actual plaintext length in bytes
        actual: usize,
    },

    /// AEAD tag did not verify (tampering, wrong key, wrong nonce)
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Asymmetric decryption failed (padding or format)
    #[error("Decryption failed")]
    DecryptionFailed,

    /// Hybrid envelope could not be opened
    #[error("Envelope invalid")]
    EnvelopeInvalid,

    /// Encryption failed inside the primitive
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Key material could not be parsed or has the wrong type
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Key generation failed
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Transport encoding (base64 / JSON) was malformed
    #[error("Malformed encoding: {0}")]
    Encoding(String),
}
