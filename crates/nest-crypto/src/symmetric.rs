//! # Symmetric Encryption
//!
//! AES-256-GCM with a fresh random 96-bit nonce per call and no associated
//! data. The 16-byte tag is appended to the ciphertext.
//!
//! ## Security Properties
//!
//! - A nonce is never reused: each `encrypt` draws a new one from the OS RNG
//! - Every decrypt failure is reported as `AuthenticationFailed`

use crate::CryptoError;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm,
};
use rand::RngCore;
use zeroize::Zeroize;

/// Required key length in bytes.
pub const KEY_LEN: usize = 32;

/// Required nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Authentication tag length appended to each ciphertext.
pub const TAG_LEN: usize = 16;

/// Secret key (256-bit).
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; KEY_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidKeySize {
            expected: KEY_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(array))
    }

    /// Generate random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Nonce for encryption.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Generate random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

fn cipher_for(key: &[u8]) -> Result<Aes256Gcm, CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::InvalidKeySize {
            expected: KEY_LEN,
            actual: key.len(),
        });
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKeySize {
        expected: KEY_LEN,
        actual: key.len(),
    })
}

/// Encrypt plaintext with AES-256-GCM.
///
/// Returns (ciphertext, nonce).
///
/// # Errors
///
/// Returns `CryptoError::InvalidKeySize` if `key` is not 32 bytes.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<(Vec<u8>, Nonce), CryptoError> {
    let cipher = cipher_for(key)?;
    let nonce = Nonce::generate();

    let ciphertext = cipher
        .encrypt(aes_gcm::Nonce::from_slice(nonce.as_bytes()), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    Ok((ciphertext, nonce))
}

/// Decrypt ciphertext with AES-256-GCM.
///
/// A nonce of the wrong length is treated like any other integrity failure.
///
/// # Errors
///
/// Returns `CryptoError::InvalidKeySize` if `key` is not 32 bytes and
/// `CryptoError::AuthenticationFailed` if the tag does not verify.
pub fn decrypt(ciphertext: &[u8], key: &[u8], nonce: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = cipher_for(key)?;
    if nonce.len() != NONCE_LEN {
        return Err(CryptoError::AuthenticationFailed);
    }

    cipher
        .decrypt(aes_gcm::Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailed)
}
