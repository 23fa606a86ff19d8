//! # Asymmetric Encryption
//!
//! RSA with PKCS#1 v1.5 encryption padding, backed by the published
//! [`KeyStore`]. Plaintext is limited to the modulus size minus 11 bytes;
//! larger payloads go through the hybrid envelope instead.
//!
//! ## Security Properties
//!
//! - Missing key halves fail closed with `KeyNotConfigured`
//! - Every padding or format error on decrypt collapses into `DecryptionFailed`

use crate::{CryptoError, KeyStore};
use rsa::traits::PublicKeyParts;
use rsa::Pkcs1v15Encrypt;
use tracing::debug;

/// Fixed PKCS#1 v1.5 padding overhead in bytes.
pub const PKCS1_OVERHEAD: usize = 11;

/// Public-key encryption / private-key decryption over a key snapshot.
#[derive(Clone, Debug)]
pub struct AsymmetricCodec {
    store: KeyStore,
}

impl AsymmetricCodec {
    /// Create a codec over the given key store.
    pub fn new(store: KeyStore) -> Self {
        Self { store }
    }

    /// The key store this codec reads.
    pub fn store(&self) -> &KeyStore {
        &self.store
    }

    /// Largest plaintext `encrypt` accepts, if a public key is configured.
    pub fn max_plaintext_len(&self) -> Result<usize, CryptoError> {
        let public = self.store.keys().public()?;
        Ok(public.size().saturating_sub(PKCS1_OVERHEAD))
    }

    /// Encrypt with the public key.
    ///
    /// # Errors
    ///
    /// `KeyNotConfigured` without a public key, `PayloadTooLarge` past the
    /// padding limit.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let public = self.store.keys().public()?;
        let max = public.size().saturating_sub(PKCS1_OVERHEAD);
        if plaintext.len() > max {
            return Err(CryptoError::PayloadTooLarge {
                max,
                actual: plaintext.len(),
            });
        }

        public
            .encrypt(&mut rand::rngs::OsRng, Pkcs1v15Encrypt, plaintext)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
    }

    /// Decrypt with the private key.
    ///
    /// # Errors
    ///
    /// `KeyNotConfigured` without a private key, otherwise `DecryptionFailed`
    /// for any malformed or foreign ciphertext. Errors are uniform; timing is
    /// not (PKCS#1 v1.5, RUSTSEC-2023-0071).
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let private = self.store.keys().private()?;

        private.decrypt(Pkcs1v15Encrypt, ciphertext).map_err(|e| {
            debug!(error = %e, len = ciphertext.len(), "RSA decryption rejected");
            CryptoError::DecryptionFailed
        })
    }
}
