//! # Key Pair and Key Store
//!
//! The RSA key pair is loaded once at startup and published as an immutable
//! snapshot. Codecs and middleware receive a [`KeyStore`] handle; there are
//! no setters, so concurrent readers never need a lock.
//!
//! Either half may be absent. Operations that need a missing half fail with
//! [`CryptoError::KeyNotConfigured`] instead of falling back to a default.

use crate::{CryptoError, KeyHalf};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::path::Path;
use std::sync::Arc;

/// Smallest modulus accepted for generated keys.
pub const MIN_KEY_BITS: usize = 2048;

/// RSA key pair with independently optional halves.
#[derive(Clone, Default)]
pub struct KeyPair {
    public: Option<RsaPublicKey>,
    private: Option<RsaPrivateKey>,
}

impl KeyPair {
    /// Start an empty key pair.
    pub fn builder() -> KeyPairBuilder {
        KeyPairBuilder::default()
    }

    /// Key pair with neither half set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Generate a fresh key pair with both halves set.
    pub fn generate(bits: usize) -> Result<Self, CryptoError> {
        if bits < MIN_KEY_BITS {
            return Err(CryptoError::KeyGenerationFailed(format!(
                "modulus of {} bits is below the {} bit minimum",
                bits, MIN_KEY_BITS
            )));
        }
        let private = RsaPrivateKey::new(&mut rand::rngs::OsRng, bits)
            .map_err(|e| CryptoError::KeyGenerationFailed(e.to_string()))?;
        let public = RsaPublicKey::from(&private);
        Ok(Self {
            public: Some(public),
            private: Some(private),
        })
    }

    /// Public half, or `KeyNotConfigured`.
    pub fn public(&self) -> Result<&RsaPublicKey, CryptoError> {
        self.public
            .as_ref()
            .ok_or(CryptoError::KeyNotConfigured(KeyHalf::Public))
    }

    /// Private half, or `KeyNotConfigured`.
    pub fn private(&self) -> Result<&RsaPrivateKey, CryptoError> {
        self.private
            .as_ref()
            .ok_or(CryptoError::KeyNotConfigured(KeyHalf::Private))
    }

    /// Whether the public half is set.
    pub fn has_public(&self) -> bool {
        self.public.is_some()
    }

    /// Whether the private half is set.
    pub fn has_private(&self) -> bool {
        self.private.is_some()
    }

    /// Modulus size in bytes of whichever half is configured.
    pub fn modulus_len(&self) -> Option<usize> {
        self.public
            .as_ref()
            .map(|k| k.size())
            .or_else(|| self.private.as_ref().map(|k| k.size()))
    }

    /// Public half encoded as SPKI PEM.
    pub fn public_pem(&self) -> Result<String, CryptoError> {
        self.public()?
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    /// Private half encoded as PKCS#1 PEM.
    pub fn private_pem(&self) -> Result<String, CryptoError> {
        self.private()?
            .to_pkcs1_pem(LineEnding::LF)
            .map(|pem| pem.to_string())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public.is_some())
            .field("private", &self.private.is_some())
            .finish()
    }
}

/// Builder for [`KeyPair`].
#[derive(Default)]
pub struct KeyPairBuilder {
    inner: KeyPair,
}

impl KeyPairBuilder {
    /// Set the public half from an SPKI PEM (`BEGIN PUBLIC KEY`).
    pub fn with_public_pem(mut self, pem: &str) -> Result<Self, CryptoError> {
        self.inner.public = Some(parse_public_pem(pem)?);
        Ok(self)
    }

    /// Set the private half from a PKCS#1 PEM (`BEGIN RSA PRIVATE KEY`).
    pub fn with_private_pem(mut self, pem: &str) -> Result<Self, CryptoError> {
        self.inner.private = Some(parse_private_pem(pem)?);
        Ok(self)
    }

    /// Set the private half and derive the public half from it.
    pub fn with_private_pem_and_derived_public(mut self, pem: &str) -> Result<Self, CryptoError> {
        let private = parse_private_pem(pem)?;
        self.inner.public = Some(RsaPublicKey::from(&private));
        self.inner.private = Some(private);
        Ok(self)
    }

    /// Set the public half directly.
    pub fn with_public(mut self, key: RsaPublicKey) -> Self {
        self.inner.public = Some(key);
        self
    }

    /// Set the private half directly.
    pub fn with_private(mut self, key: RsaPrivateKey) -> Self {
        self.inner.private = Some(key);
        self
    }

    /// Finish the key pair.
    pub fn build(self) -> KeyPair {
        self.inner
    }
}

fn parse_public_pem(pem: &str) -> Result<RsaPublicKey, CryptoError> {
    RsaPublicKey::from_public_key_pem(pem.trim())
        .map_err(|e| CryptoError::InvalidKey(format!("failed to parse SPKI public key: {}", e)))
}

fn parse_private_pem(pem: &str) -> Result<RsaPrivateKey, CryptoError> {
    let key = RsaPrivateKey::from_pkcs1_pem(pem.trim()).map_err(|e| {
        CryptoError::InvalidKey(format!("failed to parse PKCS#1 private key: {}", e))
    })?;
    key.validate()
        .map_err(|e| CryptoError::InvalidKey(format!("private key failed validation: {}", e)))?;
    Ok(key)
}

/// Immutable, shareable snapshot of the process key pair.
#[derive(Clone, Debug)]
pub struct KeyStore {
    keys: Arc<KeyPair>,
}

impl KeyStore {
    /// Publish a key pair.
    pub fn new(keys: KeyPair) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }

    /// Store with no keys; every operation fails closed.
    pub fn empty() -> Self {
        Self::new(KeyPair::empty())
    }

    /// Load from PEM files. Either path may be omitted.
    pub fn from_pem_files(
        public: Option<&Path>,
        private: Option<&Path>,
    ) -> Result<Self, CryptoError> {
        let mut builder = KeyPair::builder();
        if let Some(path) = public {
            builder = builder.with_public_pem(&read_pem(path)?)?;
        }
        if let Some(path) = private {
            builder = builder.with_private_pem(&read_pem(path)?)?;
        }
        Ok(Self::new(builder.build()))
    }

    /// Borrow the published key pair.
    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }
}

impl From<KeyPair> for KeyStore {
    fn from(keys: KeyPair) -> Self {
        Self::new(keys)
    }
}

fn read_pem(path: &Path) -> Result<String, CryptoError> {
    std::fs::read_to_string(path)
        .map_err(|e| CryptoError::InvalidKey(format!("failed to read {}: {}", path.display(), e)))
}
