//! # Hybrid Envelope
//!
//! A fresh AES-256-GCM key per envelope encrypts the payload; the RSA public
//! key wraps that key. The three outputs travel together as
//! `{ "data", "key", "nonce" }`, each field standard base64, serialized as
//! JSON for header embedding.
//!
//! `open` reports every failure after key lookup as `EnvelopeInvalid`.

use crate::symmetric::{self, SecretKey};
use crate::{AsymmetricCodec, CryptoError, KeyStore};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

/// Sealed payload in raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// AEAD ciphertext with appended tag
    pub ciphertext: Vec<u8>,
    /// Symmetric key encrypted under the RSA public key
    pub wrapped_key: Vec<u8>,
    /// AEAD nonce
    pub nonce: Vec<u8>,
}

/// Transport form of an [`Envelope`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEnvelope {
    /// base64 ciphertext
    pub data: String,
    /// base64 wrapped key
    pub key: String,
    /// base64 nonce
    pub nonce: String,
    /// Free-form context for humans. Never consulted when opening.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    /// Encode each field as base64.
    pub fn to_wire(&self) -> WireEnvelope {
        WireEnvelope {
            data: STANDARD.encode(&self.ciphertext),
            key: STANDARD.encode(&self.wrapped_key),
            nonce: STANDARD.encode(&self.nonce),
            message: None,
        }
    }

    /// Decode a wire envelope. Fails on bad base64.
    pub fn from_wire(wire: &WireEnvelope) -> Result<Self, CryptoError> {
        let decode = |field: &str, value: &str| {
            STANDARD
                .decode(value.trim())
                .map_err(|e| CryptoError::Encoding(format!("{}: {}", field, e)))
        };
        Ok(Self {
            ciphertext: decode("data", &wire.data)?,
            wrapped_key: decode("key", &wire.key)?,
            nonce: decode("nonce", &wire.nonce)?,
        })
    }

    /// JSON text suitable for a header value.
    pub fn to_header_value(&self) -> Result<String, CryptoError> {
        serde_json::to_string(&self.to_wire()).map_err(|e| CryptoError::Encoding(e.to_string()))
    }

    /// Parse the JSON text carried in a header value.
    pub fn from_header_value(value: &str) -> Result<Self, CryptoError> {
        let wire: WireEnvelope =
            serde_json::from_str(value).map_err(|e| CryptoError::Encoding(e.to_string()))?;
        Self::from_wire(&wire)
    }
}

/// Seals and opens [`Envelope`]s.
#[derive(Clone, Debug)]
pub struct HybridCodec {
    asymmetric: AsymmetricCodec,
}

impl HybridCodec {
    /// Create over a key store.
    pub fn new(store: KeyStore) -> Self {
        Self {
            asymmetric: AsymmetricCodec::new(store),
        }
    }

    /// Create over an existing asymmetric codec.
    pub fn with_codec(asymmetric: AsymmetricCodec) -> Self {
        Self { asymmetric }
    }

    /// Encrypt `message` under a one-time key and wrap the key.
    ///
    /// # Errors
    ///
    /// `KeyNotConfigured` without a public key.
    pub fn seal(&self, message: &[u8]) -> Result<Envelope, CryptoError> {
        let key = SecretKey::generate();
        let (ciphertext, nonce) = symmetric::encrypt(message, key.as_bytes())?;
        let wrapped_key = self.asymmetric.encrypt(key.as_bytes())?;

        Ok(Envelope {
            ciphertext,
            wrapped_key,
            nonce: nonce.as_bytes().to_vec(),
        })
    }

    /// Unwrap the key and decrypt the payload.
    ///
    /// # Errors
    ///
    /// `KeyNotConfigured` without a private key; any other failure is
    /// `EnvelopeInvalid`.
    pub fn open(&self, envelope: &Envelope) -> Result<Vec<u8>, CryptoError> {
        let key = match self.asymmetric.decrypt(&envelope.wrapped_key) {
            Ok(key) => Zeroizing::new(key),
            Err(err @ CryptoError::KeyNotConfigured(_)) => return Err(err),
            Err(err) => {
                debug!(error = %err, "envelope key unwrap failed");
                return Err(CryptoError::EnvelopeInvalid);
            }
        };

        symmetric::decrypt(&envelope.ciphertext, &key, &envelope.nonce).map_err(|err| {
            debug!(error = %err, "envelope payload decrypt failed");
            CryptoError::EnvelopeInvalid
        })
    }

    /// Parse and open a header value in one step.
    pub fn open_header_value(&self, value: &str) -> Result<Vec<u8>, CryptoError> {
        let envelope = Envelope::from_header_value(value)?;
        self.open(&envelope)
    }
}
