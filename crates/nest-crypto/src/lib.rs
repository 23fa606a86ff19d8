//! # Nest Crypto - Service Trust Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `symmetric` | AES-256-GCM | Bulk payload encryption |
//! | `asymmetric` | RSA PKCS#1 v1.5 | Small claims, key wrapping |
//! | `envelope` | RSA + AES-256-GCM | Gateway-asserted claims of any size |
//! | `keys` | SPKI / PKCS#1 PEM | Immutable key snapshot |
//!
//! ## Security Properties
//!
//! - **Fail closed**: an unset key half is an error, never a default key
//! - **Uniform failures**: decrypt errors do not reveal which check failed
//! - **One-time keys**: every envelope carries its own symmetric key and nonce

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod asymmetric;
pub mod envelope;
pub mod errors;
pub mod keys;
pub mod symmetric;

// Re-exports
pub use asymmetric::AsymmetricCodec;
pub use envelope::{Envelope, HybridCodec, WireEnvelope};
pub use errors::{CryptoError, KeyHalf};
pub use keys::{KeyPair, KeyPairBuilder, KeyStore};
pub use symmetric::{decrypt, encrypt, Nonce, SecretKey};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
