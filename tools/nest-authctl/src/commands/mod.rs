//! Subcommand implementations.

pub mod keys;
pub mod serve;
pub mod tokens;

use anyhow::{Context, Result};
use nest_crypto::{KeyPair, KeyStore};
use std::path::Path;

/// Load a store holding only the public half.
pub(crate) fn load_public(path: &Path) -> Result<KeyStore> {
    KeyStore::from_pem_files(Some(path), None)
        .with_context(|| format!("loading public key from {}", path.display()))
}

/// Load a store holding the private half, deriving the public half from it.
pub(crate) fn load_private(path: &Path) -> Result<KeyStore> {
    let pem = std::fs::read_to_string(path)
        .with_context(|| format!("reading private key from {}", path.display()))?;
    let keys = KeyPair::builder()
        .with_private_pem_and_derived_public(&pem)
        .with_context(|| format!("parsing private key from {}", path.display()))?
        .build();
    Ok(KeyStore::new(keys))
}
