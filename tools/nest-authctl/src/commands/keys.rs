//! Key pair generation.

use anyhow::{Context, Result};
use nest_crypto::KeyPair;
use std::fs;
use std::path::{Path, PathBuf};

/// Paths written by [`keygen`].
#[derive(Debug)]
pub struct GeneratedKeys {
    pub public: PathBuf,
    pub private: PathBuf,
}

/// Generate a key pair and write `public.pem` (SPKI) and `private.pem`
/// (PKCS#1) into `out_dir`. Refuses to overwrite existing files.
pub fn keygen(bits: usize, out_dir: &Path) -> Result<GeneratedKeys> {
    let public = out_dir.join("public.pem");
    let private = out_dir.join("private.pem");
    for path in [&public, &private] {
        anyhow::ensure!(!path.exists(), "{} already exists", path.display());
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let keys = KeyPair::generate(bits).context("generating key pair")?;
    fs::write(&public, keys.public_pem()?)
        .with_context(|| format!("writing {}", public.display()))?;
    write_private(&private, &keys.private_pem()?)?;

    tracing::info!(
        bits,
        public = %public.display(),
        private = %private.display(),
        "key pair written"
    );
    Ok(GeneratedKeys { public, private })
}

#[cfg(unix)]
fn write_private(path: &Path, pem: &str) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
        .with_context(|| format!("creating {}", path.display()))?;
    file.write_all(pem.as_bytes())
        .with_context(|| format!("writing {}", path.display()))
}

#[cfg(not(unix))]
fn write_private(path: &Path, pem: &str) -> Result<()> {
    fs::write(path, pem).with_context(|| format!("writing {}", path.display()))
}
