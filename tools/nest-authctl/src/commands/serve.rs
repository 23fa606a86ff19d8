//! Run a trust-protected internal service.

use anyhow::{Context, Result};
use nest_service_auth::{InternalService, TrustConfig};
use std::net::SocketAddr;
use std::path::Path;

/// Load config (file, then env overrides) for `serve`.
pub fn load_config(path: Option<&Path>) -> Result<TrustConfig> {
    let config = match path {
        Some(path) => TrustConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => TrustConfig::default(),
    };
    let config = config
        .with_env_overrides()
        .context("applying environment overrides")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Serve until Ctrl-C.
pub async fn serve(config_path: Option<&Path>, listen: SocketAddr) -> Result<()> {
    let config = load_config(config_path)?;
    let service = InternalService::from_config(&config, listen)?;

    service
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await?;
    Ok(())
}
