//! Token issue/verify and gateway claim sealing.

use super::{load_private, load_public};
use anyhow::{Context, Result};
use nest_service_auth::{seal_gateway_claim, GatewayClaim, ServiceClaim, TokenCodec};
use std::path::Path;
use std::time::Duration;

/// Issue a service token with the public key at `public_key`.
pub fn issue(public_key: &Path, service: Option<&str>, ttl: Duration) -> Result<String> {
    let codec = TokenCodec::new(load_public(public_key)?, ttl);
    let token = match service {
        Some(name) => codec.issue_for(name),
        None => codec.issue(),
    };
    token.context("issuing token")
}

/// Validate `token` with the private key at `private_key`.
pub fn verify(private_key: &Path, ttl: Duration, token: &str) -> Result<ServiceClaim> {
    let codec = TokenCodec::new(load_private(private_key)?, ttl);
    codec.validate(token).context("token rejected")
}

/// Seal a gateway identity claim into the JSON header value.
pub fn seal_claim(public_key: &Path, user_id: u64, admin: bool) -> Result<String> {
    anyhow::ensure!(user_id != 0, "user id must be non-zero");
    let store = load_public(public_key)?;
    seal_gateway_claim(&store, &GatewayClaim::new(user_id, admin)).context("sealing claim")
}
