//! Short-lived service tokens for direct service-to-service calls.
//!
//! A token is `base64(RSA-PKCS1v15(json(ServiceClaim)))`. The claim is small
//! enough to encrypt directly, so no envelope is involved.
//!
//! Validation order: base64 → decrypt → JSON → expiry. The first three
//! failures are all reported to the caller as the same 401; the distinct
//! [`AuthError`] variants exist for logs only.

use crate::domain::claims::ServiceClaim;
use crate::domain::error::{AuthError, AuthResult};
use crate::ports::{SystemTimeSource, TimeSource};
use axum::http::{HeaderName, HeaderValue};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use nest_crypto::{AsymmetricCodec, CryptoError, KeyStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Issues and validates service tokens.
#[derive(Clone)]
pub struct TokenCodec {
    codec: AsymmetricCodec,
    ttl: Duration,
    clock: Arc<dyn TimeSource>,
}

impl TokenCodec {
    /// Codec over `store` using the system clock.
    pub fn new(store: KeyStore, ttl: Duration) -> Self {
        Self {
            codec: AsymmetricCodec::new(store),
            ttl,
            clock: Arc::new(SystemTimeSource),
        }
    }

    /// Replace the clock.
    pub fn with_time_source(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue an anonymous token expiring `ttl` from now.
    pub fn issue(&self) -> AuthResult<String> {
        self.issue_claim(ServiceClaim::new(self.expiration_from_now()))
    }

    /// Issue a token naming the calling service.
    pub fn issue_for(&self, service: &str) -> AuthResult<String> {
        if service.is_empty() {
            return Err(AuthError::Issuance("service name is empty".into()));
        }
        self.issue_claim(ServiceClaim::new(self.expiration_from_now()).with_service(service))
    }

    /// Issue a token and pair it with `header` for an outbound request.
    pub fn header(&self, header: &HeaderName) -> AuthResult<(HeaderName, HeaderValue)> {
        let token = self.issue()?;
        let value = HeaderValue::from_str(&token)
            .map_err(|e| AuthError::Issuance(format!("token is not a valid header value: {}", e)))?;
        Ok((header.clone(), value))
    }

    fn expiration_from_now(&self) -> i64 {
        let ttl = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        self.clock.now_millis().saturating_add(ttl)
    }

    fn issue_claim(&self, claim: ServiceClaim) -> AuthResult<String> {
        let json = serde_json::to_vec(&claim)
            .map_err(|e| AuthError::Issuance(format!("claim serialization failed: {}", e)))?;

        let encrypted = self.codec.encrypt(&json).map_err(|err| match err {
            CryptoError::KeyNotConfigured(half) => {
                error!(
                    key = %half,
                    "cannot issue service tokens: public key is not configured"
                );
                AuthError::KeyNotConfigured(half)
            }
            other => AuthError::Issuance(other.to_string()),
        })?;

        Ok(STANDARD.encode(encrypted))
    }

    /// Validate a token against the current time.
    pub fn validate(&self, value: &str) -> AuthResult<ServiceClaim> {
        self.validate_at(value, self.clock.now_millis())
    }

    /// Validate a token against an explicit time.
    pub fn validate_at(&self, value: &str, now_millis: i64) -> AuthResult<ServiceClaim> {
        let encrypted = STANDARD
            .decode(value.trim())
            .map_err(|e| AuthError::MalformedToken(format!("base64: {}", e)))?;

        let json = self
            .codec
            .decrypt(&encrypted)
            .map_err(AuthError::from_token_decrypt)?;

        let claim: ServiceClaim = serde_json::from_slice(&json)
            .map_err(|e| AuthError::MalformedToken(format!("claim: {}", e)))?;

        if matches!(claim.service.as_deref(), Some("")) {
            return Err(AuthError::MalformedToken("empty service name".into()));
        }

        if claim.is_expired_at(now_millis) {
            debug!(
                expiration = claim.expiration,
                now = now_millis,
                "service token expired"
            );
            return Err(AuthError::Expired {
                expired_at: claim.expiration,
                now: now_millis,
            });
        }

        Ok(claim)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
