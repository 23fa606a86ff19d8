//! Trust decision for a single inbound request.
//!
//! ```text
//! Start ─► GatewayCheck ──ok──────────────────────► Allowed(Gateway)
//!              │ absent / unusable (falls through)
//!              ▼
//!          TokenCheck ──absent──► Rejected(Unauthenticated)
//!              ├────────invalid──► Rejected(InvalidCredential | Expired | Misconfigured)
//!              └────────valid────► Allowed(ServiceToken)
//! ```
//!
//! The gateway path is an optimistic fast path. Anything wrong with it is
//! logged and counted, never rejected on its own.

use crate::domain::claims::{GatewayClaim, ServiceClaim};
use crate::domain::config::{ConfigError, TrustConfig};
use crate::domain::error::{AuthError, AuthResult, RejectReason};
use crate::middleware::metrics::TrustMetrics;
use crate::ports::{SystemTimeSource, TimeSource};
use crate::token::TokenCodec;
use axum::extract::Query;
use axum::http::{HeaderMap, HeaderName, Request, Uri};
use chrono::{TimeZone, Utc};
use nest_crypto::{CryptoError, HybridCodec, KeyStore};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// How a request earned trust.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustPath {
    /// Debug bypass; nothing was checked
    Bypass,
    /// Identity sealed by the upstream gateway
    Gateway(GatewayClaim),
    /// Direct service token
    ServiceToken(ServiceClaim),
}

/// Terminal state of the trust state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustDecision {
    Allowed(TrustPath),
    Rejected(RejectReason),
}

impl TrustDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, TrustDecision::Allowed(_))
    }

    /// Short label for spans and logs.
    pub fn label(&self) -> &'static str {
        match self {
            TrustDecision::Allowed(TrustPath::Bypass) => "bypass",
            TrustDecision::Allowed(TrustPath::Gateway(_)) => "gateway",
            TrustDecision::Allowed(TrustPath::ServiceToken(_)) => "service_token",
            TrustDecision::Rejected(reason) => reason.as_str(),
        }
    }
}

/// Why the gateway path did not grant trust.
#[derive(Debug)]
enum Fallthrough {
    Absent,
    Unusable {
        reason: &'static str,
        detail: String,
    },
}

impl Fallthrough {
    fn unusable(reason: &'static str, detail: impl ToString) -> Self {
        Fallthrough::Unusable {
            reason,
            detail: detail.to_string(),
        }
    }
}

/// Evaluates requests against the configured trust paths.
///
/// Everything here is fixed at construction. Cloning is cheap and every
/// clone shares the same key snapshot and counters.
#[derive(Clone)]
pub struct TrustGate {
    config: Arc<TrustConfig>,
    gateway_header: HeaderName,
    token_header: HeaderName,
    envelopes: HybridCodec,
    tokens: TokenCodec,
    clock: Arc<dyn TimeSource>,
    metrics: Arc<TrustMetrics>,
    bypass: bool,
}

impl TrustGate {
    /// Build a gate from validated config and an already loaded key store.
    pub fn new(config: &TrustConfig, store: KeyStore) -> Result<Self, ConfigError> {
        config.validate()?;

        let bypass = config.debug_bypass && cfg!(feature = "debug-bypass");
        if bypass {
            warn!("debug bypass is enabled: every request will be allowed without verification");
        } else if !store.keys().has_private() {
            warn!("no private key configured: every credential will be rejected");
        }

        Ok(Self {
            gateway_header: config.headers.gateway_header()?,
            token_header: config.headers.token_header()?,
            envelopes: HybridCodec::new(store.clone()),
            tokens: TokenCodec::new(store, config.token.ttl),
            clock: Arc::new(SystemTimeSource),
            metrics: Arc::new(TrustMetrics::new()),
            config: Arc::new(config.clone()),
            bypass,
        })
    }

    /// Validate config, load its keys, and build the gate.
    pub fn from_config(config: &TrustConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let store = config.load_key_store()?;
        Self::new(config, store)
    }

    /// Replace the clock used for token expiry and gateway age checks.
    pub fn with_time_source(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.tokens = self.tokens.with_time_source(Arc::clone(&clock));
        self.clock = clock;
        self
    }

    /// Share counters with another component.
    pub fn with_metrics(mut self, metrics: Arc<TrustMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &TrustConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<TrustMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Token codec over the same keys, for issuing outbound tokens.
    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    /// Header the token path reads.
    pub fn token_header(&self) -> &HeaderName {
        &self.token_header
    }

    /// Header the gateway path reads.
    pub fn gateway_header(&self) -> &HeaderName {
        &self.gateway_header
    }

    /// Decide whether `req` may proceed.
    pub fn evaluate<B>(&self, req: &Request<B>) -> TrustDecision {
        self.evaluate_parts(req.headers(), req.uri())
    }

    /// Decide from headers and URI alone.
    pub fn evaluate_parts(&self, headers: &HeaderMap, uri: &Uri) -> TrustDecision {
        let decision = self.decide(headers, uri);
        match &decision {
            TrustDecision::Allowed(path) => self.metrics.record_allowed(path),
            TrustDecision::Rejected(reason) => self.metrics.record_rejected(*reason),
        }
        decision
    }

    fn decide(&self, headers: &HeaderMap, uri: &Uri) -> TrustDecision {
        if self.bypass {
            return TrustDecision::Allowed(TrustPath::Bypass);
        }

        if self.config.gateway.enabled {
            match self.check_gateway(headers, uri) {
                Ok(claim) => {
                    debug!(subject = claim.subject_id, "trusted via gateway assertion");
                    return TrustDecision::Allowed(TrustPath::Gateway(claim));
                }
                Err(Fallthrough::Absent) => {}
                Err(Fallthrough::Unusable { reason, detail }) => {
                    debug!(
                        reason,
                        error = %detail,
                        "gateway assertion rejected, trying service token"
                    );
                    self.metrics.record_gateway_fallthrough();
                }
            }
        }

        match self.check_token(headers, uri) {
            Ok(claim) => {
                debug!(service = ?claim.service, "trusted via service token");
                TrustDecision::Allowed(TrustPath::ServiceToken(claim))
            }
            Err(err) => {
                let reason = RejectReason::from(&err);
                match reason {
                    RejectReason::Misconfigured => {
                        error!(error = %err, "cannot verify service tokens")
                    }
                    _ => warn!(reason = %reason, error = %err, "request rejected"),
                }
                TrustDecision::Rejected(reason)
            }
        }
    }

    fn check_gateway(&self, headers: &HeaderMap, uri: &Uri) -> Result<GatewayClaim, Fallthrough> {
        let gateway_query = &self.config.headers.gateway;
        let value = match self.credential(headers, uri, &self.gateway_header, gateway_query) {
            Ok(Some(value)) => value,
            Ok(None) => return Err(Fallthrough::Absent),
            Err(err) => return Err(Fallthrough::unusable("malformed header", err)),
        };

        let plaintext = self
            .envelopes
            .open_header_value(&value)
            .map_err(|err| match err {
                CryptoError::KeyNotConfigured(_) => {
                    Fallthrough::unusable("private key not configured", err)
                }
                _ => Fallthrough::unusable("envelope invalid", err),
            })?;

        let claim: GatewayClaim = serde_json::from_slice(&plaintext)
            .map_err(|err| Fallthrough::unusable("claim not parseable", err))?;

        if !claim.has_subject() {
            return Err(Fallthrough::unusable(
                "empty subject",
                format!("userId = {}", claim.subject_id),
            ));
        }

        if let Some(max_age) = self.config.gateway.max_age {
            let asserted_at = claim.asserted_at.ok_or_else(|| {
                Fallthrough::unusable("assertion time missing", "no timestamp with max_age set")
            })?;
            let now_millis = self.clock.now_millis();
            let now = Utc
                .timestamp_millis_opt(now_millis)
                .single()
                .ok_or_else(|| Fallthrough::unusable("clock out of range", now_millis))?;
            let age = now.signed_duration_since(asserted_at);

            let max_age = chrono::Duration::from_std(max_age)
                .map_err(|err| Fallthrough::unusable("max_age out of range", err))?;
            let skew = chrono::Duration::from_std(self.tokens.ttl())
                .map_err(|err| Fallthrough::unusable("ttl out of range", err))?;

            if age > max_age {
                return Err(Fallthrough::unusable(
                    "assertion too old",
                    format!(
                        "age {}ms > {}ms",
                        age.num_milliseconds(),
                        max_age.num_milliseconds()
                    ),
                ));
            }
            if -age > skew {
                return Err(Fallthrough::unusable(
                    "assertion from the future",
                    format!("asserted {}ms ahead", -age.num_milliseconds()),
                ));
            }
        }

        Ok(claim)
    }

    fn check_token(&self, headers: &HeaderMap, uri: &Uri) -> AuthResult<ServiceClaim> {
        let value = self
            .credential(headers, uri, &self.token_header, &self.config.headers.token)?
            .ok_or(AuthError::Unauthenticated)?;
        self.tokens.validate(&value)
    }

    /// Header first, then the query parameter of the same name. Empty
    /// values count as absent.
    fn credential(
        &self,
        headers: &HeaderMap,
        uri: &Uri,
        header: &HeaderName,
        query_name: &str,
    ) -> AuthResult<Option<String>> {
        if let Some(value) = headers.get(header) {
            let text = value
                .to_str()
                .map_err(|e| AuthError::MalformedHeader(format!("{}: {}", header, e)))?;
            if !text.is_empty() {
                return Ok(Some(text.to_string()));
            }
        }

        if !self.config.headers.query_fallback || uri.query().is_none() {
            return Ok(None);
        }

        let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri)
            .map_err(|e| AuthError::MalformedHeader(format!("query: {}", e)))?;
        Ok(params.get(query_name).filter(|v| !v.is_empty()).cloned())
    }
}

impl std::fmt::Debug for TrustGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustGate")
            .field("gateway_header", &self.gateway_header)
            .field("token_header", &self.token_header)
            .field("bypass", &self.bypass)
            .finish_non_exhaustive()
    }
}

/// Seal a gateway claim into a header value. Needs only the public key.
pub fn seal_gateway_claim(store: &KeyStore, claim: &GatewayClaim) -> AuthResult<String> {
    let json = serde_json::to_vec(claim)
        .map_err(|e| AuthError::Issuance(format!("claim serialization failed: {}", e)))?;
    let envelope = HybridCodec::new(store.clone())
        .seal(&json)
        .map_err(|err| match err {
            CryptoError::KeyNotConfigured(half) => AuthError::KeyNotConfigured(half),
            other => AuthError::Issuance(other.to_string()),
        })?;
    envelope
        .to_header_value()
        .map_err(|e| AuthError::Issuance(e.to_string()))
}
