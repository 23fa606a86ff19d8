//! Trust decision counters.
//!
//! Plain atomics; exported as JSON, and as Prometheus text with the
//! `metrics` feature.

use crate::domain::error::RejectReason;
use crate::gate::TrustPath;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for every decision the gate makes.
#[derive(Debug, Default)]
pub struct TrustMetrics {
    // Allowed
    pub allowed_gateway: AtomicU64,
    pub allowed_token: AtomicU64,
    pub allowed_bypass: AtomicU64,

    // Rejected
    pub rejected_unauthenticated: AtomicU64,
    pub rejected_invalid: AtomicU64,
    pub rejected_expired: AtomicU64,
    pub rejected_misconfigured: AtomicU64,

    /// Gateway header present but unusable; request went on to the token path
    pub gateway_fallthrough: AtomicU64,
}

/// Point-in-time copy of [`TrustMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrustMetricsSnapshot {
    pub allowed_gateway: u64,
    pub allowed_token: u64,
    pub allowed_bypass: u64,
    pub rejected_unauthenticated: u64,
    pub rejected_invalid: u64,
    pub rejected_expired: u64,
    pub rejected_misconfigured: u64,
    pub gateway_fallthrough: u64,
}

impl TrustMetricsSnapshot {
    /// All allowed requests.
    pub fn allowed_total(&self) -> u64 {
        self.allowed_gateway + self.allowed_token + self.allowed_bypass
    }

    /// All rejected requests.
    pub fn rejected_total(&self) -> u64 {
        self.rejected_unauthenticated
            + self.rejected_invalid
            + self.rejected_expired
            + self.rejected_misconfigured
    }
}

impl TrustMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an allowed request
    pub fn record_allowed(&self, path: &TrustPath) {
        let counter = match path {
            TrustPath::Gateway(_) => &self.allowed_gateway,
            TrustPath::ServiceToken(_) => &self.allowed_token,
            TrustPath::Bypass => &self.allowed_bypass,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected request
    pub fn record_rejected(&self, reason: RejectReason) {
        let counter = match reason {
            RejectReason::Unauthenticated => &self.rejected_unauthenticated,
            RejectReason::InvalidCredential => &self.rejected_invalid,
            RejectReason::Expired => &self.rejected_expired,
            RejectReason::Misconfigured => &self.rejected_misconfigured,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a gateway assertion that did not hold
    pub fn record_gateway_fallthrough(&self) {
        self.gateway_fallthrough.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TrustMetricsSnapshot {
        TrustMetricsSnapshot {
            allowed_gateway: self.allowed_gateway.load(Ordering::Relaxed),
            allowed_token: self.allowed_token.load(Ordering::Relaxed),
            allowed_bypass: self.allowed_bypass.load(Ordering::Relaxed),
            rejected_unauthenticated: self.rejected_unauthenticated.load(Ordering::Relaxed),
            rejected_invalid: self.rejected_invalid.load(Ordering::Relaxed),
            rejected_expired: self.rejected_expired.load(Ordering::Relaxed),
            rejected_misconfigured: self.rejected_misconfigured.load(Ordering::Relaxed),
            gateway_fallthrough: self.gateway_fallthrough.load(Ordering::Relaxed),
        }
    }

    /// Export metrics in Prometheus format
    #[cfg(feature = "metrics")]
    pub fn to_prometheus(&self) -> String {
        let s = self.snapshot();
        let mut output = String::new();

        output.push_str(
            "# HELP nest_trust_allowed_total Requests allowed by the trust gate\n\
             # TYPE nest_trust_allowed_total counter\n",
        );
        for (path, value) in [
            ("gateway", s.allowed_gateway),
            ("service_token", s.allowed_token),
            ("bypass", s.allowed_bypass),
        ] {
            output.push_str(&format!(
                "nest_trust_allowed_total{{path=\"{}\"}} {}\n",
                path, value
            ));
        }

        output.push_str(
            "# HELP nest_trust_rejected_total Requests rejected by the trust gate\n\
             # TYPE nest_trust_rejected_total counter\n",
        );
        for (reason, value) in [
            (RejectReason::Unauthenticated, s.rejected_unauthenticated),
            (RejectReason::InvalidCredential, s.rejected_invalid),
            (RejectReason::Expired, s.rejected_expired),
            (RejectReason::Misconfigured, s.rejected_misconfigured),
        ] {
            output.push_str(&format!(
                "nest_trust_rejected_total{{reason=\"{}\"}} {}\n",
                reason.as_str(),
                value
            ));
        }

        output.push_str(&format!(
            "# HELP nest_trust_gateway_fallthrough_total Gateway assertions that fell through\n\
             # TYPE nest_trust_gateway_fallthrough_total counter\n\
             nest_trust_gateway_fallthrough_total {}\n",
            s.gateway_fallthrough
        ));

        output
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        let s = self.snapshot();
        serde_json::json!({
            "allowed": {
                "gateway": s.allowed_gateway,
                "service_token": s.allowed_token,
                "bypass": s.allowed_bypass,
                "total": s.allowed_total(),
            },
            "rejected": {
                "unauthenticated": s.rejected_unauthenticated,
                "invalid_credential": s.rejected_invalid,
                "expired": s.rejected_expired,
                "misconfigured": s.rejected_misconfigured,
                "total": s.rejected_total(),
            },
            "gateway_fallthrough": s.gateway_fallthrough,
        })
    }
}
