//! Claim payloads carried by service tokens and gateway envelopes.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Payload of a service token.
///
/// Wire form: `{ "expiration": <ms since epoch> }`, plus `"service"` when the
/// issuer named itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceClaim {
    /// Expiration, milliseconds since the Unix epoch
    pub expiration: i64,
    /// Issuing service label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl ServiceClaim {
    /// Claim expiring at `expiration` ms.
    pub fn new(expiration: i64) -> Self {
        Self {
            expiration,
            service: None,
        }
    }

    /// Attach an issuer label.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Strictly after the expiration counts as expired.
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        now_millis > self.expiration
    }

    /// Expiration as a UTC timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.expiration).single()
    }
}

/// Identity asserted by the upstream gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayClaim {
    /// Authenticated user; zero means no identity
    #[serde(rename = "userId", default)]
    pub subject_id: u64,
    /// Whether the user holds admin rights
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
    /// When the gateway made the assertion
    #[serde(rename = "timestamp", default, skip_serializing_if = "Option::is_none")]
    pub asserted_at: Option<DateTime<Utc>>,
}

impl GatewayClaim {
    /// Fresh assertion for `subject_id` stamped now.
    pub fn new(subject_id: u64, is_admin: bool) -> Self {
        Self {
            subject_id,
            is_admin,
            asserted_at: Some(Utc::now()),
        }
    }

    /// An empty subject carries no trust.
    pub fn has_subject(&self) -> bool {
        self.subject_id != 0
    }
}
