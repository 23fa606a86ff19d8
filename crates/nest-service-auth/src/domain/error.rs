//! Trust-verification error types.
//!
//! [`AuthError`] carries full detail for logs. [`RejectReason`] is the coarse
//! classification used for counters; neither reaches the HTTP caller, which
//! only ever sees a generic 401.

use nest_crypto::{CryptoError, KeyHalf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from token issuance, token validation and credential parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// A key half required by the operation is missing
    #[error("{0} key is not configured")]
    KeyNotConfigured(KeyHalf),

    /// Header or query value is not usable text
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// Token has bad encoding or shape
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Token did not decrypt under our private key
    #[error("invalid token")]
    InvalidToken,

    /// Gateway envelope could not be opened
    #[error("invalid envelope")]
    EnvelopeInvalid,

    /// Token decrypted and parsed but its expiration has passed
    #[error("token expired at {expired_at} (now {now})")]
    Expired {
        /// Claim expiration, ms since epoch
        expired_at: i64,
        /// Validation time, ms since epoch
        now: i64,
    },

    /// No credential was presented at all
    #[error("no credential presented")]
    Unauthenticated,

    /// Token could not be produced
    #[error("token issuance failed: {0}")]
    Issuance(String),
}

impl AuthError {
    /// Map a crypto failure met while validating a token.
    pub(crate) fn from_token_decrypt(err: CryptoError) -> Self {
        match err {
            CryptoError::KeyNotConfigured(half) => AuthError::KeyNotConfigured(half),
            _ => AuthError::InvalidToken,
        }
    }
}

/// Coarse classification of a rejected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// No gateway assertion and no service token
    Unauthenticated,
    /// Token was malformed, undecryptable or otherwise invalid
    InvalidCredential,
    /// Token was valid but stale
    Expired,
    /// The service cannot verify anything (missing private key)
    Misconfigured,
}

impl RejectReason {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Unauthenticated => "unauthenticated",
            RejectReason::InvalidCredential => "invalid_credential",
            RejectReason::Expired => "expired",
            RejectReason::Misconfigured => "misconfigured",
        }
    }
}

impl From<&AuthError> for RejectReason {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => RejectReason::Unauthenticated,
            AuthError::Expired { .. } => RejectReason::Expired,
            AuthError::KeyNotConfigured(_) | AuthError::Issuance(_) => RejectReason::Misconfigured,
            AuthError::MalformedHeader(_)
            | AuthError::MalformedToken(_)
            | AuthError::InvalidToken
            | AuthError::EnvelopeInvalid => RejectReason::InvalidCredential,
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result alias for this crate.
pub type AuthResult<T> = Result<T, AuthError>;
