// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! Nest service auth - trust verification for internal HTTP services.
//!
//! Decides, per inbound request, whether the caller is trusted.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     nest-service-auth                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │   Request → TracingLayer → TrustLayer ──allowed──► Handler   │
//! │                              │                               │
//! │                              └──rejected──► 401              │
//! │                                                              │
//! │   TrustGate                                                  │
//! │     1. gateway header  → HybridCodec.open → GatewayClaim     │
//! │     2. service token   → TokenCodec.validate → ServiceClaim  │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//!                      nest-crypto (KeyStore)
//! ```
//!
//! # Trust Paths
//!
//! - **Gateway**: the edge gateway seals `{userId, isAdmin, timestamp}` into a
//!   hybrid envelope. Checked first; any problem falls through.
//! - **Service token**: an RSA-encrypted `{expiration}` claim with a short
//!   TTL (10s by default). Missing → `Unauthenticated`.
//! - **Bypass**: only in builds with the `debug-bypass` feature.
//!
//! # Usage
//!
//! ```ignore
//! use nest_service_auth::{protect, TrustConfig, TrustGate};
//!
//! let config = TrustConfig::from_file(path)?.with_env_overrides()?;
//! let gate = TrustGate::from_config(&config)?;
//! let app = protect(routes, gate);
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod gate;
pub mod middleware;
pub mod ports;
pub mod service;
pub mod token;

// Re-exports for public API
pub use domain::claims::{GatewayClaim, ServiceClaim};
pub use domain::config::{ConfigError, TrustConfig, DEFAULT_TOKEN_TTL};
pub use domain::error::{AuthError, AuthResult, RejectReason};
pub use gate::{seal_gateway_claim, TrustDecision, TrustGate, TrustPath};
pub use middleware::{TrustLayer, TrustMetrics, TrustMetricsSnapshot};
pub use ports::{ManualTimeSource, SystemTimeSource, TimeSource};
pub use service::{protect, InternalService, ServiceError};
pub use token::TokenCodec;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
