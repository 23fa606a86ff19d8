//! Domain types for service trust: claims, configuration and errors.

pub mod claims;
pub mod config;
pub mod error;

// Re-exports for convenience
pub use claims::{GatewayClaim, ServiceClaim};
pub use config::{ConfigError, TrustConfig};
pub use error::{AuthError, AuthResult, RejectReason};
