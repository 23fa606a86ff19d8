//! Middleware for protected internal routes.
//!
//! Layer order: Request → Tracing → Trust → Handler

pub mod metrics;
pub mod tracing;
pub mod trust;

pub use self::metrics::{TrustMetrics, TrustMetricsSnapshot};
pub use self::tracing::TracingLayer;
pub use self::trust::{unauthorized_response, TrustLayer, TrustService};
