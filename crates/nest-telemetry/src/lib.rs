//! # Nest Telemetry
//!
//! Logging setup shared by nest services and tools.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nest_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&TelemetryConfig::from_env())?;
//!     // Trust decisions, key loading and server events now go to stdout
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `NEST_SERVICE_NAME` | `nest-service` | Service name in logs |
//! | `NEST_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `NEST_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `NEST_JSON_LOGS` | `false` (`true` in containers) | JSON lines output |

#![allow(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
