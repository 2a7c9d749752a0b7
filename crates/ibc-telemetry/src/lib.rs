//! # IBC Telemetry
//!
//! Structured logging bootstrap for hosts embedding `ibc-core`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ibc_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//!     // Events from ibc-core are now written to stdout
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `IBC_SERVICE_NAME` | `ibc` | Service name |
//! | `IBC_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `IBC_JSON_LOGS` | `false` | JSON lines output |
//! | `IBC_CONSOLE_OUTPUT` | `true` | Write to stdout |

#![warn(missing_docs)]

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;

#[doc(hidden)]
pub use tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Log filter could not be parsed.
    #[error("Invalid log filter {filter:?}: {reason}")]
    InvalidFilter {
        /// Raw filter string
        filter: String,
        /// Parser message
        reason: String,
    },

    /// A global subscriber is already installed.
    #[error("Telemetry already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Install the global subscriber.
///
/// Returns a guard that should be held for the lifetime of the application.
/// A second call fails with `TelemetryError::AlreadyInitialized`.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
#[derive(Debug)]
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    /// Service name the subscriber was installed for.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}

/// Span carrying an entity id, for grouping events of one entity.
///
/// ```rust,ignore
/// let _span = ibc_telemetry::entity_span!("packet_worker", packet_id = %packet.id()).entered();
/// ```
#[macro_export]
macro_rules! entity_span {
    ($name:expr, $($field:tt)*) => {
        $crate::tracing::info_span!($name, $($field)*)
    };
}
