//! Core wiring for the Studia course service: configuration and logging.

pub mod config;

pub use config::{CacheConfig, Config, ConfigValidationError, ValidationResult};

use anyhow::Result;

/// Initialize tracing/logging for the process.
///
/// Call once at startup; respects `RUST_LOG`, defaults to `info`.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Studia core initialized");
    Ok(())
}
