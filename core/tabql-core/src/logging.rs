//! Logging utilities for tabql
//!
//! Provides helpers for initializing tracing subscribers. Pipeline stages log
//! under the `tabql::exec` target, so `RUST_LOG=tabql::exec=debug` shows
//! per-stage row counts.

#[cfg(feature = "logging")]
use tracing_subscriber::{EnvFilter, fmt};

/// `RUST_LOG` wins over `level` when set.
#[cfg(feature = "logging")]
fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize logging with default settings
///
/// # Environment Variables
/// - `RUST_LOG` - Log level filter (default: "info")
///
/// # Example
/// ```rust
/// tabql_core::logging::init();
/// ```
#[cfg(feature = "logging")]
pub fn init() {
    init_with_level("info")
}

/// Initialize logging with a specific level
///
/// A second call is ignored, so embedding applications that install their
/// own subscriber keep it.
///
/// # Arguments
/// * `level` - Log level (trace, debug, info, warn, error)
///
/// # Example
/// ```rust
/// tabql_core::logging::init_with_level("debug");
/// ```
#[cfg(feature = "logging")]
pub fn init_with_level(level: &str) {
    let _ = fmt()
        .with_env_filter(default_filter(level))
        .with_target(true)
        .with_line_number(true)
        .try_init();
}

/// Initialize logging for tests
///
/// Pipeline stage events at debug, routed through the test writer.
#[cfg(feature = "logging")]
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("info,tabql::exec=debug,tabql_core=debug"))
        .with_test_writer()
        .try_init();
}

// Stub implementations when logging feature is disabled
#[cfg(not(feature = "logging"))]
pub fn init() {}

#[cfg(not(feature = "logging"))]
pub fn init_with_level(_level: &str) {}

#[cfg(not(feature = "logging"))]
pub fn init_test() {}
