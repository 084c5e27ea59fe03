//! Tracing/logging setup shared by the storefront binaries.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize process-wide tracing with JSON output and `info` as the
/// default filter (`RUST_LOG` overrides it).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::Json, "info");
}

/// Initialize tracing with an explicit format and default filter.
pub fn init_with(format: LogFormat, default_filter: &str) {
    tracing::init(format, default_filter);
}
