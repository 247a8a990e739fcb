//! Tracing/logging initialization.
//!
//! Structured JSON output so balance corrections, orphan reports, and
//! migration rewrites land in log search with their fields intact.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// Filter defaults to `info`, overridable via `RUST_LOG`. Safe to call
/// multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
