//! Tracing bootstrap.

use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber.
///
/// The filter comes from `RUST_LOG`, falling back to `info`. Repeated
/// calls are no-ops so embedding callers and tests can both invoke it
/// unconditionally.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
