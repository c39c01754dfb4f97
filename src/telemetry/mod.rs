//! Tracing setup.

use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber. `level` overrides `RUST_LOG`
/// (e.g. "info" or "vendas_engine=debug"); idempotent for tests.
pub fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
