//! Shared logging bootstrap for consistent tracing across the harness

use tracing_subscriber::EnvFilter;

/// Initialize tracing with the default `info` level.
pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Initialize tracing with an explicit default level.
///
/// `RUST_LOG` wins over the supplied level when set. Safe to call more than
/// once; later calls are no-ops.
pub fn init_tracing_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
