//! Diagnostic logging setup shared by the binaries

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber
///
/// Everything goes to stderr so stdout and the report files stay clean.
/// `RUST_LOG` overrides the default `info` filter.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
