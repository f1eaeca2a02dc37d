//! Tracing/logging initialization.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process, writing to stderr so stdout stays
/// free for ledger output.
///
/// The filter defaults to `info` and is configurable via `RUST_LOG`.
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // A subscriber that is already installed stays in place.
    if json {
        builder.json().try_init().ok();
    } else {
        builder
            .with_ansi(std::io::stderr().is_terminal())
            .try_init()
            .ok();
    }
}
