//! Tracing setup for binaries, tests and benches.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the application. [`init_tracing`] is a shortcut for binaries and tests.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` (e.g. `"ai_toolbox=debug"`) when the variable is unset
/// or invalid.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
