//! Logging setup
//!
//! Folio logs through `tracing`. Hosts that already install a subscriber
//! need nothing from here; demos and tests call [`init_logging`].

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG` (default `info`)
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_logging() -> bool {
    init_logging_with("info")
}

/// Like [`init_logging`] with an explicit fallback directive
///
/// Returns `true` if this call installed the subscriber.
pub fn init_logging_with(default_directive: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
