//! Log output setup for binaries built on Playspace.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a formatting subscriber filtered by `RUST_LOG`, falling back
/// to [`DEFAULT_FILTER`].
pub fn init() {
    init_with_default(DEFAULT_FILTER);
}

/// Like [`init`], with a custom fallback filter such as
/// `"info,playspace_lobby=debug"`.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_with_default(directives: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
