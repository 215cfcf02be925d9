//! Tracing subscriber setup

use crate::config::Verbosity;
use tracing_subscriber::EnvFilter;

/// Filter used for a verbosity level; `RUST_LOG` wins when set.
#[must_use]
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()))
}

/// Install the global subscriber, logging to stderr.
///
/// A second call is a no-op.
pub fn init(verbosity: Verbosity, ansi: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(verbosity.is_verbose())
        .try_init();
}
