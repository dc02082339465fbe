//! logging
//!
//! Diagnostic logging through `tracing`.
//!
//! Events are written to stderr. The filter comes from `FORGEHAND_LOG`
//! when set (same syntax as `RUST_LOG`), otherwise from the verbosity:
//! `--debug` shows this crate's debug events, the default shows warnings
//! (such as retried requests), and `--quiet` shows errors only.

use tracing_subscriber::EnvFilter;

use crate::ui::output::Verbosity;

/// Environment variable holding an explicit filter directive.
pub const LOG_ENV: &str = "FORGEHAND_LOG";

/// Filter directive used when `FORGEHAND_LOG` is not set.
pub fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Debug => "warn,forgehand=debug",
    }
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed (for example by a
/// test harness); the existing one is kept.
pub fn init(verbosity: Verbosity) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity == Verbosity::Debug)
        .try_init()
        .is_ok()
}
