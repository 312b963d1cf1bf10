//! Diagnostic logging setup.
//!
//! Diagnostics go to stderr through `tracing`, filtered by the
//! `CREDVAULT_LOG` environment variable (same syntax as `RUST_LOG`).
//! Without it, only warnings are shown, or debug output with `--verbose`.
//! Vault code logs ids, categories and counts, never credential values.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "CREDVAULT_LOG";

/// Build the filter: `CREDVAULT_LOG` wins, otherwise the verbosity flag.
pub fn filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { "credvault=debug" } else { "warn" };
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the global subscriber.  Calling it twice is harmless.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
