//! Logging bootstrap.
//!
//! Logs go to stderr so command output on stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `filter` uses `EnvFilter` syntax (`warn`, `roster=debug,actix_web=info`).
/// Returns an error for an unparsable filter or when a subscriber is already
/// installed.
pub fn init(filter: &str) -> Result<(), String> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter `{filter}`: {err}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| format!("failed to start logger: {err}"))
}
