//! Runtime settings for the `roster` binary.
//!
//! Every setting has a command-line flag and an environment variable; the
//! flag wins. Names and defaults live here so the CLI and tests agree.

use std::path::PathBuf;

pub const ENV_SNAPSHOT: &str = "ROSTER_SNAPSHOT";
pub const ENV_LOG: &str = "ROSTER_LOG";
pub const ENV_BIND: &str = "ROSTER_BIND";

pub const DEFAULT_SNAPSHOT: &str = "roster.json";
pub const DEFAULT_LOG_FILTER: &str = "warn";
pub const DEFAULT_BIND: &str = "127.0.0.1:7878";

/// Number of neighbors returned when the caller does not pick one.
pub const DEFAULT_K: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Snapshot file loaded at startup and rewritten after every add.
    pub snapshot: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or `roster=debug`.
    pub log_filter: String,
}
