//! Logging initialization built on `tracing`.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber for the server binary.
///
/// `RUST_LOG` wins when set; otherwise verbosity flags pick the level
/// (`-q` → error, default → info, `-v` → debug, `-vv` → trace).
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool) -> anyhow::Result<()> {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to set subscriber: {e}"))
}

/// Initialize logging for tests. Safe to call repeatedly.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
