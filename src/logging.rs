//! Diagnostic logging.
//!
//! User-facing status goes through the `info!`/`success!`/`warning!`/`error!`
//! macros and the progress bar. `tracing` output is for diagnosing requests
//! and pagination and goes to stderr, filtered by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "splex=warn";

pub fn init_logging(verbose: bool) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "splex=debug" } else { DEFAULT_FILTER })
    });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| e.to_string())
}
