//! Spotify playlist library exporter.
//!
//! Walks the current user's playlists and every playlist's tracks through the
//! Spotify Web API, sequentially and paced to stay under the rate limit, and
//! writes the result as a single JSON document.
//!
//! # Modules
//!
//! - `api` - HTTP endpoint of the local OAuth callback server
//! - `cli` - Command-line command implementations
//! - `config` - Configuration from environment variables and `.env`
//! - `error` - Error type shared by the whole pipeline
//! - `export` - Export orchestration, normalization and JSON output
//! - `logging` - Diagnostic `tracing` setup
//! - `server` - Local HTTP server for OAuth callbacks
//! - `session` - Bearer credential and its lifecycle
//! - `spotify` - Spotify Web API client, pagination and authorization
//! - `types` - Spotify wire types
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod server;
pub mod session;
pub mod spotify;
pub mod types;
pub mod utils;

/// Status line with a blue `o` marker.
///
/// ```
/// info!("Found {} playlists", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Status line with a green check mark, for completed steps.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red error line and exits the process with status 1.
///
/// Only for failures the command cannot recover from; code after the call
/// does not run.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Yellow warning line for problems the user should notice, such as being
/// rate limited.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
