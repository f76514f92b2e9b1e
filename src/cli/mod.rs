//! # CLI commands
//!
//! - [`export`] - authorize, walk the playlist library and write
//!   `spotify-playlists-YYYY-MM-DD.json`
//!
//! ```bash
//! splex export                              # interactive authorization
//! splex export --token "$TOKEN" --pretty    # pre-acquired bearer token
//! splex export --callback-url 'http://localhost/#access_token=...'
//! splex export --keep-going --delay-ms 250 --output-dir ~/backups
//! ```
//!
//! Command implementations report to the user through the crate's status
//! macros and exit through `error!` on failures they cannot recover from.

mod export;

pub use export::ExportOptions;
pub use export::export;
