//! Configuration management for splex.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. It provides a single place for the
//! Spotify API endpoints, the OAuth application settings, the local callback
//! server address and the knobs of the export run itself (pacing, page bound,
//! output directory).
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Built-in defaults (everything except the client id has one)

use std::{env, path::PathBuf, time::Duration};

use crate::{
    error::{ExportError, Result},
    spotify::pagination::DEFAULT_MAX_PAGES,
};

/// Default pause between two playlists' track walks, in milliseconds.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory if it doesn't exist and loads variables from the
/// `.env` file located in the platform-specific local data directory under
/// `splex/.env`. Variables already present in the environment are never
/// overridden.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/splex/.env`
/// - macOS: `~/Library/Application Support/splex/.env`
/// - Windows: `%LOCALAPPDATA%/splex/.env`
///
/// # Returns
///
/// Returns `Ok(())` when the file was loaded or does not exist.
///
/// # Errors
///
/// This function will return an error if:
/// - The parent directory cannot be created (`ExportError::Io`)
/// - The `.env` file exists but cannot be read or parsed (`ExportError::Config`)
///
/// # Example
///
/// ```
/// use splex::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Result<()> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ExportError::Config(format!(
            "cannot read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Returns the path of the `.env` file [`load_env`] reads.
///
/// Falls back to `./splex/.env` when the platform has no local data
/// directory.
pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("splex/.env");
    path
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparsable setting");
            default
        }),
        Err(_) => default,
    }
}

/// Returns the server address for the local OAuth callback server.
///
/// Reads `SERVER_ADDRESS`, the address and port the callback server binds to
/// during the interactive authorization flow. It has to agree with the host
/// and port of [`spotify_redirect_uri`].
///
/// # Default
///
/// `127.0.0.1:8888`
///
/// # Example
///
/// ```
/// let addr = server_addr(); // e.g., "127.0.0.1:8888"
/// ```
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", "127.0.0.1:8888")
}

/// Returns the Spotify API client ID for authentication.
///
/// Reads `SPOTIFY_API_AUTH_CLIENT_ID`, the client ID obtained when
/// registering the application on Spotify's developer platform. Only the
/// interactive authorization flow needs it; exports run with a provided token
/// never call this.
///
/// # Errors
///
/// Returns `ExportError::Config` if the variable is unset or blank.
///
/// # Example
///
/// ```
/// let client_id = spotify_client_id()?; // e.g., "abc123..."
/// ```
pub fn spotify_client_id() -> Result<String> {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            ExportError::Config(format!(
                "SPOTIFY_API_AUTH_CLIENT_ID must be set (environment or {})",
                env_path().display()
            ))
        })
}

/// Returns the OAuth redirect URI for the authorization flow.
///
/// Reads `SPOTIFY_API_REDIRECT_URI`. Spotify redirects the browser here after
/// the user grants access, so the value must exactly match a redirect URI
/// registered for the application and point at the local callback server.
///
/// # Default
///
/// `http://127.0.0.1:8888/callback`
///
/// # Example
///
/// ```
/// let redirect = spotify_redirect_uri(); // e.g., "http://127.0.0.1:8888/callback"
/// ```
pub fn spotify_redirect_uri() -> String {
    var_or("SPOTIFY_API_REDIRECT_URI", "http://127.0.0.1:8888/callback")
}

/// Returns the OAuth scopes requested during authorization.
///
/// Reads `SPOTIFY_API_AUTH_SCOPE`, a space-separated list. The export only
/// reads data, so the default asks for read access to private playlists and
/// the library.
///
/// # Default
///
/// `user-library-read playlist-read-private`
///
/// # Example
///
/// ```
/// let scope = spotify_scope(); // e.g., "user-library-read playlist-read-private"
/// ```
pub fn spotify_scope() -> String {
    var_or(
        "SPOTIFY_API_AUTH_SCOPE",
        "user-library-read playlist-read-private",
    )
}

/// Returns the Spotify authorization endpoint URL.
///
/// Reads `SPOTIFY_API_AUTH_URL`, the page the user's browser is sent to for
/// granting access.
///
/// # Default
///
/// `https://accounts.spotify.com/authorize`
///
/// # Example
///
/// ```
/// let auth_url = spotify_apiauth_url(); // e.g., "https://accounts.spotify.com/authorize"
/// ```
pub fn spotify_apiauth_url() -> String {
    var_or(
        "SPOTIFY_API_AUTH_URL",
        "https://accounts.spotify.com/authorize",
    )
}

/// Returns the base URL of the Spotify Web API.
///
/// Reads `SPOTIFY_API_URL`. Every endpoint path the client requests is
/// appended to this base, which makes it the hook for pointing the exporter
/// at a different host.
///
/// # Default
///
/// `https://api.spotify.com/v1`
///
/// # Example
///
/// ```
/// let api_url = spotify_apiurl(); // e.g., "https://api.spotify.com/v1"
/// ```
pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", "https://api.spotify.com/v1")
}

/// Returns the Spotify token endpoint URL.
///
/// Reads `SPOTIFY_API_TOKEN_URL`, where the authorization code is exchanged
/// for an access token at the end of the PKCE flow.
///
/// # Default
///
/// `https://accounts.spotify.com/api/token`
///
/// # Example
///
/// ```
/// let token_url = spotify_apitoken_url(); // e.g., "https://accounts.spotify.com/api/token"
/// ```
pub fn spotify_apitoken_url() -> String {
    var_or(
        "SPOTIFY_API_TOKEN_URL",
        "https://accounts.spotify.com/api/token",
    )
}

/// Returns a pre-acquired bearer token, if one was provided.
///
/// Reads `SPOTIFY_ACCESS_TOKEN`. When set, the export skips the interactive
/// authorization flow unless a callback URL was passed on the command line.
///
/// # Returns
///
/// `None` when the variable is unset or blank.
pub fn spotify_access_token() -> Option<String> {
    env::var("SPOTIFY_ACCESS_TOKEN")
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Returns the pause between two playlists' track walks.
///
/// Reads `SPLEX_REQUEST_DELAY_MS`. Unparsable values are logged and replaced
/// by the default.
///
/// # Default
///
/// [`DEFAULT_REQUEST_DELAY_MS`] (500 ms)
///
/// # Example
///
/// ```
/// let delay = request_delay(); // e.g., Duration::from_millis(500)
/// ```
pub fn request_delay() -> Duration {
    Duration::from_millis(parse_var(
        "SPLEX_REQUEST_DELAY_MS",
        DEFAULT_REQUEST_DELAY_MS,
    ))
}

/// Returns the upper bound on pages fetched for a single collection.
///
/// Reads `SPLEX_MAX_PAGES`. A walk that would exceed the bound fails with
/// `ExportError::PageLimit` instead of running forever.
///
/// # Default
///
/// [`DEFAULT_MAX_PAGES`] (1000)
pub fn max_pages() -> usize {
    parse_var("SPLEX_MAX_PAGES", DEFAULT_MAX_PAGES)
}

/// Returns the directory the export file is written to.
///
/// Reads `SPLEX_OUTPUT_DIR`; defaults to the current directory.
pub fn output_dir() -> PathBuf {
    PathBuf::from(var_or("SPLEX_OUTPUT_DIR", "."))
}
