//! # Spotify integration
//!
//! Everything that talks to Spotify:
//!
//! ```text
//! Export pipeline
//!      ↓
//! playlists    /me, /me/playlists, /playlists/{id}/tracks
//!      ↓
//! pagination   cursor walk over `{items, next, total}` pages
//!      ↓
//! client       bearer auth + status policy (429, 401, other)
//!      ↓
//! Spotify Web API
//! ```
//!
//! [`auth`] runs the OAuth 2.0 PKCE consent flow with a local callback
//! server and yields an in-memory [`crate::session::Session`].
//!
//! ## Rate limiting
//!
//! A 429 is surfaced as [`crate::error::ExportError::Throttled`] and stops
//! the export. Retrying on `Retry-After` is opt-in through
//! [`client::SpotifyClient::with_throttle_retries`] and never waits longer
//! than [`client::MAX_RETRY_AFTER_SECS`].

pub mod auth;
pub mod client;
pub mod pagination;
pub mod playlists;
