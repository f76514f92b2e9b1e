use serde::{Deserialize, Serialize};

use crate::session::Credential;

/// One page of a cursor-paginated Spotify collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub name: String,
    pub public: Option<bool>,
    #[serde(default)]
    pub collaborative: bool,
    pub tracks: TracksRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracksRef {
    pub href: String,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<TrackRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRecord {
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: AlbumRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlbumRef {
    #[serde(default)]
    pub name: String,
}

/// Authorization in flight between the PKCE flow and the callback handler.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub code_verifier: String,
    pub credential: Option<Credential>,
    pub error: Option<String>,
}
