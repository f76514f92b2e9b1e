use serde::{Deserialize, Serialize, Serializer};

use crate::error::{ExportError, Result};

/// Credited artist(s) of a track: a plain name when exactly one artist is
/// credited, an ordered list otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Artist {
    One(String),
    Many(Vec<String>),
}

impl Artist {
    pub fn from_names(mut names: Vec<String>) -> Self {
        if names.len() == 1 {
            Artist::One(names.remove(0))
        } else {
            Artist::Many(names)
        }
    }

    pub fn names(&self) -> Vec<&str> {
        match self {
            Artist::One(name) => vec![name.as_str()],
            Artist::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub artist: Artist,
    pub album: String,
    pub uri: String,
}

/// Tracks of a playlist: the collection URL until the walk completes, the
/// resolved sequence afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tracks {
    Resolved(Vec<Track>),
    Pending(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSummary {
    pub name: String,
    pub public: Option<bool>,
    pub collaborative: bool,
    pub track_count: u64,
    pub tracks: Tracks,
    /// Set when the track walk failed and the export continued without it.
    #[serde(default, rename = "error", skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl PlaylistSummary {
    pub fn pending_href(&self) -> Option<&str> {
        match &self.tracks {
            Tracks::Pending(href) => Some(href),
            Tracks::Resolved(_) => None,
        }
    }

    pub fn resolve(&mut self, tracks: Vec<Track>) {
        self.tracks = Tracks::Resolved(tracks);
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.tracks = Tracks::Resolved(Vec::new());
        self.failure = Some(reason.into());
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.tracks, Tracks::Resolved(_))
    }

    pub fn resolved_tracks(&self) -> &[Track] {
        match &self.tracks {
            Tracks::Resolved(tracks) => tracks,
            Tracks::Pending(_) => &[],
        }
    }
}

/// Every playlist of the library with its tracks resolved, in discovery order.
///
/// Serializes as a bare JSON array. Deserializing goes through
/// [`ExportBundle::seal`], so a parsed bundle holds the same guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<PlaylistSummary>")]
pub struct ExportBundle {
    playlists: Vec<PlaylistSummary>,
}

impl Serialize for ExportBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.playlists.serialize(serializer)
    }
}

impl TryFrom<Vec<PlaylistSummary>> for ExportBundle {
    type Error = ExportError;

    fn try_from(playlists: Vec<PlaylistSummary>) -> Result<Self> {
        Self::seal(playlists)
    }
}

impl ExportBundle {
    /// Fails if any playlist still points at an unfetched track collection.
    pub fn seal(playlists: Vec<PlaylistSummary>) -> Result<Self> {
        if let Some(pending) = playlists.iter().find(|p| !p.is_resolved()) {
            return Err(ExportError::Unresolved {
                name: pending.name.clone(),
            });
        }
        Ok(Self { playlists })
    }

    pub fn playlists(&self) -> &[PlaylistSummary] {
        &self.playlists
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    pub fn track_total(&self) -> usize {
        self.playlists.iter().map(|p| p.resolved_tracks().len()).sum()
    }

    pub fn failed(&self) -> impl Iterator<Item = &PlaylistSummary> {
        self.playlists.iter().filter(|p| p.failure.is_some())
    }
}
