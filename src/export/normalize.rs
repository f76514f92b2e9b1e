use crate::{
    export::model::{Artist, PlaylistSummary, Track, Tracks},
    types::{PlaylistItem, PlaylistRecord, TrackRecord},
};

/// Playlist records to summaries whose tracks are still the collection URL.
pub fn format_playlists(records: Vec<PlaylistRecord>) -> Vec<PlaylistSummary> {
    records
        .into_iter()
        .map(|playlist| PlaylistSummary {
            name: playlist.name,
            public: playlist.public,
            collaborative: playlist.collaborative,
            track_count: playlist.tracks.total,
            tracks: Tracks::Pending(playlist.tracks.href),
            failure: None,
        })
        .collect()
}

/// Playlist items to tracks. Items without a track object (removed or
/// unavailable entries) are dropped.
pub fn format_tracks(items: Vec<PlaylistItem>) -> Vec<Track> {
    items
        .into_iter()
        .filter_map(|item| match item.track {
            Some(track) => Some(Track::from(track)),
            None => {
                tracing::debug!("skipping playlist item without track");
                None
            }
        })
        .collect()
}

impl From<TrackRecord> for Track {
    fn from(track: TrackRecord) -> Self {
        let names = track.artists.into_iter().map(|a| a.name).collect();
        Track {
            name: track.name,
            artist: Artist::from_names(names),
            album: track.album.name,
            uri: track.uri,
        }
    }
}
