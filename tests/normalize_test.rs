use serde_json::json;
use splex::export::model::{Artist, Tracks};
use splex::export::normalize::{format_playlists, format_tracks};
use splex::types::{PlaylistItem, PlaylistRecord};

// Helper function to build a playlist item the way the tracks endpoint returns it
fn item(name: &str, artists: &[&str]) -> PlaylistItem {
    let artists: Vec<_> = artists.iter().map(|a| json!({ "name": a })).collect();
    serde_json::from_value(json!({
        "added_at": "2024-01-01T00:00:00Z",
        "track": {
            "name": name,
            "uri": format!("spotify:track:{}", name.to_lowercase().replace(' ', "")),
            "artists": artists,
            "album": { "name": "Some Album" }
        }
    }))
    .unwrap()
}

#[test]
fn test_single_artist_is_a_plain_name() {
    let tracks = format_tracks(vec![item("Song One", &["Artist A"])]);

    assert_eq!(tracks[0].artist, Artist::One("Artist A".to_string()));
    assert_eq!(serde_json::to_value(&tracks[0].artist).unwrap(), json!("Artist A"));
}

#[test]
fn test_several_artists_keep_their_order() {
    let tracks = format_tracks(vec![item("Song Two", &["Artist A", "Artist B"])]);

    assert_eq!(
        tracks[0].artist,
        Artist::Many(vec!["Artist A".to_string(), "Artist B".to_string()])
    );
    assert_eq!(
        serde_json::to_value(&tracks[0].artist).unwrap(),
        json!(["Artist A", "Artist B"])
    );
}

#[test]
fn test_no_artist_is_an_empty_list() {
    let tracks = format_tracks(vec![item("Untitled", &[])]);
    assert_eq!(serde_json::to_value(&tracks[0].artist).unwrap(), json!([]));
}

#[test]
fn test_track_fields() {
    let tracks = format_tracks(vec![item("Song One", &["Artist A"])]);

    assert_eq!(
        serde_json::to_value(&tracks[0]).unwrap(),
        json!({
            "name": "Song One",
            "artist": "Artist A",
            "album": "Some Album",
            "uri": "spotify:track:songone"
        })
    );
}

#[test]
fn test_items_without_track_are_skipped() {
    let removed: PlaylistItem = serde_json::from_value(json!({ "track": null })).unwrap();
    let tracks = format_tracks(vec![
        item("First", &["Artist A"]),
        removed,
        item("Second", &["Artist B"]),
    ]);

    let names: Vec<_> = tracks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second"]);
}

#[test]
fn test_format_playlists_keeps_tracks_pending() {
    let record: PlaylistRecord = serde_json::from_value(json!({
        "id": "37i9dQZF1DXcBWIGoYBM5M",
        "name": "Road Trip",
        "public": null,
        "collaborative": true,
        "tracks": {
            "href": "https://api.spotify.com/v1/playlists/37i9dQZF1DXcBWIGoYBM5M/tracks",
            "total": 42
        }
    }))
    .unwrap();

    let playlists = format_playlists(vec![record]);
    let playlist = &playlists[0];

    assert_eq!(playlist.name, "Road Trip");
    assert_eq!(playlist.public, None);
    assert!(playlist.collaborative);
    assert_eq!(playlist.track_count, 42);
    assert_eq!(
        playlist.tracks,
        Tracks::Pending(
            "https://api.spotify.com/v1/playlists/37i9dQZF1DXcBWIGoYBM5M/tracks".to_string()
        )
    );
    assert!(!playlist.is_resolved());
}

#[test]
fn test_normalization_is_deterministic() {
    let first = format_tracks(vec![item("Song", &["A", "B"]), item("Other", &["C"])]);
    let second = format_tracks(vec![item("Song", &["A", "B"]), item("Other", &["C"])]);

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
