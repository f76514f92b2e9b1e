use crate::{
    error::Result,
    spotify::{
        client::SpotifyClient,
        pagination::{Collection, PageWalker, fetch_all},
    },
    types::{CurrentUser, PlaylistItem, PlaylistRecord},
};

/// Largest page size `/me/playlists` accepts.
pub const PLAYLISTS_PAGE_LIMIT: u32 = 50;

/// Retrieves the profile the current token belongs to.
///
/// Used at the start of an export to confirm the token works before the
/// playlist walk begins.
///
/// # Errors
///
/// Any error of [`SpotifyClient::get_json`]; a rejected token shows up here
/// as `ExportError::CredentialExpired`.
pub async fn get_current_user(client: &SpotifyClient) -> Result<CurrentUser> {
    client.get_json(&client.endpoint("/me")).await
}

/// URL of the first page of the current user's playlists, requesting the
/// largest page size the endpoint allows.
///
/// # Example
///
/// ```
/// let url = playlists_url(&client); // e.g., "https://api.spotify.com/v1/me/playlists?limit=50"
/// ```
pub fn playlists_url(client: &SpotifyClient) -> String {
    format!(
        "{uri}?limit={limit}",
        uri = client.endpoint("/me/playlists"),
        limit = PLAYLISTS_PAGE_LIMIT
    )
}

/// Walks the current user's playlists collection.
///
/// # Arguments
///
/// * `client` - Authenticated client
/// * `max_pages` - Page bound of the walk
///
/// # Returns
///
/// Every playlist record in the order Spotify lists them, along with the
/// `total` the first page declared.
///
/// # Errors
///
/// Same as [`PageWalker::collect`].
pub async fn get_playlists(
    client: &SpotifyClient,
    max_pages: usize,
) -> Result<Collection<PlaylistRecord>> {
    PageWalker::new(client, playlists_url(client))
        .with_max_pages(max_pages)
        .collect()
        .await
}

/// Walks a playlist's track collection, starting at the `tracks.href` the
/// playlist record pointed at.
///
/// # Arguments
///
/// * `client` - Authenticated client
/// * `href` - The playlist's `tracks.href`, used unchanged
/// * `max_pages` - Page bound of the walk
///
/// # Returns
///
/// Raw playlist items; items whose track is `null` are kept here and dropped
/// during normalization.
///
/// # Errors
///
/// Same as [`fetch_all`].
pub async fn get_playlist_tracks(
    client: &SpotifyClient,
    href: &str,
    max_pages: usize,
) -> Result<Vec<PlaylistItem>> {
    fetch_all(client, href, max_pages).await
}
