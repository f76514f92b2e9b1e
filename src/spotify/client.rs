use std::time::Duration;

use reqwest::{Client, StatusCode, header::RETRY_AFTER};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{
    config,
    error::{ExportError, Result},
    session::Session,
};

/// Longest `Retry-After` the client is willing to sit out on its own.
pub const MAX_RETRY_AFTER_SECS: u64 = 120;

const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Authenticated transport for the Spotify Web API.
///
/// Every call of the export goes through [`SpotifyClient::get_json`], which
/// owns the response status policy:
///
/// - 2xx: the body is parsed as JSON
/// - 429: `ExportError::Throttled`, no automatic retry unless throttle
///   retries were enabled with [`SpotifyClient::with_throttle_retries`]
/// - 401: the session is marked expired and `ExportError::CredentialExpired`
///   is returned
/// - anything else: `ExportError::Status`
pub struct SpotifyClient {
    http: Client,
    session: Session,
    api_url: String,
    throttle_retries: u32,
}

impl SpotifyClient {
    /// Creates a client for the API base configured in `SPOTIFY_API_URL`.
    ///
    /// # Arguments
    ///
    /// * `session` - Session whose bearer token authorizes every request
    ///
    /// # Example
    ///
    /// ```
    /// let session = Session::from_token(&token)?;
    /// let client = SpotifyClient::new(session).with_throttle_retries(2);
    /// ```
    pub fn new(session: Session) -> Self {
        Self::with_api_url(session, config::spotify_apiurl())
    }

    /// Creates a client for an explicit API base URL.
    ///
    /// A trailing slash on `api_url` is ignored.
    pub fn with_api_url(session: Session, api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            session,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            throttle_retries: 0,
        }
    }

    /// Allows up to `retries` automatic retries of a rate-limited request.
    ///
    /// The default is zero: a 429 is returned to the caller at once. With
    /// retries enabled, the client sleeps for the `Retry-After` duration (one
    /// second when the header is missing) as long as it does not exceed
    /// [`MAX_RETRY_AFTER_SECS`].
    pub fn with_throttle_retries(mut self, retries: u32) -> Self {
        self.throttle_retries = retries;
        self
    }

    /// The session behind this client, e.g. to check whether it expired.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Absolute URL for an API path such as `/me/playlists`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// Sends an authenticated GET request and parses the JSON response.
    ///
    /// `url` is absolute: either built with [`SpotifyClient::endpoint`] or a
    /// `next` / `href` link Spotify returned.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to request
    ///
    /// # Returns
    ///
    /// The response body deserialized into `T`.
    ///
    /// # Errors
    ///
    /// The response status decides the outcome:
    /// - `ExportError::CredentialExpired` before sending anything if the
    ///   session already expired
    /// - 429 Too Many Requests: `ExportError::Throttled` carrying the
    ///   `Retry-After` seconds, unless a throttle retry is still available
    ///   and the wait is at most [`MAX_RETRY_AFTER_SECS`]
    /// - 401 Unauthorized: the session is marked expired and
    ///   `ExportError::CredentialExpired` is returned; no later call on this
    ///   client issues a request
    /// - any other non-success status: `ExportError::Status`
    /// - a success body that is not the expected JSON: `ExportError::Decode`
    /// - connection or transfer failures: `ExportError::Network`
    ///
    /// # Example
    ///
    /// ```
    /// let user: CurrentUser = client.get_json(&client.endpoint("/me")).await?;
    /// ```
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut attempt = 0;

        loop {
            let token = self.session.bearer()?;
            let response = self.http.get(url).bearer_auth(token).send().await?;

            match response.status() {
                status if status.is_success() => {
                    let body = response.text().await?;
                    return serde_json::from_str(&body).map_err(|source| ExportError::Decode {
                        url: url.to_string(),
                        source,
                    });
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.trim().parse::<u64>().ok());
                    let wait = retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS);

                    if attempt < self.throttle_retries && wait <= MAX_RETRY_AFTER_SECS {
                        attempt += 1;
                        tracing::warn!(url, wait, attempt, "rate limited, backing off");
                        sleep(Duration::from_secs(wait)).await;
                        continue;
                    }

                    return Err(ExportError::Throttled { retry_after });
                }
                StatusCode::UNAUTHORIZED => {
                    self.session.expire();
                    return Err(ExportError::CredentialExpired);
                }
                status => {
                    return Err(ExportError::Status {
                        url: url.to_string(),
                        status,
                    });
                }
            }
        }
    }
}
