use std::{sync::Arc, time::Duration};

use reqwest::Client;
use serde_json::Value;
use tokio::{sync::Mutex, task::JoinHandle};
use url::Url;

use crate::{
    config,
    error::{ExportError, Result},
    server::start_api_server,
    session::{Credential, CredentialSource, Session},
    types::PendingAuthorization,
    utils, warning,
};

/// How long [`authorize`] waits for the browser to come back.
pub const AUTHORIZATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Shared between the waiting flow and the callback handler.
pub type PendingState = Arc<Mutex<Option<PendingAuthorization>>>;

/// Runs the complete OAuth 2.0 PKCE authorization flow with Spotify.
///
/// This function orchestrates the entire authorization process:
/// 1. Generating the PKCE code verifier and challenge
/// 2. Starting the local callback server on [`config::server_addr`]
/// 3. Opening the authorization URL in the user's browser
/// 4. Waiting for the callback handler to exchange the code for a token
///
/// The PKCE (Proof Key for Code Exchange) flow needs no client secret, so the
/// only application setting required is the client ID.
///
/// # Returns
///
/// A [`Session`] with [`CredentialSource::Interactive`]. The token only lives
/// in memory; it is never written to disk, so every run authorizes afresh.
///
/// # Errors
///
/// - `ExportError::Config` if the client ID is missing or the authorization
///   URL cannot be built
/// - `ExportError::Authorization` if the user denies access, the token
///   exchange fails, the callback server cannot start, or no callback arrives
///   within [`AUTHORIZATION_TIMEOUT`]
///
/// # User Experience
///
/// If the browser cannot be opened, a warning prints the URL so the user can
/// open it manually. The callback server is shut down before returning, on
/// success and on failure.
///
/// # Example
///
/// ```
/// let session = auth::authorize().await?;
/// let client = SpotifyClient::new(session);
/// ```
pub async fn authorize() -> Result<Session> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let auth_url = authorization_url(&code_challenge)?;

    let shared_state: PendingState = Arc::new(Mutex::new(Some(PendingAuthorization {
        code_verifier,
        credential: None,
        error: None,
    })));

    let server = spawn_callback_server(Arc::clone(&shared_state), config::server_addr());

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let outcome = wait_for_credential(shared_state, AUTHORIZATION_TIMEOUT).await;
    server.abort();

    outcome.map(|credential| Session::new(credential, CredentialSource::Interactive))
}

/// Builds the Spotify authorization URL for the PKCE flow.
///
/// All parameters (client ID, redirect URI, challenge and scope) are
/// percent-encoded.
///
/// # Arguments
///
/// * `code_challenge` - Base64url SHA-256 digest of the code verifier
///
/// # Errors
///
/// Returns `ExportError::Config` if the client ID is not configured or the
/// configured authorization endpoint is not a valid URL.
///
/// # Example
///
/// ```
/// let challenge = utils::generate_code_challenge(&verifier);
/// let url = authorization_url(&challenge)?;
/// // https://accounts.spotify.com/authorize?client_id=...&code_challenge_method=S256&...
/// ```
pub fn authorization_url(code_challenge: &str) -> Result<String> {
    let client_id = config::spotify_client_id()?;
    let url = Url::parse_with_params(
        &config::spotify_apiauth_url(),
        &[
            ("client_id", client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", config::spotify_redirect_uri().as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", config::spotify_scope().as_str()),
        ],
    )
    .map_err(|e| ExportError::Config(format!("invalid authorization URL: {}", e)))?;

    Ok(url.to_string())
}

/// Starts the callback server in a background task.
///
/// If the server fails (for example because `addr` is already in use), the
/// failure is recorded in the pending authorization so that
/// [`wait_for_credential`] returns right away instead of running into its
/// timeout.
///
/// # Arguments
///
/// * `shared_state` - Pending authorization the callback handler completes
/// * `addr` - Address to bind, e.g. `127.0.0.1:8888`
///
/// # Returns
///
/// The task handle; abort it once the flow is over.
pub fn spawn_callback_server(shared_state: PendingState, addr: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = start_api_server(Arc::clone(&shared_state), &addr).await {
            tracing::error!(addr = %addr, error = %e, "callback server stopped");
            if let Some(pending) = shared_state.lock().await.as_mut() {
                pending.error = Some(format!("callback server on {} failed: {}", addr, e));
            }
        }
    })
}

/// Polls the pending authorization once a second until it carries a
/// credential or an error.
///
/// # Arguments
///
/// * `shared_state` - Pending authorization filled in by the callback handler
///   or by a failing callback server
/// * `timeout` - How long to wait before giving up
///
/// # Errors
///
/// Returns `ExportError::Authorization` with the recorded error, or a timeout
/// message when nothing arrived in time.
pub async fn wait_for_credential(
    shared_state: PendingState,
    timeout: Duration,
) -> Result<Credential> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < timeout {
        let lock = shared_state.lock().await;
        if let Some(pending) = lock.as_ref() {
            if let Some(credential) = &pending.credential {
                return Ok(credential.clone());
            }
            if let Some(error) = &pending.error {
                return Err(ExportError::Authorization(error.clone()));
            }
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    Err(ExportError::Authorization(format!(
        "no callback received within {} seconds",
        timeout.as_secs()
    )))
}

/// Exchanges an authorization code for an access token using PKCE.
///
/// Completes the OAuth 2.0 PKCE flow by posting the authorization code
/// together with the original code verifier to Spotify's token endpoint. The
/// verifier proves that this client started the flow.
///
/// # Arguments
///
/// * `code` - Authorization code received in the OAuth callback
/// * `verifier` - Code verifier generated at the start of the flow
///
/// # Returns
///
/// The bearer [`Credential`]. Refresh tokens and expiry hints in the response
/// are ignored; a token that expires mid-run surfaces as a 401 later.
///
/// # Errors
///
/// - `ExportError::Config` if the client ID is not configured
/// - `ExportError::Network` if the request fails or the body is not JSON
/// - `ExportError::Authorization` on a non-success status or a response
///   without `access_token`, carrying Spotify's `error_description` when
///   present
///
/// # Example
///
/// ```
/// let credential = exchange_code_pkce("AQD...", &pending.code_verifier).await?;
/// ```
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Result<Credential> {
    let client_id = config::spotify_client_id()?;
    let redirect_uri = config::spotify_redirect_uri();

    let client = Client::new();
    let res = client
        .post(config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .send()
        .await?;

    let status = res.status();
    let json: Value = res.json().await?;

    match json["access_token"].as_str() {
        Some(token) if status.is_success() && !token.is_empty() => Ok(Credential::new(token)),
        _ => Err(ExportError::Authorization(format!(
            "token exchange failed with status {}: {}",
            status,
            json["error_description"]
                .as_str()
                .or_else(|| json["error"].as_str())
                .unwrap_or("no access token in response")
        ))),
    }
}
