//! Bearer credential and its lifecycle for one export run.
//!
//! A [`Session`] is created once, handed to the [`SpotifyClient`], and moves
//! from `Valid` to `Expired` the first time Spotify rejects the token. An
//! expired session refuses to hand out its token, so nothing built on top of
//! it can issue another authenticated request.
//!
//! [`SpotifyClient`]: crate::spotify::client::SpotifyClient

use std::{
    collections::HashMap,
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

use url::{Url, form_urlencoded};

use crate::error::{ExportError, Result};

/// Opaque bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    Valid,
    Expired,
}

/// Where the credential came from; decides whether the CLI can re-authorize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Provided,
    Fragment,
    Interactive,
}

#[derive(Debug)]
pub struct Session {
    credential: Credential,
    source: CredentialSource,
    expired: AtomicBool,
}

impl Session {
    pub fn new(credential: Credential, source: CredentialSource) -> Self {
        Self {
            credential,
            source,
            expired: AtomicBool::new(false),
        }
    }

    pub fn from_token(token: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ExportError::MissingCredential(
                "access token is empty".to_string(),
            ));
        }
        Ok(Self::new(Credential::new(token), CredentialSource::Provided))
    }

    /// Builds a session from an implicit-grant fragment such as
    /// `#access_token=...&token_type=Bearer&expires_in=3600`.
    pub fn from_fragment(fragment: &str) -> Result<Self> {
        let args = parse_fragment(fragment);
        if let Some(error) = args.get("error") {
            return Err(ExportError::Authorization(error.clone()));
        }
        match args.get("access_token").filter(|t| !t.is_empty()) {
            Some(token) => Ok(Self::new(
                Credential::new(token.as_str()),
                CredentialSource::Fragment,
            )),
            None => Err(ExportError::MissingCredential(
                "no access_token in URL fragment".to_string(),
            )),
        }
    }

    /// Same as [`Session::from_fragment`], starting from the full redirect URL.
    pub fn from_callback_url(callback_url: &str) -> Result<Self> {
        let url = Url::parse(callback_url)
            .map_err(|e| ExportError::MissingCredential(format!("invalid callback URL: {}", e)))?;
        match url.fragment() {
            Some(fragment) => Self::from_fragment(fragment),
            None => Err(ExportError::MissingCredential(
                "callback URL has no fragment".to_string(),
            )),
        }
    }

    /// Picks a non-interactive credential, if any was supplied.
    ///
    /// Command-line inputs win over the environment: `--token`, then
    /// `--callback-url`, then `SPOTIFY_ACCESS_TOKEN`. `None` means the
    /// interactive flow has to run.
    pub fn from_provided(
        token: Option<&str>,
        callback_url: Option<&str>,
        env_token: Option<String>,
    ) -> Option<Result<Self>> {
        if let Some(token) = token {
            return Some(Self::from_token(token));
        }
        if let Some(callback_url) = callback_url {
            return Some(Self::from_callback_url(callback_url));
        }
        env_token.map(|token| Self::from_token(&token))
    }

    /// The bearer token, as long as Spotify has not rejected it.
    pub fn bearer(&self) -> Result<&str> {
        match self.state() {
            CredentialState::Valid => Ok(self.credential.secret()),
            CredentialState::Expired => Err(ExportError::CredentialExpired),
        }
    }

    pub fn expire(&self) {
        self.expired.store(true, Ordering::SeqCst);
    }

    pub fn state(&self) -> CredentialState {
        if self.expired.load(Ordering::SeqCst) {
            CredentialState::Expired
        } else {
            CredentialState::Valid
        }
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

/// Splits a URL fragment into its key/value pairs. A leading `#` is ignored
/// and values are percent-decoded.
pub fn parse_fragment(fragment: &str) -> HashMap<String, String> {
    let fragment = fragment.trim_start_matches('#');
    form_urlencoded::parse(fragment.as_bytes())
        .into_owned()
        .collect()
}
