//! Error types for splex
//!
//! Every fallible operation in the export pipeline returns [`ExportError`].
//! The variants map onto the three failure classes the exporter reacts to
//! differently (see [`ErrorKind`]): throttling, credential expiry and
//! everything else that breaks a transport call.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for splex operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Main error type for splex
#[derive(Debug, Error)]
pub enum ExportError {
    /// Spotify answered with 429 Too Many Requests
    #[error("rate limit exceeded{}", retry_hint(.retry_after))]
    Throttled {
        /// Seconds from the `Retry-After` header, when present
        retry_after: Option<u64>,
    },

    /// Spotify answered with 401; the bearer token is no longer valid
    #[error("Spotify credential expired, re-authorization required")]
    CredentialExpired,

    /// Any other non-success status
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: StatusCode },

    /// Connection, TLS or body transfer failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body was not the JSON we expected
    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A pagination walk did not terminate within the page bound
    #[error("pagination of {url} exceeded {max_pages} pages")]
    PageLimit { url: String, max_pages: usize },

    /// A playlist reached the export boundary without resolved tracks
    #[error("playlist \"{name}\" has unresolved tracks")]
    Unresolved { name: String },

    /// No usable bearer token could be obtained
    #[error("missing access token: {0}")]
    MissingCredential(String),

    /// The OAuth consent flow failed or timed out
    #[error("authorization failed: {0}")]
    Authorization(String),

    /// Configuration value missing or invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used by the exporter to pick the run outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// HTTP 429, recoverable by retrying the export later
    TransientThrottle,
    /// HTTP 401, recoverable only by a fresh authorization
    CredentialExpired,
    /// Network failure, malformed body, unexpected status or runaway pagination
    TransportFailure,
    /// Local failures (configuration, file output, invariants)
    Local,
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExportError::Throttled { .. } => ErrorKind::TransientThrottle,
            ExportError::CredentialExpired => ErrorKind::CredentialExpired,
            ExportError::Status { .. }
            | ExportError::Network(_)
            | ExportError::Decode { .. }
            | ExportError::PageLimit { .. } => ErrorKind::TransportFailure,
            ExportError::Unresolved { .. }
            | ExportError::MissingCredential(_)
            | ExportError::Authorization(_)
            | ExportError::Config(_)
            | ExportError::Serialization(_)
            | ExportError::Io(_) => ErrorKind::Local,
        }
    }

    /// Errors after which no further request of the run may be issued.
    pub fn ends_run(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::TransientThrottle | ErrorKind::CredentialExpired
        )
    }
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(" (retry after {} seconds)", secs),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttled_message_includes_retry_after() {
        let err = ExportError::Throttled {
            retry_after: Some(30),
        };
        assert_eq!(err.to_string(), "rate limit exceeded (retry after 30 seconds)");
        assert_eq!(
            ExportError::Throttled { retry_after: None }.to_string(),
            "rate limit exceeded"
        );
    }

    #[test]
    fn only_throttle_and_expiry_end_the_run() {
        assert!(ExportError::Throttled { retry_after: None }.ends_run());
        assert!(ExportError::CredentialExpired.ends_run());
        let status = ExportError::Status {
            url: "https://api.spotify.com/v1/me".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert_eq!(status.kind(), ErrorKind::TransportFailure);
        assert!(!status.ends_run());
    }
}
