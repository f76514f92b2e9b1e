//! HTTP endpoints of the local OAuth callback server.
//!
//! The only route is [`callback`], the redirect target of the PKCE consent
//! flow. It exchanges the authorization code for a bearer token and hands it
//! back to the waiting [`crate::spotify::auth::authorize`] call.

mod callback;

pub use callback::callback;
