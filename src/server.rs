use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{
    api,
    error::{ExportError, Result},
    types::PendingAuthorization,
};

/// Serves the OAuth redirect target on `addr` until the task is aborted.
///
/// # Errors
///
/// `ExportError::Config` for an unparsable address, `ExportError::Io` when
/// the address cannot be bound.
pub async fn start_api_server(
    state: Arc<Mutex<Option<PendingAuthorization>>>,
    addr: &str,
) -> Result<()> {
    let app = Router::new().route("/callback", get(api::callback).layer(Extension(state)));

    let addr = SocketAddr::from_str(addr).map_err(|e| {
        ExportError::Config(format!("failed to parse server address: {}", e))
    })?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
