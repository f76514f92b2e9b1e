use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{spotify::auth::exchange_code_pkce, types::PendingAuthorization, warning};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<PendingAuthorization>>>>,
) -> Html<&'static str> {
    let mut state = shared_state.lock().await;
    let Some(pending) = state.as_mut() else {
        return Html("<h4>No authorization in progress.</h4>");
    };

    if let Some(error) = params.get("error") {
        pending.error = Some(format!("Spotify denied access: {}", error));
        return Html("<h4>Authorization denied.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let verifier = pending.code_verifier.clone();

    match exchange_code_pkce(code, &verifier).await {
        Ok(credential) => {
            pending.credential = Some(credential);
            Html("<h2>Authorization successful.</h2><p>You can close this window and return to the terminal.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            pending.error = Some(e.to_string());
            Html("<h4>Login failed.</h4>")
        }
    }
}
