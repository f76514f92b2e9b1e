use std::{sync::Arc, time::Duration};

use splex::error::ExportError;
use splex::session::Credential;
use splex::spotify::auth::{PendingState, spawn_callback_server, wait_for_credential};
use splex::types::PendingAuthorization;
use tokio::sync::Mutex;

fn pending_state() -> PendingState {
    Arc::new(Mutex::new(Some(PendingAuthorization {
        code_verifier: "verifier".to_string(),
        credential: None,
        error: None,
    })))
}

#[tokio::test]
async fn test_busy_callback_port_ends_the_wait_early() {
    // keep the port occupied for the whole test
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = occupied.local_addr().unwrap().to_string();

    let state = pending_state();
    let server = spawn_callback_server(Arc::clone(&state), addr.clone());
    server.await.unwrap();

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        wait_for_credential(state, Duration::from_secs(120)),
    )
    .await
    .expect("wait should end before its timeout");

    match result {
        Err(ExportError::Authorization(message)) => assert!(message.contains(&addr)),
        other => panic!("expected Authorization error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_callback_address_is_reported() {
    let state = pending_state();
    spawn_callback_server(Arc::clone(&state), "not an address".to_string())
        .await
        .unwrap();

    let lock = state.lock().await;
    let error = lock.as_ref().and_then(|p| p.error.clone()).unwrap();
    assert!(error.contains("failed to parse server address"));
}

#[tokio::test]
async fn test_wait_returns_the_exchanged_credential() {
    let state = pending_state();
    if let Some(pending) = state.lock().await.as_mut() {
        pending.credential = Some(Credential::new("BQC-token"));
    }

    let credential = wait_for_credential(state, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(credential.secret(), "BQC-token");
}

#[tokio::test]
async fn test_wait_times_out_without_callback() {
    let result = wait_for_credential(pending_state(), Duration::from_millis(10)).await;

    match result {
        Err(ExportError::Authorization(message)) => assert!(message.contains("no callback")),
        other => panic!("expected timeout, got {:?}", other),
    }
}
