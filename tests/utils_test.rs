use std::time::Duration;

use chrono::NaiveDate;
use splex::error::ExportError;
use splex::export::output::export_file_name;
use splex::session::{CredentialSource, Session, parse_fragment};
use splex::utils::*;

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // Should be exactly 128 characters
    assert_eq!(verifier.len(), 128);

    // Should contain only alphanumeric characters
    assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge() {
    let verifier = "test_verifier_123";
    let challenge = generate_code_challenge(verifier);

    // Deterministic, and different input gives different output
    assert_eq!(challenge, generate_code_challenge(verifier));
    assert_ne!(challenge, generate_code_challenge("different_verifier"));

    // SHA256 digest, base64 URL-safe without padding
    assert_eq!(challenge.len(), 43);
    assert!(
        challenge
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    );
}

#[test]
fn test_estimate_minutes_rounds_up() {
    let half_second = Duration::from_millis(500);

    assert_eq!(estimate_minutes(0, half_second), 0);
    assert_eq!(estimate_minutes(3, half_second), 1);
    assert_eq!(estimate_minutes(120, half_second), 1);
    assert_eq!(estimate_minutes(121, half_second), 2);
    assert_eq!(estimate_minutes(10, Duration::ZERO), 0);
}

#[test]
fn test_export_file_name_pads_month_and_day() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    assert_eq!(export_file_name(date), "spotify-playlists-2024-03-05.json");

    let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    assert_eq!(export_file_name(date), "spotify-playlists-2023-12-31.json");
}

#[test]
fn test_parse_fragment() {
    let args = parse_fragment("#access_token=BQC%2Babc&token_type=Bearer&expires_in=3600");

    assert_eq!(args.get("access_token").unwrap(), "BQC+abc");
    assert_eq!(args.get("token_type").unwrap(), "Bearer");
    assert_eq!(args.get("expires_in").unwrap(), "3600");
    assert_eq!(args.len(), 3);

    // Leading hash is optional
    let args = parse_fragment("access_token=xyz");
    assert_eq!(args.get("access_token").unwrap(), "xyz");

    assert!(parse_fragment("").is_empty());
}

#[test]
fn test_session_from_callback_url() {
    let session =
        Session::from_callback_url("http://127.0.0.1:8888/#access_token=xyz&expires_in=3600")
            .unwrap();

    assert_eq!(session.bearer().unwrap(), "xyz");
    assert_eq!(session.source(), CredentialSource::Fragment);
}

#[test]
fn test_session_rejects_missing_or_denied_token() {
    assert!(matches!(
        Session::from_callback_url("http://127.0.0.1:8888/"),
        Err(ExportError::MissingCredential(_))
    ));
    assert!(matches!(
        Session::from_fragment("#token_type=Bearer"),
        Err(ExportError::MissingCredential(_))
    ));
    assert!(matches!(
        Session::from_fragment("#error=access_denied"),
        Err(ExportError::Authorization(_))
    ));
    assert!(matches!(
        Session::from_token("   "),
        Err(ExportError::MissingCredential(_))
    ));
}

#[test]
fn test_command_line_credential_wins_over_environment() {
    let env_token = || Some("env-token".to_string());
    let callback = "http://127.0.0.1:8888/#access_token=fragment-token";

    let session = Session::from_provided(None, Some(callback), env_token())
        .unwrap()
        .unwrap();
    assert_eq!(session.source(), CredentialSource::Fragment);
    assert_eq!(session.bearer().unwrap(), "fragment-token");

    let session = Session::from_provided(Some("flag-token"), None, env_token())
        .unwrap()
        .unwrap();
    assert_eq!(session.bearer().unwrap(), "flag-token");

    let session = Session::from_provided(None, None, env_token())
        .unwrap()
        .unwrap();
    assert_eq!(session.source(), CredentialSource::Provided);
    assert_eq!(session.bearer().unwrap(), "env-token");

    assert!(Session::from_provided(None, None, None).is_none());
}
