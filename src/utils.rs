use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Rough duration of an export in whole minutes, rounded up: one pacing
/// interval per playlist.
pub fn estimate_minutes(playlists: usize, interval: Duration) -> u64 {
    let total_ms = playlists as u128 * interval.as_millis();
    total_ms.div_ceil(60_000) as u64
}
