//! Build script for splex.
//!
//! Copies `.env.example` from the crate root into the local data directory
//! (`~/.local/share/splex/` on Linux, `~/Library/Application Support/splex/`
//! on macOS, `%LOCALAPPDATA%/splex/` on Windows) so the configuration
//! template sits next to where `config::load_env` looks for `.env`.
//!
//! Nothing here is allowed to fail the build: an unwritable data directory
//! or a missing template only produces a cargo warning.

use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=.env.example");

    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let env_example_path = PathBuf::from(manifest_dir).join(".env.example");

    if !env_example_path.is_file() {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
        return;
    }

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("splex");

    let copied = fs::create_dir_all(&out_dir)
        .and_then(|_| fs::copy(&env_example_path, out_dir.join(".env.example")));
    if let Err(e) = copied {
        println!(
            "cargo:warning=could not copy .env.example to {}: {}",
            out_dir.display(),
            e
        );
    }
}
