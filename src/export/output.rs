use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::{error::Result, export::model::ExportBundle};

/// `spotify-playlists-YYYY-MM-DD.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("spotify-playlists-{}.json", date.format("%Y-%m-%d"))
}

pub fn to_json(bundle: &ExportBundle, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(bundle)?
    } else {
        serde_json::to_string(bundle)?
    };
    Ok(json)
}

/// Writes the bundle into `dir` under the dated file name and returns the
/// path written.
pub async fn write_bundle(
    bundle: &ExportBundle,
    dir: &Path,
    date: NaiveDate,
    pretty: bool,
) -> Result<PathBuf> {
    async_fs::create_dir_all(dir).await?;

    let path = dir.join(export_file_name(date));
    async_fs::write(&path, to_json(bundle, pretty)?).await?;
    tracing::debug!(path = %path.display(), playlists = bundle.len(), "export written");

    Ok(path)
}
