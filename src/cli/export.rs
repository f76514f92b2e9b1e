use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config, error,
    error::{ExportError, Result},
    export::{
        ExportBundle, ExportReport, ExportSettings, Exporter, FailurePolicy, FixedDelay,
        ProgressSink, RunState, output,
    },
    info,
    session::{CredentialSource, Session},
    spotify::{auth, client::SpotifyClient, playlists::get_current_user},
    success, warning,
};

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub token: Option<String>,
    pub callback_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub delay_ms: Option<u64>,
    pub max_pages: Option<usize>,
    pub throttle_retries: u32,
    pub keep_going: bool,
    pub pretty: bool,
}

pub async fn export(options: ExportOptions) {
    let settings = ExportSettings {
        max_pages: options.max_pages.unwrap_or_else(config::max_pages),
        failure_policy: if options.keep_going {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Abort
        },
    };
    let delay = options
        .delay_ms
        .map(Duration::from_millis)
        .unwrap_or_else(config::request_delay);
    let output_dir = options.output_dir.clone().unwrap_or_else(config::output_dir);

    let mut reauthorized = false;

    loop {
        let mut progress = CliProgress::default();
        progress.state_changed(RunState::Authorizing);

        let session = match acquire_session(&options).await {
            Ok(session) => session,
            Err(e) => error!("Cannot authorize with Spotify. Err: {}", e),
        };
        let source = session.source();
        let client = SpotifyClient::new(session).with_throttle_retries(options.throttle_retries);

        match run_once(&client, delay, settings.clone(), progress).await {
            Ok(report) => {
                save(&report, &output_dir, options.pretty).await;
                return;
            }
            // the partial bundle is gone at this point; start over with a fresh token
            Err(ExportError::CredentialExpired)
                if source == CredentialSource::Interactive && !reauthorized =>
            {
                warning!("Spotify credential expired. Re-authorizing and starting over...");
                reauthorized = true;
            }
            Err(ExportError::CredentialExpired) => {
                error!("Spotify credential expired. Re-authorize and run the export again.")
            }
            // the progress sink already printed the rate limit warning
            Err(ExportError::Throttled { retry_after }) => {
                error!("{}", stalled_message(retry_after))
            }
            Err(e) => error!("Export failed. Err: {}", e),
        }
    }
}

async fn acquire_session(options: &ExportOptions) -> Result<Session> {
    match Session::from_provided(
        options.token.as_deref(),
        options.callback_url.as_deref(),
        config::spotify_access_token(),
    ) {
        Some(session) => session,
        None => auth::authorize().await,
    }
}

async fn run_once(
    client: &SpotifyClient,
    delay: Duration,
    settings: ExportSettings,
    progress: CliProgress,
) -> Result<ExportReport> {
    let user = get_current_user(client).await?;
    info!(
        "Signed in as {}",
        user.display_name.as_deref().unwrap_or(&user.id)
    );

    let mut exporter =
        Exporter::new(client, FixedDelay::new(delay), progress).with_settings(settings);
    let result = exporter.run().await;
    exporter.into_sink().clear();
    result
}

async fn save(report: &ExportReport, output_dir: &Path, pretty: bool) {
    if let Some(summary) = failed_summary(&report.bundle) {
        warning!("{}", summary);
    }

    let today = Local::now().date_naive();
    match output::write_bundle(&report.bundle, output_dir, today, pretty).await {
        Ok(path) => success!(
            "Saved {} playlists ({} tracks) to {}",
            report.bundle.len(),
            report.bundle.track_total(),
            path.display()
        ),
        Err(e) => error!("Failed to write export file. Err: {}", e),
    }
}

fn stalled_message(retry_after: Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!("Export stalled. Spotify asked to retry after {} seconds.", secs),
        None => "Export stalled.".to_string(),
    }
}

/// One line naming every playlist exported without its tracks. Each failure
/// was already reported as it happened.
fn failed_summary(bundle: &ExportBundle) -> Option<String> {
    let failed: Vec<&str> = bundle.failed().map(|p| p.name.as_str()).collect();
    if failed.is_empty() {
        return None;
    }
    Some(format!(
        "{} playlist(s) exported without tracks: {}",
        failed.len(),
        failed.join(", ")
    ))
}

/// Renders exporter events as status lines and a progress bar.
#[derive(Default)]
struct CliProgress {
    bar: Option<ProgressBar>,
}

impl CliProgress {
    fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn start_bar(&mut self, total: usize) {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.green/blue} {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        self.bar = Some(bar);
    }
}

impl ProgressSink for CliProgress {
    fn state_changed(&mut self, state: RunState) {
        match state {
            RunState::Authorizing => info!("Authorizing with Spotify..."),
            RunState::PlaylistDiscovery => info!("Fetching playlists..."),
            RunState::TrackResolution { current: 1, total } => self.start_bar(total),
            RunState::Completed | RunState::Aborted | RunState::Stalled => self.clear(),
            _ => {}
        }
    }

    fn status(&mut self, message: &str) {
        match &self.bar {
            Some(bar) => bar.set_message(message.to_string()),
            None => info!("{}", message),
        }
    }

    fn progress(&mut self, completed: usize, _total: usize) {
        if let Some(bar) = &self.bar {
            bar.set_position(completed as u64);
        }
    }

    fn warning(&mut self, message: &str) {
        match &self.bar {
            Some(bar) => bar.suspend(|| warning!("{}", message)),
            None => warning!("{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{PlaylistSummary, Tracks};

    fn playlist(name: &str) -> PlaylistSummary {
        PlaylistSummary {
            name: name.to_string(),
            public: Some(true),
            collaborative: false,
            track_count: 0,
            tracks: Tracks::Resolved(Vec::new()),
            failure: None,
        }
    }

    #[test]
    fn stalled_message_only_adds_the_retry_hint() {
        assert_eq!(
            stalled_message(Some(30)),
            "Export stalled. Spotify asked to retry after 30 seconds."
        );
        assert_eq!(stalled_message(None), "Export stalled.");
        assert!(!stalled_message(None).contains("Rate limit exceeded"));
    }

    #[test]
    fn failed_playlists_are_summarized_in_one_line() {
        let mut first = playlist("First");
        first.mark_failed("request failed with status 500");
        let mut third = playlist("Third");
        third.mark_failed("request failed with status 502");
        let bundle = ExportBundle::seal(vec![first, playlist("Second"), third]).unwrap();

        assert_eq!(
            failed_summary(&bundle).as_deref(),
            Some("2 playlist(s) exported without tracks: First, Third")
        );
    }

    #[test]
    fn no_summary_without_failures() {
        let bundle = ExportBundle::seal(vec![playlist("Only")]).unwrap();
        assert_eq!(failed_summary(&bundle), None);
    }
}
