use std::{
    fmt,
    future::Future,
    time::{Duration, Instant},
};

use crate::{
    error::{ErrorKind, ExportError, Result},
    export::{
        model::{ExportBundle, PlaylistSummary},
        normalize::{format_playlists, format_tracks},
    },
    spotify::{
        client::SpotifyClient,
        pagination::DEFAULT_MAX_PAGES,
        playlists::{get_playlist_tracks, get_playlists},
    },
    utils,
};

/// Where an export run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Authorizing,
    PlaylistDiscovery,
    /// Resolving the tracks of playlist `current` (1-based) out of `total`.
    TrackResolution {
        current: usize,
        total: usize,
    },
    Completed,
    /// Ended by a credential expiry or an unrecoverable failure.
    Aborted,
    /// Throttled by Spotify; the user has to start the export again later.
    Stalled,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Aborted | RunState::Stalled)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Authorizing => write!(f, "authorizing"),
            RunState::PlaylistDiscovery => write!(f, "discovering playlists"),
            RunState::TrackResolution { current, total } => {
                write!(f, "resolving tracks {}/{}", current, total)
            }
            RunState::Completed => write!(f, "completed"),
            RunState::Aborted => write!(f, "aborted"),
            RunState::Stalled => write!(f, "stalled"),
        }
    }
}

/// Receives everything the exporter wants the user to see.
pub trait ProgressSink {
    fn state_changed(&mut self, _state: RunState) {}

    /// Human-readable status line.
    fn status(&mut self, message: &str);

    /// Emitted once per playlist after its tracks resolve.
    fn progress(&mut self, completed: usize, total: usize);

    fn warning(&mut self, message: &str);
}

/// Spacing between consecutive playlists' track walks.
pub trait Pacer {
    fn pause(&self) -> impl Future<Output = ()> + Send;

    /// Nominal pause length, used for the up-front time estimate.
    fn interval(&self) -> Duration;
}

/// Sleeps for the same fixed duration before every playlist but the first.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(Duration);

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self(delay)
    }
}

impl Pacer for FixedDelay {
    fn pause(&self) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(self.0)
    }

    fn interval(&self) -> Duration {
        self.0
    }
}

/// What to do when one playlist's track walk fails for a reason other than
/// throttling or credential expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    #[default]
    Abort,
    /// Mark the playlist as failed in the output and move on.
    Continue,
}

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub max_pages: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

#[derive(Debug)]
pub struct ExportReport {
    pub bundle: ExportBundle,
    /// `total` the playlists collection declared. Progress counts the
    /// playlists actually discovered, which can differ.
    pub declared_total: Option<u64>,
    pub elapsed: Duration,
}

/// Playlists found by the discovery phase, tracks not yet resolved.
#[derive(Debug)]
pub struct Discovery {
    pub playlists: Vec<PlaylistSummary>,
    /// `total` from the first playlists page; carried into [`ExportReport`].
    pub declared_total: Option<u64>,
}

/// Drives one export run: playlist discovery, then sequential track
/// resolution, one playlist at a time.
pub struct Exporter<'a, P, S> {
    client: &'a SpotifyClient,
    pacer: P,
    sink: S,
    settings: ExportSettings,
    state: RunState,
}

impl<'a, P: Pacer, S: ProgressSink> Exporter<'a, P, S> {
    pub fn new(client: &'a SpotifyClient, pacer: P, sink: S) -> Self {
        Self {
            client,
            pacer,
            sink,
            settings: ExportSettings::default(),
            state: RunState::Idle,
        }
    }

    pub fn with_settings(mut self, settings: ExportSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub async fn run(&mut self) -> Result<ExportReport> {
        let started = Instant::now();

        let discovery = match self.discover().await {
            Ok(discovery) => discovery,
            Err(e) => return Err(self.fail(e)),
        };

        let declared_total = discovery.declared_total;
        let mut playlists = discovery.playlists;
        if let Err(e) = self.resolve_tracks(&mut playlists).await {
            return Err(self.fail(e));
        }

        let bundle = match ExportBundle::seal(playlists) {
            Ok(bundle) => bundle,
            Err(e) => return Err(self.fail(e)),
        };
        let elapsed = started.elapsed();

        self.transition(RunState::Completed);
        self.sink.status(&format!(
            "Complete. Exported {} playlists in {} seconds",
            bundle.len(),
            elapsed.as_secs_f64().round()
        ));

        Ok(ExportReport {
            bundle,
            declared_total,
            elapsed,
        })
    }

    /// Phase A: walk the playlists collection and normalize every record.
    pub async fn discover(&mut self) -> Result<Discovery> {
        self.transition(RunState::PlaylistDiscovery);

        let collection = get_playlists(self.client, self.settings.max_pages).await?;
        let declared_total = collection.declared_total;
        let playlists = format_playlists(collection.items);

        if let Some(total) = declared_total {
            if total != playlists.len() as u64 {
                tracing::debug!(
                    declared = total,
                    found = playlists.len(),
                    "declared playlist total differs from items received"
                );
            }
        }

        self.sink.status(&format!(
            "Found {} playlists. Exporting to JSON... (est. {} minutes)",
            playlists.len(),
            utils::estimate_minutes(playlists.len(), self.pacer.interval())
        ));

        Ok(Discovery {
            playlists,
            declared_total,
        })
    }

    /// Phase B: resolve every playlist's tracks in order, pausing between
    /// playlists.
    async fn resolve_tracks(&mut self, playlists: &mut [PlaylistSummary]) -> Result<()> {
        let total = playlists.len();

        for (index, playlist) in playlists.iter_mut().enumerate() {
            if index > 0 {
                self.pacer.pause().await;
            }

            self.transition(RunState::TrackResolution {
                current: index + 1,
                total,
            });
            self.sink.status(&format!(
                "{} ({} tracks)",
                playlist.name, playlist.track_count
            ));

            let Some(href) = playlist.pending_href().map(str::to_string) else {
                self.sink.progress(index + 1, total);
                continue;
            };

            match get_playlist_tracks(self.client, &href, self.settings.max_pages).await {
                Ok(items) => playlist.resolve(format_tracks(items)),
                Err(e) if e.ends_run() => return Err(e),
                Err(e) => match self.settings.failure_policy {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::Continue => {
                        self.sink.warning(&format!(
                            "Could not fetch tracks of \"{}\": {}",
                            playlist.name, e
                        ));
                        playlist.mark_failed(e.to_string());
                    }
                },
            }

            self.sink.progress(index + 1, total);
        }

        Ok(())
    }

    fn transition(&mut self, state: RunState) {
        tracing::debug!(from = %self.state, to = %state, "export state");
        self.state = state;
        self.sink.state_changed(state);
    }

    fn fail(&mut self, error: ExportError) -> ExportError {
        match error.kind() {
            ErrorKind::TransientThrottle => {
                self.transition(RunState::Stalled);
                self.sink
                    .warning("Rate limit exceeded. Please wait and try again later.");
            }
            _ => self.transition(RunState::Aborted),
        }
        error
    }
}
