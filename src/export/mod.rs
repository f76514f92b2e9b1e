//! # Export pipeline
//!
//! Turns the user's playlist library into an [`ExportBundle`]:
//!
//! ```text
//! Exporter::run
//!     ├── discover          GET /me/playlists (all pages) → PlaylistSummary
//!     └── resolve_tracks    per playlist, sequentially:
//!             pause → GET <tracks href> (all pages) → Track → progress(i, N)
//! ```
//!
//! - [`model`] - playlist, track and bundle types as they appear in the JSON
//! - [`normalize`] - API records to model types
//! - [`orchestrator`] - the run state machine, pacing and progress reporting
//! - [`output`] - file naming and serialization

pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod output;

pub use model::{Artist, ExportBundle, PlaylistSummary, Track, Tracks};
pub use orchestrator::{
    ExportReport, ExportSettings, Exporter, FailurePolicy, FixedDelay, Pacer, ProgressSink,
    RunState,
};
