use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use splex::{cli, config, error, logging, warning};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Print diagnostic logs to stderr (overridden by RUST_LOG)
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Export all playlists and their tracks to a JSON file
    Export(ExportArgs),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ExportArgs {
    /// Bearer token to use instead of authorizing (defaults to SPOTIFY_ACCESS_TOKEN)
    #[clap(long)]
    pub token: Option<String>,

    /// Redirect URL carrying `#access_token=...` from an implicit grant
    #[clap(long, conflicts_with = "token")]
    pub callback_url: Option<String>,

    /// Directory the JSON file is written to
    #[clap(long)]
    pub output_dir: Option<PathBuf>,

    /// Pause between playlists in milliseconds
    #[clap(long)]
    pub delay_ms: Option<u64>,

    /// Upper bound of pages fetched per collection
    #[clap(long)]
    pub max_pages: Option<usize>,

    /// Retry a rate-limited request this many times, honoring Retry-After
    #[clap(long, default_value_t = 0)]
    pub throttle_retries: u32,

    /// Keep exporting when a playlist's tracks cannot be fetched; the
    /// playlist is marked with an error in the output
    #[clap(long)]
    pub keep_going: bool,

    /// Write indented JSON
    #[clap(long)]
    pub pretty: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

impl From<ExportArgs> for cli::ExportOptions {
    fn from(args: ExportArgs) -> Self {
        cli::ExportOptions {
            token: args.token,
            callback_url: args.callback_url,
            output_dir: args.output_dir,
            delay_ms: args.delay_ms,
            max_pages: args.max_pages,
            throttle_retries: args.throttle_retries,
            keep_going: args.keep_going,
            pretty: args.pretty,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose) {
        warning!("Diagnostic logging unavailable. Err: {}", e);
    }

    match cli.command {
        Command::Export(args) => cli::export(args.into()).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
