/// Folio - music portfolio in the terminal
use anyhow::Context;
use clap::{Parser, Subcommand};
use folio::{load_catalog, view, FolioConfig, Session};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio music portfolio player", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./folio.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the album grid
    Albums,
    /// Show one album's track list
    Album {
        /// Album id
        id: String,
    },
    /// Play an album
    Play {
        /// Album id
        #[arg(short, long)]
        album: String,
        /// Track to start from (0-based)
        #[arg(short, long)]
        track: Option<usize>,
        /// Shuffle the album
        #[arg(short, long)]
        shuffle: bool,
        /// How long to keep playing, in seconds
        #[arg(long, default_value_t = 30)]
        seconds: u64,
    },
    /// Shuffle every track in the catalog
    ShuffleAll {
        /// How long to keep playing, in seconds
        #[arg(long, default_value_t = 30)]
        seconds: u64,
    },
    /// Run the mashup banner
    Mashup {
        /// How long to keep playing, in seconds
        #[arg(long, default_value_t = 60)]
        seconds: u64,
        /// Album to start on the player afterwards (stops the mashup)
        #[arg(long, value_name = "ALBUM")]
        then_play: Option<String>,
    },
    /// Print a share link
    Share {
        /// Album id (grid link when omitted)
        #[arg(short, long)]
        album: Option<String>,
        /// Track index (0-based)
        #[arg(short, long)]
        track: Option<usize>,
    },
    /// Open a share link
    Open {
        /// Share link URL
        link: String,
        /// How long to keep playing, in seconds
        #[arg(long, default_value_t = 30)]
        seconds: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info,folio_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = FolioConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let catalog = load_catalog(&config.catalog).await?;
    let session = Session::new(config, catalog);

    match cli.command {
        Commands::Albums => {
            print!("{}", view::grid(session.catalog()));
        }
        Commands::Album { id } => {
            let album = session
                .catalog()
                .album(&id)
                .with_context(|| format!("Album not found: {}", id))?;
            print!("{}", view::album_detail(album, None));
        }
        Commands::Play {
            album,
            track,
            shuffle,
            seconds,
        } => {
            session
                .play_album(&album, track, shuffle, Duration::from_secs(seconds))
                .await?;
        }
        Commands::ShuffleAll { seconds } => {
            session.shuffle_all(Duration::from_secs(seconds)).await?;
        }
        Commands::Mashup { seconds, then_play } => {
            session
                .mashup(Duration::from_secs(seconds), then_play.as_deref())
                .await?;
        }
        Commands::Share { album, track } => {
            println!("{}", session.share_link(album, track)?);
        }
        Commands::Open { link, seconds } => {
            session.open(&link, Duration::from_secs(seconds)).await?;
        }
    }

    Ok(())
}
