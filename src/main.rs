//! `crosspost` CLI - inspect what would be syndicated for a post

mod cmd;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crosspost::media::MAX_IMAGE_BYTES;
use crosspost::Config;

#[derive(Parser)]
#[command(name = "crosspost")]
#[command(about = "Syndicate IndieWeb posts to a Bluesky-style backend")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/crosspost/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a post from JF2 properties and print the action (dry run)
    Compose {
        /// JSON file with post properties, or `-` for stdin
        file: String,
    },

    /// Fetch link card metadata for a URL
    Metadata {
        /// Page URL
        url: String,
    },

    /// Render a placeholder card thumbnail
    Thumbnail {
        /// Card title
        title: String,

        /// Site name shown along the bottom
        #[arg(short, long, default_value = "")]
        site: String,

        /// Output JPEG path
        #[arg(short, long, default_value = "thumbnail.jpg")]
        output: PathBuf,
    },

    /// Recompress an image under a byte budget
    Compress {
        /// Input image
        file: PathBuf,

        /// Byte budget
        #[arg(short, long, default_value_t = MAX_IMAGE_BYTES)]
        max_bytes: usize,

        /// Output JPEG path (default: `<stem>.compressed.jpg`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a record URI to its public post URL
    PostUrl {
        /// Record URI (`at://{account}/{collection}/{rkey}`)
        uri: String,

        /// Profile base URL (default: from config)
        #[arg(short, long)]
        profile: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load().context("loading config")?,
    };

    match cli.command {
        Commands::Compose { file } => cmd::compose::cmd_compose(config, &file).await?,
        Commands::Metadata { url } => cmd::metadata::cmd_metadata(&config, &url).await?,
        Commands::Thumbnail {
            title,
            site,
            output,
        } => cmd::thumbnail::cmd_thumbnail(&config, &title, &site, &output)?,
        Commands::Compress {
            file,
            max_bytes,
            output,
        } => cmd::compress::cmd_compress(&file, max_bytes, output)?,
        Commands::PostUrl { uri, profile } => {
            let profile = profile.unwrap_or(config.profile_url);
            cmd::post_url::cmd_post_url(&profile, &uri)?;
        }
    }

    Ok(())
}
