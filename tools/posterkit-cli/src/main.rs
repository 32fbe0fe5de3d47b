//! PosterKit CLI: command-line host for the layer composition engine.
//!
//! Usage:
//!   posterkit compose <PROFILE> --background <IMG> -o <PNG>   Render a poster
//!   posterkit overlay <PROFILE> --video <URI> -o <DIR>        Export a video overlay bundle
//!   posterkit layout <PROFILE>                                Print generated layers as JSON
//!   posterkit templates                                       List template styles
//!   posterkit check-frame <FRAME>                             Validate a frame file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use posterkit_common::config::{AppConfig, LoggingConfig};

mod commands;

use commands::SessionArgs;

#[derive(Parser)]
#[command(
    name = "posterkit",
    about = "Branded poster and reel overlays from business profiles",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/posterkit/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a still poster over a background image
    Compose {
        #[command(flatten)]
        session: SessionArgs,

        /// Background image
        #[arg(long)]
        background: PathBuf,

        /// Output PNG path
        #[arg(short, long, default_value = "poster.png")]
        output: PathBuf,

        /// Skip the watermark (entitled user)
        #[arg(long)]
        entitled: bool,

        /// TTF/OTF font used for text layers
        #[arg(long)]
        font: Option<PathBuf>,

        /// Output pixels per canvas unit
        #[arg(long, default_value = "1.0")]
        pixel_ratio: f64,
    },

    /// Export a transparent overlay and layer geometry for a video compositor
    Overlay {
        #[command(flatten)]
        session: SessionArgs,

        /// Source video reference passed through to the compositor
        #[arg(long)]
        video: String,

        /// Output directory for overlay.png and overlay.json
        #[arg(short, long, default_value = "overlay")]
        output: PathBuf,

        /// Skip the watermark (entitled user)
        #[arg(long)]
        entitled: bool,

        /// TTF/OTF font used for text layers
        #[arg(long)]
        font: Option<PathBuf>,

        /// Output pixels per canvas unit
        #[arg(long, default_value = "1.0")]
        pixel_ratio: f64,
    },

    /// Print the generated layer list as JSON
    Layout {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// List built-in template styles
    Templates,

    /// Validate a frame file and show its resolved placeholders
    CheckFrame {
        /// Path to the frame JSON
        path: PathBuf,

        /// Canvas width to resolve against
        #[arg(long)]
        width: Option<f64>,

        /// Canvas height to resolve against
        #[arg(long)]
        height: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };

    // Initialize logging
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    posterkit_common::logging::init_logging(&LoggingConfig {
        level,
        json: config.logging.json,
    });

    match cli.command {
        Commands::Compose {
            session,
            background,
            output,
            entitled,
            font,
            pixel_ratio,
        } => {
            commands::compose::run(
                &config,
                session,
                background,
                output,
                entitled,
                font,
                pixel_ratio,
            )
            .await
        }
        Commands::Overlay {
            session,
            video,
            output,
            entitled,
            font,
            pixel_ratio,
        } => {
            commands::overlay::run(&config, session, video, output, entitled, font, pixel_ratio)
                .await
        }
        Commands::Layout { session } => commands::layout::run(&config, session),
        Commands::Templates => commands::templates::run(),
        Commands::CheckFrame {
            path,
            width,
            height,
        } => commands::check_frame::run(&config, path, width, height),
    }
}
