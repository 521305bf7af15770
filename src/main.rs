use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thumbcascade::config::{self, ThumbnailConfig};
use thumbcascade::imaging::Thumbnailer;
use thumbcascade::output::{self, BackendStatus};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Overrides applied on top of the config file.
#[derive(clap::Args, Clone)]
struct ConfigArgs {
    /// TOML config file (see `gen-config`)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Bounding box width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Bounding box height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Output format: jpeg (or jpg), png, gif
    #[arg(long)]
    format: Option<String>,

    /// JPEG quality, 0-100
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    quality: Option<u32>,

    /// Largest accepted source file, in bytes
    #[arg(long)]
    max_bytes: Option<u64>,

    /// Largest accepted source area, in pixels
    #[arg(long)]
    max_pixels: Option<u64>,
}

impl ConfigArgs {
    /// Load the config file (or stock defaults), apply overrides, validate.
    fn resolve(&self) -> Result<ThumbnailConfig, config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => ThumbnailConfig::default(),
        };

        if let Some(width) = self.width {
            config.target_width = width;
        }
        if let Some(height) = self.height {
            config.target_height = height;
        }
        if let Some(format) = &self.format {
            config.set_target_format(format)?;
        }
        if let Some(quality) = self.quality {
            config = config.with_jpeg_quality(quality);
        }
        if let Some(max_bytes) = self.max_bytes {
            config.source_max_bytes = max_bytes;
        }
        if let Some(max_pixels) = self.max_pixels {
            config.source_max_pixels = max_pixels;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Parser)]
#[command(name = "thumbcascade")]
#[command(version)]
#[command(about = "Create image thumbnails with whichever backend works")]
#[command(long_about = "\
Create image thumbnails with whichever backend works

Backends are tried in a fixed order until one of them writes the thumbnail:

  1. imagemagick   the `convert` program, run as a subprocess
  2. libvips       linked in when built with the `vips` feature
  3. image-rs      built-in decoders (GIF, JPEG, PNG)

A backend that cannot read the source steps aside for the next one. A source
over the byte or pixel budget fails immediately and nothing is written.

Run 'thumbcascade gen-config' to generate a documented config file.")]
struct Cli {
    /// Log backend decisions (same as RUST_LOG=thumbcascade=debug)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a thumbnail of SOURCE at TARGET
    Create {
        source: PathBuf,
        target: PathBuf,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// List the backends in cascade order and whether each can run here
    Backends {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Create {
            source,
            target,
            config,
        } => {
            let thumbnailer = Thumbnailer::new(config.resolve()?);
            let thumbnail = thumbnailer.create(&source, &target)?;
            output::print_thumbnail(&thumbnail, &source);
        }
        Command::Backends { config } => {
            let thumbnailer = Thumbnailer::new(config.resolve()?);
            let statuses: Vec<BackendStatus> = thumbnailer
                .backends()
                .map(|backend| BackendStatus {
                    name: backend.name(),
                    detail: backend.detail(),
                    available: backend.is_available(),
                })
                .collect();
            output::print_backends(&statuses, thumbnailer.config());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "thumbcascade=debug"
    } else {
        "thumbcascade=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
