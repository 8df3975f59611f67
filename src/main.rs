//! Binary entrypoint for the image viewer.
//!
//! Parses arguments, sets up logging and hands over to the library crate.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use image_viewer::{Error, ViewerConfig, ZoomFactor, input::CONTROLS_HELP};
use tracing::{Level, error};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(
    name = "image-viewer",
    version,
    about = "Display an image with stepped zoom, panning and flipping",
    after_help = CONTROLS_HELP
)]
struct Cli {
    /// Image file to open.
    #[arg(value_name = "IMAGE_FILE")]
    image: PathBuf,

    /// Highest zoom factor reachable with the mouse wheel (power of two).
    #[arg(long, value_name = "FACTOR", default_value = "16")]
    max_zoom: ZoomFactor,

    /// Target frame duration, e.g. "16ms".
    #[arg(long, value_name = "DURATION", default_value = "16ms", value_parser = humantime::parse_duration)]
    frame_period: Duration,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("image_viewer={level}").parse()?)
        .add_directive("winit=warn".parse()?)
        .add_directive("softbuffer=warn".parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        // Window creation failures are already reported where they happen.
        if !matches!(err.downcast_ref::<Error>(), Some(Error::Window(_))) {
            error!(error = ?err, "image-viewer exited with error");
        }
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = ViewerConfig {
        max_zoom: cli.max_zoom,
        frame_period: cli.frame_period,
        ..ViewerConfig::default()
    };
    config.validate().context("validating options")?;

    image_viewer::run(&cli.image, &config)
        .with_context(|| format!("viewing {}", cli.image.display()))
}
