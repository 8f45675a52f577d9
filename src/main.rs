//! Facial expression recognition for camera, video and still images.

use anyhow::{Context, Result};
use clap::Parser;
use expression_recognition::app::{AppConfig, ExpressionApp, VideoSource};
use expression_recognition::config::Config;
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use
    #[arg(long, default_value = "0")]
    cam: i32,

    /// Video file to process
    #[arg(short, long, conflicts_with = "image")]
    video: Option<String>,

    /// Still image to process
    #[arg(short, long)]
    image: Option<String>,

    /// Write annotated frames to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Emotion model (overrides the configuration)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Haar cascade XML (overrides the configuration)
    #[arg(long)]
    cascade: Option<PathBuf>,

    /// Do not open a preview window
    #[arg(long)]
    headless: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Expression Recognition");

    let mut pipeline_config = match &args.config {
        Some(config_path) => {
            info!("Loading configuration from: {}", config_path.display());
            Config::from_file(config_path)
                .with_context(|| format!("Failed to load config file {}", config_path.display()))?
        }
        None => Config::default(),
    };
    if let Some(model) = args.model {
        pipeline_config.models.emotion_model = model;
    }
    if let Some(cascade) = args.cascade {
        pipeline_config.models.cascade = cascade;
    }
    pipeline_config.validate().context("Invalid configuration")?;
    pipeline_config.validate_resources()?;

    if !expression_recognition::runtime::init() {
        warn!("Inference runtime failed to initialize");
    }

    let video_source = if let Some(image) = args.image {
        VideoSource::Image(image)
    } else if let Some(video) = args.video {
        VideoSource::File(video)
    } else {
        VideoSource::Camera(args.cam)
    };

    let config = AppConfig {
        video_source,
        output: args.output,
        headless: args.headless,
        pipeline: pipeline_config,
    };

    let mut app = ExpressionApp::new(config).context("Failed to initialize application")?;
    app.run()?;

    Ok(())
}
