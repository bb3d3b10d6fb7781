use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use flowline::{
    animation::Gyro,
    config::Config,
    studio::{ArtStudio, Artifact},
};

#[derive(Parser)]
#[command(
    name = "flowline",
    version,
    about = "Generate curved-line artwork and animate it",
    long_about = "Flowline draws abstract artwork from flowing Bézier curves. Every artwork is saved as a JSON snapshot that can be animated frame by frame or rendered to video."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a new artwork
    Generate {
        /// Output PNG path
        #[arg(short, long, default_value = "flowline.png")]
        output: PathBuf,

        /// Where to write the JSON snapshot (defaults to the output path with .json)
        #[arg(long)]
        state: Option<PathBuf>,

        /// Seed; overrides the configured one
        #[arg(long)]
        seed: Option<u64>,

        /// Image size in pixels; overrides the configured one
        #[arg(long)]
        size: Option<u32>,

        /// Number of curves; overrides the configured one
        #[arg(long)]
        amount: Option<usize>,
    },

    /// Render a single animation frame of a snapshot
    Frame {
        /// JSON snapshot written by `generate` with the configured generation parameters
        #[arg(short, long)]
        state: PathBuf,

        /// Output PNG path
        #[arg(short, long, default_value = "frame.png")]
        output: PathBuf,

        /// Animation time, 0.0 to 1.0
        #[arg(short, long, default_value_t = 0.0)]
        time: f64,

        /// Horizontal tilt, -1.0 to 1.0
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        gyro_x: f64,

        /// Vertical tilt, -1.0 to 1.0
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        gyro_y: f64,
    },

    /// Render a snapshot's animation to an MP4 video
    Video {
        /// JSON snapshot written by `generate` with the configured generation parameters
        #[arg(short, long)]
        state: PathBuf,

        /// Output video path
        #[arg(short, long, default_value = "flowline.mp4")]
        output: PathBuf,

        /// Duration in seconds; overrides the configured one
        #[arg(short, long)]
        duration: Option<f64>,

        /// Frames per second; overrides the configured rate
        #[arg(long)]
        fps: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting Flowline v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    match cli.command {
        Command::Generate { output, state, seed, size, amount } => {
            let mut config = config;
            if let Some(size) = size {
                config.generation.params.size = size;
            }
            if let Some(amount) = amount {
                config.generation.params.amount = amount;
            }
            config.validate()?;

            let mut studio = ArtStudio::from_config(&config);
            let art = studio.generate(config.generation.params, seed.or(config.generation.seed))?;

            write_artifact(&output, &art.image).await?;
            let state_path = state.unwrap_or_else(|| output.with_extension("json"));
            tokio::fs::write(&state_path, studio.export(art.id)?)
                .await
                .with_context(|| format!("writing snapshot {:?}", state_path))?;

            info!("Seed: {}", art.seed);
            info!("Snapshot saved to: {:?}", state_path);
        }

        Command::Frame { state, output, time, gyro_x, gyro_y } => {
            config.validate()?;
            let mut studio = ArtStudio::from_config(&config);
            let id = import_snapshot(&mut studio, &config, &state).await?;

            let gyro = Gyro::new(gyro_x, gyro_y);
            let frame = studio.frame(id, &config.animation, time, gyro)?;
            write_artifact(&output, &frame).await?;
        }

        Command::Video { state, output, duration, fps } => {
            let mut config = config;
            if let Some(duration) = duration {
                config.video.duration_seconds = duration;
            }
            if let Some(fps) = fps {
                config.video.params.fps = fps;
            }
            config.validate()?;

            let mut studio = ArtStudio::from_config(&config);
            let id = import_snapshot(&mut studio, &config, &state).await?;

            info!("Starting video synthesis...");
            let video = tokio::task::spawn_blocking(move || {
                let mut last_reported = 0;
                studio.video(
                    id,
                    &config.animation,
                    config.video.duration_seconds,
                    &config.video.params,
                    |progress| {
                        let percent = (progress.fraction() * 100.0) as u32;
                        if percent >= last_reported + 10 || progress.frames_done == progress.total_frames {
                            info!("   {}% ({}/{} frames)", percent, progress.frames_done, progress.total_frames);
                            last_reported = percent;
                        }
                        ControlFlow::Continue(())
                    },
                )
            })
            .await??;

            info!("   {} frames at {}x{}, {:.1}s", video.frame_count, video.frame_size, video.frame_size, video.duration());
            write_artifact(&output, &Artifact::mp4(video.data)).await?;
        }
    }

    Ok(())
}

async fn import_snapshot(studio: &mut ArtStudio, config: &Config, path: &Path) -> Result<u64> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading snapshot {:?}", path))?;
    Ok(studio.import(&json, config.generation.params)?)
}

async fn write_artifact(path: &Path, artifact: &Artifact) -> Result<()> {
    tokio::fs::write(path, &artifact.data)
        .await
        .with_context(|| format!("writing {:?}", path))?;
    info!("🎉 Saved {} bytes to {:?}", artifact.data.len(), path);
    Ok(())
}
