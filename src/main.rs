use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber;

use ivray::{
    config::Config,
    pipeline::ConversionEngine,
    tracer::TracerRegistry,
};

#[derive(Parser)]
#[command(
    name = "ivray",
    version,
    about = "Trace a video into an IVRY vector table",
    long_about = "ivray decomposes a video into frames, traces every frame into a list of 2-D beam displacements, and stores the per-frame lists in a compact binary table for oscilloscope-style vector-scan playback."
)]
struct Cli {
    /// Input video file (anything ffmpeg can open)
    #[arg(short, long, default_value = "./input.mp4")]
    input: PathBuf,

    /// Output vector table file
    #[arg(short, long, default_value = "./out.ivry")]
    output: PathBuf,

    /// Frames per second to extract (overrides the config file)
    #[arg(short, long)]
    frame_rate: Option<u32>,

    /// Tracer to reduce frames with (edge, scan)
    #[arg(short, long, default_value = "edge")]
    tracer: String,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Input video file given positionally; overrides --input
    #[arg(value_name = "INPUT")]
    positional_input: Option<PathBuf>,
}

impl Cli {
    /// The input path to use: the positional form wins over `--input`.
    fn input_path(&self) -> PathBuf {
        self.positional_input
            .clone()
            .unwrap_or_else(|| self.input.clone())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    let input = cli.input_path();

    info!("Starting ivray v{}", env!("CARGO_PKG_VERSION"));
    info!("Input: {:?}", input);
    info!("Output: {:?}", cli.output);
    info!("Tracer: {}", cli.tracer);

    // Load configuration
    let mut config = match cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(&config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    if let Some(frame_rate) = cli.frame_rate {
        config.extraction.frame_rate = frame_rate;
    }
    config.validate()?;

    // Initialize tracer registry and get the requested tracer
    let registry = TracerRegistry::new();
    let tracer = registry.get_tracer(&cli.tracer).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown tracer: {} (available: {})",
            cli.tracer,
            registry.available_tracers().join(", ")
        )
    })?;

    info!("Using {} tracer", tracer.name());

    // Create and run the conversion engine
    let mut engine = ConversionEngine::new(config, tracer);

    let summary = engine.convert(&input, &cli.output).await?;

    info!(
        "Done: {} frames, {} vectors, {} bytes written to {}",
        summary.frames, summary.vectors, summary.output_bytes, summary.output_path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_input_overrides_flag() {
        let cli = Cli::try_parse_from(["ivray", "-i", "flag.mp4", "clip.mp4"]).unwrap();

        assert_eq!(cli.input_path(), PathBuf::from("clip.mp4"));
    }

    #[test]
    fn test_input_falls_back_to_flag_default() {
        let cli = Cli::try_parse_from(["ivray"]).unwrap();

        assert_eq!(cli.input_path(), PathBuf::from("./input.mp4"));
    }
}
