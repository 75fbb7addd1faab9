//! CLI binary for speakdown.

use anyhow::bail;
use clap::{Parser, Subcommand};
use speakdown::audio::{self, AudioStats};
use speakdown::markup::{self, Segment};
use speakdown::{RenderConfig, synth};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Speakdown: markup-driven text-to-speech rendering.
#[derive(Parser)]
#[command(name = "speakdown", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Render markup text to a WAV file.
    Render {
        /// Text to render.
        #[arg(long)]
        text: Option<String>,

        /// Path to a text file instead of direct text.
        #[arg(long)]
        text_file: Option<PathBuf>,

        /// Output WAV file path.
        #[arg(short, long)]
        output: PathBuf,

        /// Override the base length scale from config.
        #[arg(long)]
        length_scale: Option<f32>,
    },

    /// Parse markup and print the segments without synthesizing.
    Segments {
        /// Text to parse.
        #[arg(long)]
        text: Option<String>,

        /// Path to a text file instead of direct text.
        #[arg(long)]
        text_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing — suppress noisy dependency logs by default.
    // Users can override with RUST_LOG=debug to see everything.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("speakdown=info,ort=warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        RenderConfig::from_file(path)?
    } else {
        RenderConfig::default()
    };

    match cli.command {
        Command::Render {
            text,
            text_file,
            output,
            length_scale,
        } => {
            let input = read_input(text, text_file)?;
            run_render(config, &input, &output, length_scale).await
        }
        Command::Segments { text, text_file } => {
            let input = read_input(text, text_file)?;
            run_segments(&config, &input)
        }
    }
}

/// Resolve the input text from `--text` or `--text-file`.
fn read_input(text: Option<String>, text_file: Option<PathBuf>) -> anyhow::Result<String> {
    match (text, text_file) {
        (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
        (Some(text), None) => Ok(text),
        (Some(_), Some(_)) => bail!("--text and --text-file are mutually exclusive"),
        (None, None) => bail!("either --text or --text-file must be provided"),
    }
}

async fn run_render(
    mut config: RenderConfig,
    input: &str,
    output: &std::path::Path,
    length_scale: Option<f32>,
) -> anyhow::Result<()> {
    if let Some(scale) = length_scale {
        config.synth.base_length_scale = scale;
    }

    // An empty document is not an error; it renders to an empty WAV.
    let doc = markup::segment_with(input, &config.markup.options())?;

    let mut synth = synth::from_config(&config)?;
    let samples = audio::render(&doc, synth.as_mut()).await?;
    let sample_rate = synth.sample_rate();
    audio::write_wav_mono(output, &samples, sample_rate)?;

    let stats = AudioStats::measure(&samples, sample_rate);
    println!("Wrote {} ({stats})", output.display());
    Ok(())
}

fn run_segments(config: &RenderConfig, input: &str) -> anyhow::Result<()> {
    let doc = markup::segment_with(input, &config.markup.options())?;
    for (idx, segment) in doc.segments().iter().enumerate() {
        match segment {
            Segment::Speech { text, rate } => {
                println!("{idx:3}  speech [{rate:?}] {text:?}");
            }
            Segment::Silence { seconds } => {
                println!("{idx:3}  silence {seconds}s");
            }
        }
    }
    if doc.is_empty() {
        println!("(no segments)");
    }
    Ok(())
}
