use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sonify_core::{
    AudioSink, ClockedSink, CursorLayout, Direction, EngineConfig, FrequencyScale, SampleBuffer,
    SampleStats, Size, SonificationEngine, WaveformKind,
};
use tracing_subscriber::EnvFilter;

mod loader;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Render { input, synth, json } => run_render(&input, &synth, json),
        Commands::Preview {
            input,
            synth,
            cursor_width,
            window,
            fps,
        } => run_preview(&input, &synth, cursor_width, window, fps),
    }
}

fn run_render(input: &Path, synth: &SynthArgs, json: bool) -> anyhow::Result<()> {
    let config = synth.engine_config()?;
    let image = loader::load_image(input)?;
    tracing::info!(?input, width = image.width(), height = image.height(), "rendering image");

    let mut engine = SonificationEngine::new(config);
    let buffer = engine.sonify(&image).context("sonify image")?;
    let summary = RenderSummary::new(&buffer, engine.config());

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} samples ({} lines x {}) at {} Hz, {:.3} s, peak {:.3}, rms {:.3}",
            summary.samples,
            summary.lines,
            summary.samples_per_unit,
            summary.sample_rate,
            summary.stats.duration_seconds,
            summary.stats.peak,
            summary.stats.rms,
        );
    }

    Ok(())
}

fn run_preview(
    input: &Path,
    synth: &SynthArgs,
    cursor_width: f32,
    window: WindowSize,
    fps: f32,
) -> anyhow::Result<()> {
    if !fps.is_finite() || fps <= 0.0 {
        bail!("frame rate must be positive, got {fps}");
    }

    let config = synth.engine_config()?;
    let image = loader::load_image(input)?;
    let mut engine = SonificationEngine::new(config);
    let buffer = engine.sonify(&image).context("sonify image")?;
    let mapper = engine.cursor_for(&image)?;
    let layout = CursorLayout::new(
        Size::new(window.width, window.height),
        Size::new(image.width() as f32, image.height() as f32),
        cursor_width,
    );

    let mut sink = ClockedSink::new();
    sink.load(buffer)?;
    tracing::info!(
        seconds = sink.duration_seconds(),
        direction = %mapper.direction(),
        "starting preview playback"
    );
    sink.play();

    let frame_seconds = 1.0 / fps;
    let mut frames = 0_usize;
    while sink.is_playing() {
        let elapsed = sink.elapsed_samples();
        let position = mapper.position(elapsed);
        let rect = layout.rect(&position);
        tracing::info!(
            frame = frames,
            elapsed,
            line = position.line_index,
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "cursor"
        );

        sink.advance(frame_seconds);
        frames += 1;
    }

    tracing::info!(frames, "preview finished");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .try_init();
}

#[derive(Debug, Serialize)]
struct RenderSummary {
    direction: Direction,
    waveform: WaveformKind,
    sample_rate: f32,
    samples: usize,
    lines: usize,
    samples_per_unit: usize,
    #[serde(flatten)]
    stats: SampleStats,
}

impl RenderSummary {
    fn new(buffer: &SampleBuffer, config: &EngineConfig) -> Self {
        Self {
            direction: buffer.direction(),
            waveform: config.waveform,
            sample_rate: buffer.sample_rate(),
            samples: buffer.len(),
            lines: buffer.line_count(),
            samples_per_unit: buffer.samples_per_unit(),
            stats: buffer.stats(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Convert images to audio by traversing them line by line",
    long_about = None
)]
struct Cli {
    /// Enable verbose output for debugging.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sonify an image and print a summary of the generated audio.
    Render {
        /// Image file to sonify.
        input: PathBuf,
        #[command(flatten)]
        synth: SynthArgs,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Sonify an image and simulate playback, logging the cursor each frame.
    Preview {
        /// Image file to sonify.
        input: PathBuf,
        #[command(flatten)]
        synth: SynthArgs,
        /// Width of the cursor in pixels.
        #[arg(long, default_value_t = 5.0, value_name = "WIDTH")]
        cursor_width: f32,
        /// Window size used to lay out the image and cursor.
        #[arg(long, default_value = "800x600", value_name = "WxH")]
        window: WindowSize,
        /// Cursor updates per second of playback.
        #[arg(long, default_value_t = 30.0)]
        fps: f32,
    },
}

/// Synthesis options shared by every command.
#[derive(Args, Debug, Clone, Default)]
struct SynthArgs {
    /// JSON engine configuration; flags given here override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Sample rate for audio output.
    #[arg(short = 'r', long, value_name = "RATE")]
    sample_rate: Option<f32>,
    /// Seconds of audio to generate per unit of image traversal.
    #[arg(short = 'u', long, value_name = "SPU")]
    secs_per_unit: Option<f32>,
    /// Direction to traverse the image (left-to-right, right-to-left,
    /// top-to-bottom, bottom-to-top, circle-outwards, circle-inwards).
    #[arg(short, long, value_name = "DIRECTION")]
    direction: Option<Direction>,
    /// Frequency scale (linear, log, exponential).
    #[arg(short = 's', long, value_name = "SCALE")]
    freq_scale: Option<FrequencyScale>,
    /// Frequency range in Hz.
    #[arg(short, long, value_name = "MIN:MAX")]
    frequency: Option<FrequencyRange>,
    /// Waveform generator (sine, sine-frequency).
    #[arg(short, long, value_name = "WAVEFORM")]
    waveform: Option<WaveformKind>,
}

impl SynthArgs {
    fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)
                .with_context(|| format!("read configuration {}", path.display()))?,
            None => EngineConfig::default(),
        };

        if let Some(sample_rate) = self.sample_rate {
            config.sample_rate = sample_rate;
        }
        if let Some(seconds) = self.secs_per_unit {
            config.seconds_per_unit = seconds;
        }
        if let Some(direction) = self.direction {
            config.direction = direction;
        }
        if let Some(scale) = self.freq_scale {
            config.frequency_map.scale = scale;
        }
        if let Some(range) = self.frequency {
            config.frequency_map.min = range.min;
            config.frequency_map.max = range.max;
        }
        if let Some(waveform) = self.waveform {
            config.waveform = waveform;
        }

        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FrequencyRange {
    min: f32,
    max: f32,
}

impl FromStr for FrequencyRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max) = s
            .split_once(':')
            .ok_or_else(|| format!("expected MIN:MAX, got `{s}`"))?;
        let parse = |value: &str| {
            value
                .trim()
                .parse::<f32>()
                .map_err(|err| format!("invalid frequency `{value}`: {err}"))
        };

        Ok(Self {
            min: parse(min)?,
            max: parse(max)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct WindowSize {
    width: f32,
    height: f32,
}

impl FromStr for WindowSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .split_once('x')
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
        let parse = |value: &str| match value.trim().parse::<f32>() {
            Ok(v) if v > 0.0 => Ok(v),
            _ => Err(format!("invalid window dimension `{value}`")),
        };

        Ok(Self {
            width: parse(width)?,
            height: parse(height)?,
        })
    }
}
