//! Command-line entry point.
//!
//! Runs the editing engine headless against the ffmpeg tools: probe files,
//! extract preview frames, print or render the export list, or play a
//! timeline through the editing thread while logging preview updates.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use reelcut::editor::{Editor, EditorEvent, EditorRuntime, Feedback, Intent};
use reelcut::media::{FfmpegCli, FrameExtractor, MediaProbe};
use reelcut::EngineConfig;

/// Headless timeline editor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Engine configuration (JSON)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the duration of a media file
    Probe { file: PathBuf },
    /// Extract one frame as PNG
    Frame {
        file: PathBuf,
        /// Source time in seconds
        #[arg(long)]
        at: f64,
        #[arg(long, value_name = "PNG")]
        out: PathBuf,
    },
    /// Lay the files out back to back and print the ffmpeg concat list
    Concat {
        /// Print the segment triples as JSON instead
        #[arg(long)]
        json: bool,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Lay the files out back to back and render them into one file
    Export {
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Play the files as one timeline, logging preview updates until the end
    Play {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn build_editor(config: EngineConfig, probe: &dyn MediaProbe, files: &[PathBuf]) -> Editor {
    let mut editor = Editor::new(config);
    for file in files {
        let feedback = editor.add_media(file, probe.probe_duration(file));
        info!("{feedback}");
    }
    editor
}

fn play(config: EngineConfig, ffmpeg: FfmpegCli, files: &[PathBuf]) -> Result<()> {
    let ffmpeg = Arc::new(ffmpeg);
    let runtime = EditorRuntime::spawn(config, ffmpeg.clone(), ffmpeg).context("starting editor runtime")?;

    for file in files {
        runtime.add_media(file);
    }
    runtime.send(Intent::SetPlayhead(0.0));
    runtime.send(Intent::Play);

    while let Ok(event) = runtime.events().recv() {
        match event {
            EditorEvent::Feedback(Feedback::NothingToPlay) => bail!("nothing to play"),
            EditorEvent::Feedback(feedback) => info!("{feedback}"),
            EditorEvent::PlayheadAdvanced(_) => {}
            EditorEvent::PreviewFrame(frame) => info!(
                path = %frame.source_path.display(),
                source_time = frame.source_time,
                bytes = frame.len(),
                "preview frame"
            ),
            EditorEvent::PreviewCleared => info!("preview cleared"),
            EditorEvent::PreviewFailed { path, message } => {
                warn!(path = %path.display(), "preview failed: {message}")
            }
            EditorEvent::PlaybackFaulted(message) => bail!("playback fault: {message}"),
            EditorEvent::PlaybackFinished(position) => {
                info!(position, "playback finished");
                break;
            }
        }
    }

    runtime.shutdown();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_deref())?;
    let ffmpeg = FfmpegCli::from_config(&config);

    match args.command {
        Command::Probe { file } => {
            let duration = ffmpeg
                .probe_duration(&file)
                .with_context(|| format!("probing {}", file.display()))?;
            println!("{duration:.3}");
        }
        Command::Frame { file, at, out } => {
            let frame = ffmpeg
                .extract_frame(&file, at)
                .with_context(|| format!("extracting frame at {at}s from {}", file.display()))?;
            std::fs::write(&out, &frame.data).with_context(|| format!("writing {}", out.display()))?;
            info!(out = %out.display(), bytes = frame.len(), "frame written");
        }
        Command::Concat { json, files } => {
            let editor = build_editor(config, &ffmpeg, &files);
            let plan = editor.export_plan()?;
            if json {
                println!("{}", serde_json::to_string_pretty(plan.segments())?);
            } else {
                print!("{}", plan.concat_list());
            }
        }
        Command::Export { out, files } => {
            if !ffmpeg.is_available() {
                bail!("ffmpeg is not available");
            }
            let editor = build_editor(config, &ffmpeg, &files);
            let plan = editor.export_plan()?;
            ffmpeg.export(&plan, &out).context("export failed")?;
            info!(out = %out.display(), duration = plan.total_duration(), "export finished");
        }
        Command::Play { files } => play(config, ffmpeg, &files)?,
    }

    Ok(())
}
