//! `ffmpeg` / `ffprobe` command-line adapter.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::core::time::Seconds;
use crate::export::ExportPlan;
use crate::media::{Frame, FrameExtractor, MediaError, MediaProbe};

/// Runs the ffmpeg tools found at the configured paths.
#[derive(Debug, Clone)]
pub struct FfmpegCli {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegCli {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.ffmpeg_path, &config.ffprobe_path)
    }

    /// `ffmpeg -version` runs and exits successfully.
    pub fn is_available(&self) -> bool {
        Command::new(&self.ffmpeg)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn run(tool: &Path, command: &mut Command) -> Result<Output, MediaError> {
        let tool_name = tool.display().to_string();
        let output = command.output().map_err(|source| MediaError::ToolMissing {
            tool: tool_name.clone(),
            source,
        })?;

        if !output.status.success() {
            let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(MediaError::ToolFailed {
                tool: tool_name,
                message,
            });
        }
        Ok(output)
    }

    /// Render `plan` into `output` with the concat demuxer.
    ///
    /// The concat list is written next to the output file and removed afterwards.
    pub fn export(&self, plan: &ExportPlan, output: &Path) -> Result<(), MediaError> {
        let list_path = output.with_extension("concat.txt");
        {
            let mut file = std::fs::File::create(&list_path)?;
            file.write_all(plan.concat_list().as_bytes())?;
        }

        info!(segments = plan.len(), output = %output.display(), "exporting timeline");
        let result = Self::run(
            &self.ffmpeg,
            Command::new(&self.ffmpeg)
                .args(["-v", "error", "-y", "-f", "concat", "-safe", "0", "-i"])
                .arg(&list_path)
                .args(["-c", "copy"])
                .arg(output),
        );

        if let Err(err) = std::fs::remove_file(&list_path) {
            debug!(error = %err, "could not remove concat list");
        }
        result.map(|_| ())
    }
}

impl Default for FfmpegCli {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl MediaProbe for FfmpegCli {
    fn probe_duration(&self, path: &Path) -> Result<Seconds, MediaError> {
        let output = Self::run(
            &self.ffprobe,
            Command::new(&self.ffprobe)
                .args(["-v", "error", "-show_entries", "format=duration"])
                .args(["-of", "default=noprint_wrappers=1:nokey=1"])
                .arg(path),
        )?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let duration = parse_duration(&stdout).ok_or_else(|| MediaError::BadOutput {
            tool: self.ffprobe.display().to_string(),
            output: stdout.trim().to_string(),
        })?;

        if duration <= 0.0 {
            return Err(MediaError::Unavailable(path.to_path_buf()));
        }
        debug!(path = %path.display(), duration, "probed duration");
        Ok(duration)
    }
}

impl FrameExtractor for FfmpegCli {
    fn extract_frame(&self, path: &Path, source_time: Seconds) -> Result<Frame, MediaError> {
        let output = Self::run(
            &self.ffmpeg,
            Command::new(&self.ffmpeg)
                .args(["-v", "error", "-ss"])
                .arg(format!("{:.3}", source_time.max(0.0)))
                .arg("-i")
                .arg(path)
                .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "-"]),
        )?;

        if output.stdout.is_empty() {
            return Err(MediaError::Unavailable(path.to_path_buf()));
        }
        Ok(Frame::new(path, source_time, output.stdout))
    }
}

/// Parse the first line of ffprobe's bare `format=duration` output.
pub fn parse_duration(output: &str) -> Option<Seconds> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}
