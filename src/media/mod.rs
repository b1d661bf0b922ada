//! Narrow interfaces to the external media-processing service.
//!
//! The engine never decodes media itself. It asks a `MediaProbe` for source
//! durations and a `FrameExtractor` for still frames, both addressed by file
//! path and source-time offset.

pub mod ffmpeg;

pub use ffmpeg::FfmpegCli;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::time::Seconds;

/// Error type for the media collaborators
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("media unavailable: {}", .0.display())]
    Unavailable(PathBuf),
    #[error("{tool} could not be started: {source}")]
    ToolMissing {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },
    #[error("unexpected {tool} output: {output:?}")]
    BadOutput { tool: String, output: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame extractor panicked: {0}")]
    ExtractorPanicked(String),
}

/// A still image extracted from a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub source_path: PathBuf,
    pub source_time: Seconds,
    /// Encoded image bytes (PNG from the ffmpeg adapter)
    pub data: Arc<[u8]>,
}

impl Frame {
    pub fn new(source_path: impl Into<PathBuf>, source_time: Seconds, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            source_path: source_path.into(),
            source_time,
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Media metadata provider.
pub trait MediaProbe: Send + Sync {
    /// Duration of the source in seconds. Errors mean "unavailable"; the
    /// caller decides what duration to use instead.
    fn probe_duration(&self, path: &Path) -> Result<Seconds, MediaError>;
}

/// Frame extraction service. Calls may be slow and must stay off the editing thread.
pub trait FrameExtractor: Send + Sync {
    fn extract_frame(&self, path: &Path, source_time: Seconds) -> Result<Frame, MediaError>;
}

impl<T: MediaProbe + ?Sized> MediaProbe for Arc<T> {
    fn probe_duration(&self, path: &Path) -> Result<Seconds, MediaError> {
        (**self).probe_duration(path)
    }
}

impl<T: FrameExtractor + ?Sized> FrameExtractor for Arc<T> {
    fn extract_frame(&self, path: &Path, source_time: Seconds) -> Result<Frame, MediaError> {
        (**self).extract_frame(path, source_time)
    }
}
