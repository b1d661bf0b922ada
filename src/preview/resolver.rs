//! Playhead to source-frame resolution.

use std::path::PathBuf;

use crate::core::clip::ClipId;
use crate::core::time::{self, Seconds};
use crate::core::timeline::Timeline;

/// A frame to fetch from the external media service.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRequest {
    pub clip: ClipId,
    pub source_path: PathBuf,
    /// Offset into the source file
    pub source_time: Seconds,
    /// Offset into the clip, used for throttling
    pub time_in_clip: Seconds,
}

/// Find the clip under `playhead` (first match in sequence order) and map the
/// playhead into its source. `None` when no clip covers the position.
pub fn resolve(timeline: &Timeline, playhead: Seconds) -> Option<PreviewRequest> {
    let clip = timeline.clip_at(playhead)?;

    Some(PreviewRequest {
        clip: clip.id,
        source_path: clip.source_path.clone(),
        source_time: clip.source_time_at(playhead),
        time_in_clip: time::clamp_time(clip.offset_of(playhead), 0.0, clip.duration),
    })
}

/// Bounds the rate of preview requests during playback.
///
/// Outside playback every request passes. While playing, a request on the same
/// clip passes only once clip time moved at least `min_step` since the last
/// request that passed. Switching clips always passes.
#[derive(Debug, Clone)]
pub struct PreviewThrottle {
    min_step: Seconds,
    last: Option<(ClipId, Seconds)>,
}

impl PreviewThrottle {
    pub fn new(min_step: Seconds) -> Self {
        Self { min_step, last: None }
    }

    pub fn should_resolve(&mut self, request: &PreviewRequest, playing: bool) -> bool {
        let due = match self.last {
            None => true,
            Some((clip, time_in_clip)) => {
                !playing
                    || clip != request.clip
                    || (request.time_in_clip - time_in_clip).abs() >= self.min_step
            }
        };
        if due {
            self.last = Some((request.clip, request.time_in_clip));
        }
        due
    }

    /// Forget the last request (stop, no clip under the playhead, new project).
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for PreviewThrottle {
    fn default() -> Self {
        Self::new(0.3)
    }
}
