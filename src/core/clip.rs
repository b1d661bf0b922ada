//! Clip data structure representing a trimmed window of source media on the timeline.
//!
//! Key concepts:
//! - **Timeline time** (`start_time`, `end_time()`): where the clip sits on the timeline
//! - **Source time** (`trim_start`, `trim_end`): the window of the source file it plays
//!
//! Both ranges always have the same length: `trim_end - trim_start == duration`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::time::{self, Seconds, EPSILON};

/// Unique identifier for a clip
pub type ClipId = u64;

/// Per-clip adjustment values. Carried with the clip, not interpreted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipAdjustments {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub volume: f64,
    pub speed: f64,
    pub fade_in: Seconds,
    pub fade_out: Seconds,
}

impl Default for ClipAdjustments {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 100.0,
            saturation: 100.0,
            volume: 100.0,
            speed: 100.0,
            fade_in: 0.0,
            fade_out: 0.0,
        }
    }
}

/// The four interval values of a clip, captured or restored together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipGeometry {
    pub start_time: Seconds,
    pub duration: Seconds,
    pub trim_start: Seconds,
    pub trim_end: Seconds,
}

impl ClipGeometry {
    pub fn end_time(&self) -> Seconds {
        self.start_time + self.duration
    }

    /// Geometry a clip may legally hold: finite, positive duration, non-negative
    /// positions and a trim window exactly as long as the duration.
    pub fn is_valid(&self) -> bool {
        let finite = [self.start_time, self.duration, self.trim_start, self.trim_end]
            .iter()
            .all(|v| v.is_finite());

        finite
            && self.duration > EPSILON
            && self.start_time >= -EPSILON
            && self.trim_start >= -EPSILON
            && time::approx_eq(self.trim_end - self.trim_start, self.duration)
    }
}

/// A clip placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub source_path: PathBuf,
    pub display_name: String,
    pub start_time: Seconds, // Position on timeline
    pub duration: Seconds,
    pub trim_start: Seconds, // Offset into source media
    pub trim_end: Seconds,
    #[serde(default)]
    pub adjustments: ClipAdjustments,
}

impl Clip {
    /// Create a clip playing the source from its beginning: trim window `[0, duration)`.
    pub fn new(
        id: ClipId,
        source_path: impl Into<PathBuf>,
        display_name: impl Into<String>,
        start_time: Seconds,
        duration: Seconds,
    ) -> Self {
        Self {
            id,
            source_path: source_path.into(),
            display_name: display_name.into(),
            start_time,
            duration,
            trim_start: 0.0,
            trim_end: duration,
            adjustments: ClipAdjustments::default(),
        }
    }

    /// Shift the trim window so it starts at `trim_start`, keeping the duration.
    pub fn with_trim_start(mut self, trim_start: Seconds) -> Self {
        self.trim_start = trim_start;
        self.trim_end = trim_start + self.duration;
        self
    }

    pub fn with_adjustments(mut self, adjustments: ClipAdjustments) -> Self {
        self.adjustments = adjustments;
        self
    }

    /// End position on the timeline. Always derived, never stored.
    pub fn end_time(&self) -> Seconds {
        self.start_time + self.duration
    }

    pub fn geometry(&self) -> ClipGeometry {
        ClipGeometry {
            start_time: self.start_time,
            duration: self.duration,
            trim_start: self.trim_start,
            trim_end: self.trim_end,
        }
    }

    pub fn set_geometry(&mut self, geometry: ClipGeometry) {
        self.start_time = geometry.start_time;
        self.duration = geometry.duration;
        self.trim_start = geometry.trim_start;
        self.trim_end = geometry.trim_end;
    }

    /// `trim_end - trim_start == duration` within tolerance.
    pub fn is_consistent(&self) -> bool {
        time::approx_eq(self.trim_end - self.trim_start, self.duration)
    }

    /// Check if a timeline position falls in `[start_time, end_time)`.
    pub fn contains(&self, timeline_position: Seconds) -> bool {
        timeline_position >= self.start_time && timeline_position < self.end_time()
    }

    /// Check if a timeline position lies strictly between the clip's edges.
    pub fn is_strictly_inside(&self, timeline_position: Seconds) -> bool {
        let offset = self.offset_of(timeline_position);
        offset > EPSILON && offset < self.duration - EPSILON
    }

    /// Timeline position relative to the clip's start.
    pub fn offset_of(&self, timeline_position: Seconds) -> Seconds {
        timeline_position - self.start_time
    }

    /// Map a timeline position to the source time it shows.
    ///
    /// The in-clip offset is clamped to `[0, duration]` and the result to
    /// `trim_end` when a trim end is set.
    pub fn source_time_at(&self, timeline_position: Seconds) -> Seconds {
        let time_in_clip = time::clamp_time(self.offset_of(timeline_position), 0.0, self.duration);
        let source_time = self.trim_start + time_in_clip;

        if self.trim_end > 0.0 && source_time > self.trim_end {
            self.trim_end
        } else {
            source_time
        }
    }

    /// Check if this clip overlaps with another clip on the timeline.
    /// Adjacent clips (touching at boundaries) do NOT overlap.
    pub fn overlaps_with(&self, other: &Clip) -> bool {
        self.overlaps_range(other.start_time, other.end_time())
    }

    /// Check if this clip intersects the open interval `(start, end)`.
    pub fn overlaps_range(&self, start: Seconds, end: Seconds) -> bool {
        !(self.end_time() <= start + EPSILON || end <= self.start_time + EPSILON)
    }

    /// Move the clip to a new timeline position. Source window is unchanged.
    pub fn move_to(&mut self, new_start_time: Seconds) {
        self.start_time = new_start_time;
    }

    /// Remove `amount` seconds from the head of the clip.
    ///
    /// The start moves forward, the end stays put, and the source window
    /// advances by the same amount. Returns `false` if `amount` is not in
    /// `(0, duration)`.
    pub fn trim_head(&mut self, amount: Seconds) -> bool {
        if amount <= EPSILON || amount >= self.duration - EPSILON {
            return false;
        }

        self.start_time += amount;
        self.duration -= amount;
        self.trim_start += amount;
        true
    }

    /// Shorten the clip to `new_duration`, keeping its start.
    ///
    /// Returns `false` if `new_duration` is not in `(0, duration)`.
    pub fn trim_tail(&mut self, new_duration: Seconds) -> bool {
        if new_duration <= EPSILON || new_duration >= self.duration - EPSILON {
            return false;
        }

        self.duration = new_duration;
        self.trim_end = self.trim_start + new_duration;
        true
    }

    /// Remove the interior span `[start_offset, end_offset)` (offsets relative to
    /// `start_time`) and return the surviving tail as a new clip with `new_id`.
    ///
    /// `self` keeps the head part. Returns `None`, leaving the clip untouched,
    /// unless `0 < start_offset < end_offset < duration`.
    pub fn split_out(
        &mut self,
        start_offset: Seconds,
        end_offset: Seconds,
        new_id: ClipId,
    ) -> Option<Clip> {
        let interior = start_offset > EPSILON
            && end_offset > start_offset + EPSILON
            && end_offset < self.duration - EPSILON;
        if !interior {
            return None;
        }

        let tail = Clip {
            id: new_id,
            source_path: self.source_path.clone(),
            display_name: self.display_name.clone(),
            start_time: self.start_time + end_offset,
            duration: self.duration - end_offset,
            trim_start: self.trim_start + end_offset,
            trim_end: self.trim_end,
            adjustments: self.adjustments,
        };

        self.duration = start_offset;
        self.trim_end = self.trim_start + start_offset;
        Some(tail)
    }
}
