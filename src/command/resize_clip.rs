//! Resize a clip from either edge.
//!
//! Resizing from the end edge changes `duration` and `trim_end`. Resizing from
//! the start edge moves `start_time` and `trim_start` by the same delta, so the
//! clip's end on the timeline stays fixed. Undo restores all four values at once.

use crate::command::Command;
use crate::core::clip::{ClipGeometry, ClipId};
use crate::core::time::Seconds;
use crate::core::timeline::{Timeline, TimelineError};

/// Which edge of the clip is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeClip {
    clip: ClipId,
    name: String,
    edge: ResizeEdge,
    old: ClipGeometry,
    new: ClipGeometry,
}

impl ResizeClip {
    /// Resize by dragging the end edge to give the clip `new_duration`.
    ///
    /// Returns `None` for unknown clips or a geometry the clip cannot hold.
    pub fn from_end(timeline: &Timeline, clip: ClipId, new_duration: Seconds) -> Option<Self> {
        let target = timeline.clip(clip)?;
        let old = target.geometry();
        let new = ClipGeometry {
            duration: new_duration,
            trim_end: old.trim_start + new_duration,
            ..old
        };
        Self::build(clip, &target.display_name, ResizeEdge::End, old, new)
    }

    /// Resize by dragging the start edge to `new_start_time`; the end stays put.
    pub fn from_start(timeline: &Timeline, clip: ClipId, new_start_time: Seconds) -> Option<Self> {
        let target = timeline.clip(clip)?;
        let old = target.geometry();
        let delta = new_start_time - old.start_time;
        let new = ClipGeometry {
            start_time: old.start_time + delta,
            duration: old.duration - delta,
            trim_start: old.trim_start + delta,
            trim_end: old.trim_end,
        };
        Self::build(clip, &target.display_name, ResizeEdge::Start, old, new)
    }

    fn build(clip: ClipId, name: &str, edge: ResizeEdge, old: ClipGeometry, new: ClipGeometry) -> Option<Self> {
        if !new.is_valid() || new == old {
            return None;
        }
        Some(Self {
            clip,
            name: name.to_string(),
            edge,
            old,
            new,
        })
    }

    pub fn clip(&self) -> ClipId {
        self.clip
    }

    pub fn edge(&self) -> ResizeEdge {
        self.edge
    }

    pub fn old_geometry(&self) -> ClipGeometry {
        self.old
    }

    pub fn new_geometry(&self) -> ClipGeometry {
        self.new
    }
}

impl Command for ResizeClip {
    fn execute(&self, timeline: &mut Timeline) -> Result<(), TimelineError> {
        timeline.set_clip_geometry(self.clip, self.new)
    }

    fn undo(&self, timeline: &mut Timeline) -> Result<(), TimelineError> {
        timeline.set_clip_geometry(self.clip, self.old)
    }

    fn description(&self) -> String {
        format!("Resize {} to {:.2}s", self.name, self.new.duration)
    }
}
