//! Range cut planning.
//!
//! A range cut removes an interval of timeline time. Planning looks at an
//! immutable snapshot of the clips and produces one `RangeEdit` per affected
//! clip; the timeline applies the whole plan afterwards, so classifying one
//! clip is never skewed by edits made to another in the same pass.

use crate::core::clip::{Clip, ClipId};
use crate::core::time::{Seconds, EPSILON};

/// Two-click cut protocol state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CutState {
    #[default]
    Idle,
    /// First point marked on `clip` at timeline position `time`
    PendingCut { clip: ClipId, time: Seconds },
}

impl CutState {
    pub fn is_pending(&self) -> bool {
        matches!(self, CutState::PendingCut { .. })
    }

    pub fn anchor(&self) -> Option<(ClipId, Seconds)> {
        match *self {
            CutState::Idle => None,
            CutState::PendingCut { clip, time } => Some((clip, time)),
        }
    }
}

/// One clip mutation derived from a range cut. Offsets are relative to the
/// clip's `start_time` in the snapshot the plan was computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeEdit {
    /// Clip lies entirely inside the removed interval
    Delete(ClipId),
    /// Keep only the first `new_duration` seconds
    TrimTail { clip: ClipId, new_duration: Seconds },
    /// Drop the first `amount` seconds; the start moves forward
    TrimHead { clip: ClipId, amount: Seconds },
    /// Remove `[start_offset, end_offset)` from the middle, leaving two parts
    Split {
        clip: ClipId,
        start_offset: Seconds,
        end_offset: Seconds,
    },
}

impl RangeEdit {
    pub fn clip(&self) -> ClipId {
        match *self {
            RangeEdit::Delete(clip) => clip,
            RangeEdit::TrimTail { clip, .. }
            | RangeEdit::TrimHead { clip, .. }
            | RangeEdit::Split { clip, .. } => clip,
        }
    }
}

/// Plan the removal of `[start_offset, end_offset)` from a single clip.
///
/// Returns `None` for a degenerate range: reversed or empty offsets, a start
/// outside the clip, or non-finite input.
pub fn plan_within_clip(clip: &Clip, start_offset: Seconds, end_offset: Seconds) -> Option<RangeEdit> {
    if !start_offset.is_finite() || !end_offset.is_finite() {
        return None;
    }
    if start_offset < -EPSILON
        || start_offset >= clip.duration - EPSILON
        || end_offset <= start_offset + EPSILON
    {
        return None;
    }

    let head = start_offset <= EPSILON;
    let tail = end_offset >= clip.duration - EPSILON;

    let edit = match (head, tail) {
        (true, true) => RangeEdit::Delete(clip.id),
        (true, false) => RangeEdit::TrimHead {
            clip: clip.id,
            amount: end_offset,
        },
        (false, true) => RangeEdit::TrimTail {
            clip: clip.id,
            new_duration: start_offset,
        },
        (false, false) => RangeEdit::Split {
            clip: clip.id,
            start_offset,
            end_offset,
        },
    };
    Some(edit)
}

/// Plan the removal of the timeline interval `[start, end]` across all clips.
///
/// Clips that do not intersect the interval get no edit. An empty or
/// reversed interval plans nothing.
pub fn plan_across_clips(clips: &[Clip], start: Seconds, end: Seconds) -> Vec<RangeEdit> {
    if !start.is_finite() || !end.is_finite() || end <= start + EPSILON {
        return Vec::new();
    }

    clips
        .iter()
        .filter_map(|clip| {
            let clip_start = clip.start_time;
            let clip_end = clip.end_time();

            if clip_start >= start - EPSILON && clip_end <= end + EPSILON {
                Some(RangeEdit::Delete(clip.id))
            } else if clip_start < start - EPSILON && clip_end > end + EPSILON {
                Some(RangeEdit::Split {
                    clip: clip.id,
                    start_offset: start - clip_start,
                    end_offset: end - clip_start,
                })
            } else if clip_start < start - EPSILON && clip_end > start + EPSILON {
                Some(RangeEdit::TrimTail {
                    clip: clip.id,
                    new_duration: start - clip_start,
                })
            } else if clip_start < end - EPSILON && clip_end > end + EPSILON {
                Some(RangeEdit::TrimHead {
                    clip: clip.id,
                    amount: end - clip_start,
                })
            } else {
                None
            }
        })
        .collect()
}
