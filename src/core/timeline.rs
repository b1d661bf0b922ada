//! Timeline: the authoritative, ordered sequence of clips.
//!
//! Owns the playhead, the selection and the two-click cut protocol. Clips never
//! overlap and are kept sorted by `start_time`, so sequence order is time order.
//! Every mutation is published to subscribers as a `TimelineEvent`.

use std::path::PathBuf;

use crossbeam::channel::Receiver;
use tracing::debug;

use crate::core::clip::{Clip, ClipAdjustments, ClipGeometry, ClipId};
use crate::core::cut::{self, CutState, RangeEdit};
use crate::core::events::{EventHub, TimelineEvent};
use crate::core::selection::{Selection, SelectionMode};
use crate::core::time::{self, Seconds};

/// Error type for timeline operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    #[error("clip {clip_id} would overlap clip {other}")]
    Overlap { clip_id: ClipId, other: ClipId },
    #[error("clip {0} not found")]
    UnknownClip(ClipId),
    #[error("clip id {0} is already in use")]
    DuplicateId(ClipId),
    #[error("invalid clip geometry {0:?}")]
    InvalidGeometry(ClipGeometry),
}

/// What a range cut did to the timeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RangeCutReport {
    pub start: Seconds,
    pub end: Seconds,
    pub removed: Vec<ClipId>,
    pub trimmed: Vec<ClipId>,
    pub created: Vec<ClipId>,
}

impl RangeCutReport {
    /// Length of the removed timeline interval
    pub fn span(&self) -> Seconds {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.trimmed.is_empty() && self.created.is_empty()
    }
}

/// Why a cut intent was refused. The pending anchor is discarded in both cases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CutRejection {
    NoSelection,
    PlayheadOutsideClip {
        clip: ClipId,
        clip_start: Seconds,
        clip_end: Seconds,
        playhead: Seconds,
    },
}

/// Result of one cut intent in the two-click protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum CutOutcome {
    /// First click: anchor recorded
    FirstPointMarked { clip: ClipId, time: Seconds },
    /// Second click: the range between anchor and playhead was removed
    RangeRemoved(RangeCutReport),
    /// Second click on the anchor position itself; nothing to remove
    Degenerate,
    Rejected(CutRejection),
}

/// Main timeline structure.
#[derive(Debug, Clone)]
pub struct Timeline {
    clips: Vec<Clip>, // Sorted by start_time
    playhead: Seconds,
    selection: Selection,
    cut_state: CutState,
    next_clip_id: ClipId,
    events: EventHub,
}

impl Timeline {
    /// Create an empty timeline in single-select mode.
    pub fn new() -> Self {
        Self::with_selection_mode(SelectionMode::Single)
    }

    pub fn with_selection_mode(mode: SelectionMode) -> Self {
        Self {
            clips: Vec::new(),
            playhead: 0.0,
            selection: Selection::new(mode),
            cut_state: CutState::Idle,
            next_clip_id: 1,
            events: EventHub::new(),
        }
    }

    /// Register an observer for change notifications.
    pub fn subscribe(&mut self) -> Receiver<TimelineEvent> {
        self.events.subscribe()
    }

    // ---- Queries ----

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// End of the last clip, or 0 for an empty timeline.
    pub fn duration(&self) -> Seconds {
        self.clips
            .iter()
            .map(Clip::end_time)
            .fold(0.0, f64::max)
    }

    pub fn playhead(&self) -> Seconds {
        self.playhead
    }

    /// First clip in sequence order whose `[start, end)` holds `position`.
    pub fn clip_at(&self, position: Seconds) -> Option<&Clip> {
        self.clips.iter().find(|clip| clip.contains(position))
    }

    pub fn cut_state(&self) -> CutState {
        self.cut_state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The authoritative selected clip for the current selection mode.
    pub fn selected_clip(&self) -> Option<&Clip> {
        self.selection.primary().and_then(|id| self.clip(id))
    }

    // ---- Playhead ----

    /// Move the playhead, clamped to `[0, duration]`.
    pub fn set_playhead(&mut self, position: Seconds) {
        let clamped = time::clamp_time(position, 0.0, self.duration());
        if clamped != self.playhead {
            self.playhead = clamped;
            self.events.publish(TimelineEvent::PlayheadMoved(clamped));
        }
    }

    fn reclamp_playhead(&mut self) {
        self.set_playhead(self.playhead);
    }

    // ---- Clip placement ----

    /// Create a clip playing `[0, duration)` of the source and place it at `start_time`.
    pub fn add_clip(
        &mut self,
        source_path: impl Into<PathBuf>,
        display_name: impl Into<String>,
        start_time: Seconds,
        duration: Seconds,
    ) -> Result<ClipId, TimelineError> {
        let clip = Clip::new(self.next_clip_id, source_path, display_name, start_time, duration);
        self.insert_clip(clip)
    }

    /// Place a fully built clip. Its id must be unused and it must not overlap.
    pub fn insert_clip(&mut self, clip: Clip) -> Result<ClipId, TimelineError> {
        if self.clip(clip.id).is_some() {
            return Err(TimelineError::DuplicateId(clip.id));
        }
        self.check_placement(clip.id, &clip.geometry())?;

        let id = clip.id;
        self.next_clip_id = self.next_clip_id.max(id + 1);
        self.clips.push(clip);
        self.sort_clips();

        debug!(clip = id, "clip added");
        self.events.publish(TimelineEvent::ClipAdded(id));
        Ok(id)
    }

    /// Start time for a new clip of `duration`: `preferred` if that spot is free,
    /// otherwise the end of the timeline.
    pub fn free_start_for(&self, preferred: Seconds, duration: Seconds) -> Seconds {
        let preferred = preferred.max(0.0);
        let blocked = self
            .clips
            .iter()
            .any(|c| c.overlaps_range(preferred, preferred + duration));
        if blocked {
            self.duration()
        } else {
            preferred
        }
    }

    /// Validate `geometry` for clip `id` against every other clip.
    pub fn check_placement(&self, id: ClipId, geometry: &ClipGeometry) -> Result<(), TimelineError> {
        if !geometry.is_valid() {
            return Err(TimelineError::InvalidGeometry(*geometry));
        }

        let end = geometry.end_time();
        match self
            .clips
            .iter()
            .find(|c| c.id != id && c.overlaps_range(geometry.start_time, end))
        {
            Some(other) => Err(TimelineError::Overlap {
                clip_id: id,
                other: other.id,
            }),
            None => Ok(()),
        }
    }

    /// Replace all four interval values of a clip at once.
    pub fn set_clip_geometry(&mut self, id: ClipId, geometry: ClipGeometry) -> Result<(), TimelineError> {
        if self.clip(id).is_none() {
            return Err(TimelineError::UnknownClip(id));
        }
        self.check_placement(id, &geometry)?;

        if let Some(clip) = self.clips.iter_mut().find(|c| c.id == id) {
            clip.set_geometry(geometry);
        }
        self.sort_clips();
        self.events.publish(TimelineEvent::ClipChanged(id));
        self.reclamp_playhead();
        Ok(())
    }

    /// Move a clip on the timeline, keeping its duration and source window.
    pub fn move_clip(&mut self, id: ClipId, new_start_time: Seconds) -> Result<(), TimelineError> {
        let geometry = self
            .clip(id)
            .map(|c| ClipGeometry {
                start_time: new_start_time,
                ..c.geometry()
            })
            .ok_or(TimelineError::UnknownClip(id))?;
        self.set_clip_geometry(id, geometry)
    }

    pub fn set_adjustments(&mut self, id: ClipId, adjustments: ClipAdjustments) -> Result<(), TimelineError> {
        let clip = self
            .clips
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(TimelineError::UnknownClip(id))?;
        clip.adjustments = adjustments;
        self.events.publish(TimelineEvent::ClipChanged(id));
        Ok(())
    }

    /// Remove a clip. It leaves the selection, and a cut anchor on it is dropped.
    pub fn remove_clip(&mut self, id: ClipId) -> Option<Clip> {
        let pos = self.clips.iter().position(|c| c.id == id)?;
        let removed = self.clips.remove(pos);

        self.forget_clip(id);
        self.events.publish(TimelineEvent::ClipRemoved(id));
        self.reclamp_playhead();
        debug!(clip = id, "clip removed");
        Some(removed)
    }

    /// Remove every selected clip and clear the selection.
    pub fn delete_selected(&mut self) -> Vec<Clip> {
        let ids = self.selection.ids().to_vec();
        ids.into_iter().filter_map(|id| self.remove_clip(id)).collect()
    }

    fn forget_clip(&mut self, id: ClipId) {
        if self.selection.contains(id) || self.selection.primary() == Some(id) {
            self.selection.remove(id);
            self.events.publish(TimelineEvent::SelectionChanged);
        }
        if matches!(self.cut_state, CutState::PendingCut { clip, .. } if clip == id) {
            self.set_cut_state(CutState::Idle);
        }
    }

    fn sort_clips(&mut self) {
        self.clips.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    }

    // ---- Selection ----

    /// Select a single clip, deselecting all others. Returns `false` for unknown ids.
    pub fn select(&mut self, id: ClipId) -> bool {
        if self.clip(id).is_none() {
            return false;
        }
        self.selection.select_only(id);
        self.events.publish(TimelineEvent::SelectionChanged);
        true
    }

    /// Toggle a clip in the multi-selection (plain select in single mode).
    pub fn toggle_select(&mut self, id: ClipId) -> bool {
        if self.clip(id).is_none() {
            return false;
        }
        self.selection.toggle(id);
        self.events.publish(TimelineEvent::SelectionChanged);
        true
    }

    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.events.publish(TimelineEvent::SelectionChanged);
        }
    }

    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.selection.set_mode(mode);
        self.events.publish(TimelineEvent::SelectionChanged);
    }

    // ---- Cutting ----

    fn set_cut_state(&mut self, state: CutState) {
        if self.cut_state != state {
            self.cut_state = state;
            self.events
                .publish(TimelineEvent::CutAnchorChanged(state.anchor().map(|(_, t)| t)));
        }
    }

    /// Handle one cut intent of the two-click protocol.
    ///
    /// The first valid click marks the playhead as anchor; the second removes
    /// everything between the anchor and the playhead, across clips if the
    /// anchor sits on a different clip. A click without a selected clip, or
    /// with the playhead not strictly inside it, discards any pending anchor.
    pub fn cut_at_playhead(&mut self) -> CutOutcome {
        let playhead = self.playhead;
        let Some(selected) = self.selected_clip() else {
            self.set_cut_state(CutState::Idle);
            return CutOutcome::Rejected(CutRejection::NoSelection);
        };

        if !selected.is_strictly_inside(playhead) {
            let rejection = CutRejection::PlayheadOutsideClip {
                clip: selected.id,
                clip_start: selected.start_time,
                clip_end: selected.end_time(),
                playhead,
            };
            self.set_cut_state(CutState::Idle);
            return CutOutcome::Rejected(rejection);
        }

        let selected_id = selected.id;
        let selected_start = selected.start_time;

        match self.cut_state {
            CutState::Idle => {
                self.set_cut_state(CutState::PendingCut {
                    clip: selected_id,
                    time: playhead,
                });
                debug!(clip = selected_id, time = playhead, "cut start marked");
                CutOutcome::FirstPointMarked {
                    clip: selected_id,
                    time: playhead,
                }
            }
            CutState::PendingCut {
                clip: anchor_clip,
                time: anchor_time,
            } => {
                self.set_cut_state(CutState::Idle);

                let start = anchor_time.min(playhead);
                let end = anchor_time.max(playhead);
                let report = if anchor_clip == selected_id {
                    self.remove_range_within(selected_id, start - selected_start, end - selected_start)
                } else {
                    Some(self.remove_range(start, end))
                };

                match report {
                    Some(report) if !report.is_empty() => CutOutcome::RangeRemoved(report),
                    _ => CutOutcome::Degenerate,
                }
            }
        }
    }

    /// Remove `[start_offset, end_offset)` (relative to the clip's start) from one clip.
    ///
    /// Returns `None` and leaves the timeline unchanged for unknown clips or
    /// degenerate ranges.
    pub fn remove_range_within(
        &mut self,
        id: ClipId,
        start_offset: Seconds,
        end_offset: Seconds,
    ) -> Option<RangeCutReport> {
        let clip = self.clip(id)?;
        let clip_start = clip.start_time;
        let edit = cut::plan_within_clip(clip, start_offset, end_offset)?;

        let end = (clip_start + end_offset).min(clip.end_time());
        Some(self.apply_plan(&[edit], clip_start + start_offset, end))
    }

    /// Remove the timeline interval `[start, end]` from every clip it touches.
    ///
    /// All edits are planned against the clips as they are before the cut,
    /// then applied together.
    pub fn remove_range(&mut self, start: Seconds, end: Seconds) -> RangeCutReport {
        let plan = cut::plan_across_clips(&self.clips, start, end);
        self.apply_plan(&plan, start, end)
    }

    fn apply_plan(&mut self, plan: &[RangeEdit], start: Seconds, end: Seconds) -> RangeCutReport {
        let mut report = RangeCutReport {
            start,
            end,
            ..RangeCutReport::default()
        };

        for edit in plan {
            let id = edit.clip();
            let Some(pos) = self.clips.iter().position(|c| c.id == id) else {
                continue;
            };

            match *edit {
                RangeEdit::Delete(_) => {
                    self.clips.remove(pos);
                    report.removed.push(id);
                }
                RangeEdit::TrimTail { new_duration, .. } => {
                    if self.clips[pos].trim_tail(new_duration) {
                        report.trimmed.push(id);
                    }
                }
                RangeEdit::TrimHead { amount, .. } => {
                    if self.clips[pos].trim_head(amount) {
                        report.trimmed.push(id);
                    }
                }
                RangeEdit::Split {
                    start_offset,
                    end_offset,
                    ..
                } => {
                    let new_id = self.next_clip_id;
                    if let Some(tail) = self.clips[pos].split_out(start_offset, end_offset, new_id) {
                        self.next_clip_id += 1;
                        self.clips.insert(pos + 1, tail);
                        report.trimmed.push(id);
                        report.created.push(new_id);
                    }
                }
            }
        }
        self.sort_clips();

        for &id in &report.removed {
            self.forget_clip(id);
            self.events.publish(TimelineEvent::ClipRemoved(id));
        }
        for &id in &report.trimmed {
            self.events.publish(TimelineEvent::ClipChanged(id));
        }
        for &id in &report.created {
            self.events.publish(TimelineEvent::ClipAdded(id));
        }
        self.reclamp_playhead();

        debug!(
            start,
            end,
            removed = report.removed.len(),
            trimmed = report.trimmed.len(),
            created = report.created.len(),
            "range cut applied"
        );
        report
    }

    /// Drop every clip and reset playhead, selection and cut state.
    pub fn clear(&mut self) {
        self.clips.clear();
        self.selection.clear();
        self.cut_state = CutState::Idle;
        self.playhead = 0.0;
        self.events.publish(TimelineEvent::Cleared);
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}
