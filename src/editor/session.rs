//! Editing session: one timeline with its history, playback and preview throttle.
//!
//! `Editor` is the single entry point for user intents. It is not thread-safe
//! on purpose; `EditorRuntime` confines it to one editing thread.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crossbeam::channel::Receiver;
use tracing::{debug, info};

use crate::command::{Command, CommandStack, MoveClip, ResizeClip, ResizeEdge};
use crate::config::EngineConfig;
use crate::core::clip::{Clip, ClipId};
use crate::core::cut::CutState;
use crate::core::events::TimelineEvent;
use crate::core::selection::SelectionMode;
use crate::core::time::Seconds;
use crate::core::timeline::{CutOutcome, CutRejection, Timeline};
use crate::editor::intent::{Feedback, Intent};
use crate::export::{ExportError, ExportPlan};
use crate::media::MediaError;
use crate::playback::{PlaybackController, PlaybackState, TickOutcome};
use crate::preview::{resolve, PreviewRequest, PreviewThrottle};

/// What the preview should do after a state change.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewUpdate {
    Fetch(PreviewRequest),
    /// No clip under the playhead
    Clear,
    /// Throttled during playback
    Unchanged,
}

/// Read-only copy of the editor state, for callers on other threads.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSnapshot {
    pub clips: Vec<Clip>,
    pub playhead: Seconds,
    pub duration: Seconds,
    pub playback: PlaybackState,
    pub cut_state: CutState,
    pub selected: Option<ClipId>,
    pub undo_description: Option<String>,
    pub redo_description: Option<String>,
}

#[derive(Debug)]
pub struct Editor {
    timeline: Timeline,
    history: CommandStack,
    playback: PlaybackController,
    throttle: PreviewThrottle,
    config: EngineConfig,
}

impl Editor {
    pub fn new(config: EngineConfig) -> Self {
        let mode = if config.multi_select {
            SelectionMode::Multi
        } else {
            SelectionMode::Single
        };

        Self {
            timeline: Timeline::with_selection_mode(mode),
            history: CommandStack::new(config.max_undo_depth),
            playback: PlaybackController::new(),
            throttle: PreviewThrottle::new(config.preview_min_step),
            config,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn history(&self) -> &CommandStack {
        &self.history
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Observe timeline changes.
    pub fn subscribe(&mut self) -> Receiver<TimelineEvent> {
        self.timeline.subscribe()
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            clips: self.timeline.clips().to_vec(),
            playhead: self.timeline.playhead(),
            duration: self.timeline.duration(),
            playback: self.playback.state(),
            cut_state: self.timeline.cut_state(),
            selected: self.timeline.selected_clip().map(|c| c.id),
            undo_description: self.history.undo_description(),
            redo_description: self.history.redo_description(),
        }
    }

    /// Ordered source windows for the export collaborator.
    pub fn export_plan(&self) -> Result<ExportPlan, ExportError> {
        ExportPlan::from_timeline(&self.timeline)
    }

    /// Handle one user intent to completion.
    pub fn apply(&mut self, intent: Intent) -> Feedback {
        debug!(?intent, "applying intent");

        match intent {
            Intent::AddMedia { path, duration } => self.add_media_with_duration(path, duration),
            Intent::SetPlayhead(position) => {
                self.timeline.set_playhead(position);
                Feedback::PlayheadMoved(self.timeline.playhead())
            }
            Intent::Select(id) => self.select(id, false),
            Intent::ToggleSelect(id) => self.select(id, true),
            Intent::ClearSelection => {
                self.timeline.clear_selection();
                Feedback::SelectionCleared
            }
            Intent::SetMultiSelect(multi) => {
                let mode = if multi {
                    SelectionMode::Multi
                } else {
                    SelectionMode::Single
                };
                self.timeline.set_selection_mode(mode);
                Feedback::SelectionMode { multi }
            }
            Intent::Cut => self.cut(),
            Intent::DeleteSelected => {
                let removed = self.timeline.delete_selected();
                if removed.is_empty() {
                    Feedback::NoClipSelected
                } else {
                    info!(count = removed.len(), "clips deleted");
                    Feedback::Deleted(removed.len())
                }
            }
            Intent::MoveClip { clip, start } => {
                let command = MoveClip::new(&self.timeline, clip, start);
                self.run_command(command.map(|c| Box::new(c) as Box<dyn Command>))
            }
            Intent::ResizeClip { clip, edge, to } => {
                let command = match edge {
                    ResizeEdge::Start => ResizeClip::from_start(&self.timeline, clip, to),
                    ResizeEdge::End => self
                        .timeline
                        .clip(clip)
                        .map(|c| to - c.start_time)
                        .and_then(|duration| ResizeClip::from_end(&self.timeline, clip, duration)),
                };
                self.run_command(command.map(|c| Box::new(c) as Box<dyn Command>))
            }
            Intent::SetAdjustments { clip, adjustments } => {
                match self.timeline.set_adjustments(clip, adjustments) {
                    Ok(()) => {
                        let name = self.clip_name(clip);
                        Feedback::AdjustmentsApplied(name)
                    }
                    Err(err) => {
                        debug!(error = %err, "adjustments not applied");
                        Feedback::Unchanged
                    }
                }
            }
            Intent::Undo => match self.history.undo(&mut self.timeline) {
                Some(description) => Feedback::Undone(description),
                None => Feedback::NothingToUndo,
            },
            Intent::Redo => match self.history.redo(&mut self.timeline) {
                Some(description) => Feedback::Redone(description),
                None => Feedback::NothingToRedo,
            },
            Intent::Play => {
                if self.playback.play(&mut self.timeline) {
                    Feedback::PlaybackStarted
                } else {
                    Feedback::NothingToPlay
                }
            }
            Intent::Pause => {
                if self.playback.pause() {
                    Feedback::PlaybackPaused
                } else {
                    Feedback::Unchanged
                }
            }
            Intent::Stop => {
                self.playback.stop(&mut self.timeline);
                self.throttle.reset();
                Feedback::PlaybackStopped
            }
            Intent::NewProject => {
                self.playback.stop(&mut self.timeline);
                self.timeline.clear();
                self.history.clear();
                self.throttle.reset();
                info!("new project");
                Feedback::ProjectCleared
            }
        }
    }

    /// Add a media file using a probe result. An unavailable probe falls back
    /// to the configured default duration.
    pub fn add_media(&mut self, path: impl AsRef<Path>, probed: Result<Seconds, MediaError>) -> Feedback {
        let path = path.as_ref();
        let duration = match probed {
            Ok(duration) => Some(duration),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "probe unavailable");
                None
            }
        };
        self.add_media_with_duration(path.to_path_buf(), duration)
    }

    fn add_media_with_duration(&mut self, path: PathBuf, duration: Option<Seconds>) -> Feedback {
        let probed = duration.filter(|d| d.is_finite() && *d > 0.0);
        let duration = probed.unwrap_or(self.config.default_clip_duration);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let start = self.timeline.free_start_for(self.timeline.playhead(), duration);
        match self.timeline.add_clip(path, name.clone(), start, duration) {
            Ok(clip) => {
                self.timeline.select(clip);
                info!(clip, name = %name, start, duration, "media added");
                Feedback::ClipAdded {
                    clip,
                    name,
                    start,
                    duration,
                    probed: probed.is_some(),
                }
            }
            Err(err) => {
                debug!(error = %err, "media not added");
                Feedback::Unchanged
            }
        }
    }

    fn select(&mut self, id: ClipId, toggle: bool) -> Feedback {
        let found = if toggle {
            self.timeline.toggle_select(id)
        } else {
            self.timeline.select(id)
        };
        if !found {
            return Feedback::Unchanged;
        }

        match self.timeline.selected_clip() {
            Some(clip) => Feedback::Selected(clip.display_name.clone()),
            None => Feedback::SelectionCleared,
        }
    }

    fn cut(&mut self) -> Feedback {
        match self.timeline.cut_at_playhead() {
            CutOutcome::FirstPointMarked { time, .. } => Feedback::CutStartMarked(time),
            CutOutcome::RangeRemoved(report) => {
                info!(
                    start = report.start,
                    end = report.end,
                    removed = report.removed.len(),
                    "range removed"
                );
                Feedback::RangeRemoved {
                    span: report.span(),
                    clips_removed: report.removed.len(),
                }
            }
            CutOutcome::Degenerate => Feedback::CutCancelled,
            CutOutcome::Rejected(CutRejection::NoSelection) => Feedback::NoClipSelected,
            CutOutcome::Rejected(CutRejection::PlayheadOutsideClip { .. }) => Feedback::PlayheadOutsideClip,
        }
    }

    fn run_command(&mut self, command: Option<Box<dyn Command>>) -> Feedback {
        let Some(command) = command else {
            debug!("command refused: unknown clip or invalid geometry");
            return Feedback::Unchanged;
        };

        let description = command.description();
        match self.history.execute(command, &mut self.timeline) {
            Ok(()) => {
                info!(command = %description, "command executed");
                Feedback::Applied(description)
            }
            Err(err) => {
                debug!(command = %description, error = %err, "command refused");
                Feedback::Unchanged
            }
        }
    }

    fn clip_name(&self, id: ClipId) -> String {
        self.timeline
            .clip(id)
            .map(|c| c.display_name.clone())
            .unwrap_or_default()
    }

    /// Advance playback by one tick.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        self.playback.tick(&mut self.timeline, now)
    }

    /// Decide what the preview should show for the current playhead.
    pub fn preview_update(&mut self) -> PreviewUpdate {
        match resolve(&self.timeline, self.timeline.playhead()) {
            None => {
                self.throttle.reset();
                PreviewUpdate::Clear
            }
            Some(request) => {
                if self.throttle.should_resolve(&request, self.playback.state().is_playing()) {
                    PreviewUpdate::Fetch(request)
                } else {
                    PreviewUpdate::Unchanged
                }
            }
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
