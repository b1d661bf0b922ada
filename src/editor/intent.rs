//! User intents and the status feedback they produce.

use std::fmt;
use std::path::PathBuf;

use crate::command::ResizeEdge;
use crate::core::clip::{ClipAdjustments, ClipId};
use crate::core::time::{self, Seconds};

/// Everything a user can ask the editor to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Add a media file. `duration` is the probe result; `None` means unavailable.
    AddMedia {
        path: PathBuf,
        duration: Option<Seconds>,
    },
    SetPlayhead(Seconds),
    Select(ClipId),
    ToggleSelect(ClipId),
    ClearSelection,
    SetMultiSelect(bool),
    /// One click of the two-click range cut
    Cut,
    DeleteSelected,
    MoveClip {
        clip: ClipId,
        start: Seconds,
    },
    /// Drag one edge of a clip to timeline position `to`
    ResizeClip {
        clip: ClipId,
        edge: ResizeEdge,
        to: Seconds,
    },
    SetAdjustments {
        clip: ClipId,
        adjustments: ClipAdjustments,
    },
    Undo,
    Redo,
    Play,
    Pause,
    Stop,
    NewProject,
}

/// Result of an intent. `Display` renders the status line shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    ClipAdded {
        clip: ClipId,
        name: String,
        start: Seconds,
        duration: Seconds,
        probed: bool,
    },
    PlayheadMoved(Seconds),
    Selected(String),
    SelectionCleared,
    SelectionMode { multi: bool },
    CutStartMarked(Seconds),
    RangeRemoved { span: Seconds, clips_removed: usize },
    CutCancelled,
    NoClipSelected,
    PlayheadOutsideClip,
    Deleted(usize),
    /// A command ran; carries its description
    Applied(String),
    AdjustmentsApplied(String),
    Undone(String),
    Redone(String),
    NothingToUndo,
    NothingToRedo,
    PlaybackStarted,
    PlaybackPaused,
    PlaybackStopped,
    NothingToPlay,
    ProjectCleared,
    /// The intent was valid input but changed nothing
    Unchanged,
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::ClipAdded {
                name,
                start,
                duration,
                probed: true,
                ..
            } => write!(f, "Added {name} at {start:.2}s ({duration:.2}s)"),
            Feedback::ClipAdded {
                name,
                start,
                duration,
                probed: false,
                ..
            } => write!(
                f,
                "Added {name} at {start:.2}s (duration unknown, using {duration:.2}s)"
            ),
            Feedback::PlayheadMoved(position) => write!(f, "Playhead at {}", time::format_time(*position)),
            Feedback::Selected(name) => write!(f, "Selected: {name}"),
            Feedback::SelectionCleared => f.write_str("Selection cleared"),
            Feedback::SelectionMode { multi: true } => f.write_str("Multi-select enabled"),
            Feedback::SelectionMode { multi: false } => f.write_str("Multi-select disabled"),
            Feedback::CutStartMarked(at) => {
                write!(f, "Cut start marked at {at:.2}s. Move the playhead and cut again to remove the range")
            }
            Feedback::RangeRemoved { span, .. } => write!(f, "Removed {span:.2}s from timeline"),
            Feedback::CutCancelled => f.write_str("Cut cancelled: empty range"),
            Feedback::NoClipSelected => f.write_str("Select a clip first"),
            Feedback::PlayheadOutsideClip => f.write_str("Playhead must be inside the selected clip"),
            Feedback::Deleted(1) => f.write_str("Clip deleted"),
            Feedback::Deleted(count) => write!(f, "{count} clips deleted"),
            Feedback::Applied(description) => f.write_str(description),
            Feedback::AdjustmentsApplied(name) => write!(f, "Adjustments applied to {name}"),
            Feedback::Undone(description) => write!(f, "Undo: {description}"),
            Feedback::Redone(description) => write!(f, "Redo: {description}"),
            Feedback::NothingToUndo => f.write_str("Nothing to undo"),
            Feedback::NothingToRedo => f.write_str("Nothing to redo"),
            Feedback::PlaybackStarted => f.write_str("Playing"),
            Feedback::PlaybackPaused => f.write_str("Paused"),
            Feedback::PlaybackStopped => f.write_str("Stopped"),
            Feedback::NothingToPlay => f.write_str("Add clips to the timeline first"),
            Feedback::ProjectCleared => f.write_str("New project created"),
            Feedback::Unchanged => f.write_str("Ready"),
        }
    }
}
