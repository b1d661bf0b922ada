//! Reversible timeline mutations and the bounded undo/redo stack.
//!
//! Commands never hold a reference to a clip. They carry the clip's id plus
//! before/after value snapshots and go through the `Timeline` API, so a command
//! left on the stack after its clip was deleted simply fails to apply.

pub mod move_clip;
pub mod resize_clip;
pub mod stack;

pub use move_clip::MoveClip;
pub use resize_clip::{ResizeClip, ResizeEdge};
pub use stack::{CommandStack, DEFAULT_MAX_DEPTH};

use crate::core::timeline::{Timeline, TimelineError};

/// A reversible mutation unit managed by `CommandStack`.
pub trait Command: std::fmt::Debug + Send {
    /// Apply the forward change. Called once on execute and again on every redo.
    fn execute(&self, timeline: &mut Timeline) -> Result<(), TimelineError>;

    /// Restore the values captured before the forward change.
    fn undo(&self, timeline: &mut Timeline) -> Result<(), TimelineError>;

    /// Human-readable label, e.g. "Move intro.mp4 to 4.00s".
    fn description(&self) -> String;
}
