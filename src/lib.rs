//! reelcut: a non-linear video timeline editing engine.
//!
//! The crate keeps one timeline of non-overlapping clips, cuts ranges out of
//! it with a two-click protocol, records moves and resizes on a bounded
//! undo/redo stack, plays the timeline back on a tick-driven state machine and
//! resolves the playhead to a source frame for preview. Decoding and encoding
//! are delegated to external tools behind the `media` traits.

pub mod command;
pub mod config;
pub mod core;
pub mod editor;
pub mod export;
pub mod media;
pub mod playback;
pub mod preview;

pub use crate::config::EngineConfig;
pub use crate::core::{Clip, ClipId, Timeline, TimelineError};
pub use crate::editor::{Editor, EditorRuntime, Feedback, Intent};
