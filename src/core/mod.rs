//! Core types for the timeline editing engine.
//!
//! This module provides the clip interval model, the selection model, range cut
//! planning and the authoritative `Timeline`. All time values are `f64` seconds.

pub mod clip;
pub mod cut;
pub mod events;
pub mod selection;
pub mod time;
pub mod timeline;

// Re-export core data structures for easier access.
pub use clip::{Clip, ClipAdjustments, ClipGeometry, ClipId};
pub use cut::{CutState, RangeEdit};
pub use events::{EventHub, TimelineEvent};
pub use selection::{Selection, SelectionMode};
pub use time::Seconds;
pub use timeline::{CutOutcome, CutRejection, RangeCutReport, Timeline, TimelineError};
