pub mod controller;
pub mod state;

pub use controller::{PlaybackController, PlaybackError, TickOutcome};
pub use state::PlaybackState;
