//! Tick-driven playback controller.
//!
//! The controller owns no clock. Callers feed it the current `Instant` on every
//! tick, which keeps it deterministic under test and lets the editing thread
//! serialize ticks against user intents.

use std::time::Instant;

use tracing::{debug, warn};

use crate::core::time::Seconds;
use crate::core::timeline::Timeline;
use crate::playback::state::PlaybackState;

/// Error type for playback ticks
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    #[error("tick clock went backwards")]
    ClockWentBackwards,
    #[error("playhead advanced to a non-finite position ({0})")]
    NonFinitePosition(Seconds),
}

/// What a tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Not playing; nothing happened
    Idle,
    /// Playhead moved to the given position
    Advanced(Seconds),
    /// Reached the end of the timeline and stopped there
    Finished(Seconds),
    /// The tick failed and playback was forced to `Stopped`
    Faulted(PlaybackError),
}

#[derive(Debug, Default)]
pub struct PlaybackController {
    state: PlaybackState,
    last_tick: Option<Instant>, // None until the first tick after play()
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Start or resume playback. Ignored on an empty timeline.
    ///
    /// Playback starting at the very end of the timeline rewinds to 0 first.
    /// Returns `true` if the controller is now playing.
    pub fn play(&mut self, timeline: &mut Timeline) -> bool {
        if timeline.is_empty() {
            debug!("play ignored: timeline has no clips");
            return false;
        }
        if self.state.is_playing() {
            return true;
        }

        if timeline.playhead() >= timeline.duration() {
            timeline.set_playhead(0.0);
        }
        self.state = PlaybackState::Playing;
        self.last_tick = None;
        debug!(position = timeline.playhead(), "playback started");
        true
    }

    /// Freeze the playhead. Only meaningful while playing.
    pub fn pause(&mut self) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        self.state = PlaybackState::Paused;
        self.last_tick = None;
        debug!("playback paused");
        true
    }

    /// Stop playback and rewind the playhead to 0.
    pub fn stop(&mut self, timeline: &mut Timeline) {
        self.state = PlaybackState::Stopped;
        self.last_tick = None;
        timeline.set_playhead(0.0);
        debug!("playback stopped");
    }

    /// Advance the playhead by the wall-clock time since the previous tick.
    ///
    /// The first tick after `play()` only records the reference time. Reaching
    /// the timeline duration clamps the playhead there and stops. A fault stops
    /// playback and leaves the playhead where it was.
    pub fn tick(&mut self, timeline: &mut Timeline, now: Instant) -> TickOutcome {
        if !self.state.is_playing() {
            return TickOutcome::Idle;
        }

        match self.advance(timeline, now) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, position = timeline.playhead(), "playback tick failed; stopping");
                self.state = PlaybackState::Stopped;
                self.last_tick = None;
                TickOutcome::Faulted(err)
            }
        }
    }

    fn advance(&mut self, timeline: &mut Timeline, now: Instant) -> Result<TickOutcome, PlaybackError> {
        let delta = match self.last_tick {
            None => 0.0,
            Some(previous) => now
                .checked_duration_since(previous)
                .ok_or(PlaybackError::ClockWentBackwards)?
                .as_secs_f64(),
        };
        self.last_tick = Some(now);

        let next = timeline.playhead() + delta;
        if !next.is_finite() {
            return Err(PlaybackError::NonFinitePosition(next));
        }

        let duration = timeline.duration();
        if next >= duration {
            timeline.set_playhead(duration);
            self.state = PlaybackState::Stopped;
            self.last_tick = None;
            debug!(position = duration, "playback reached end of timeline");
            return Ok(TickOutcome::Finished(duration));
        }

        timeline.set_playhead(next);
        Ok(TickOutcome::Advanced(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn one_clip_timeline() -> Timeline {
        let mut timeline = Timeline::new();
        timeline.add_clip("a.mp4", "a", 0.0, 5.0).unwrap();
        timeline
    }

    #[test]
    fn test_play_on_empty_timeline_is_noop() {
        let mut timeline = Timeline::new();
        let mut controller = PlaybackController::new();

        assert!(!controller.play(&mut timeline));
        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert_eq!(timeline.playhead(), 0.0);
    }

    #[test]
    fn test_first_tick_has_zero_delta() {
        let mut timeline = one_clip_timeline();
        let mut controller = PlaybackController::new();
        controller.play(&mut timeline);

        let outcome = controller.tick(&mut timeline, Instant::now());
        assert_eq!(outcome, TickOutcome::Advanced(0.0));
        assert_eq!(timeline.playhead(), 0.0);
    }

    #[test]
    fn test_auto_stop_at_end() {
        let mut timeline = one_clip_timeline();
        let mut controller = PlaybackController::new();
        controller.play(&mut timeline);

        let start = Instant::now();
        controller.tick(&mut timeline, start);
        let mut last = TickOutcome::Idle;
        for i in 1..=60 {
            last = controller.tick(&mut timeline, start + Duration::from_millis(100 * i));
        }

        assert_eq!(last, TickOutcome::Idle);
        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert_eq!(timeline.playhead(), 5.0);
    }

    #[test]
    fn test_finished_reported_once() {
        let mut timeline = one_clip_timeline();
        let mut controller = PlaybackController::new();
        controller.play(&mut timeline);

        let start = Instant::now();
        controller.tick(&mut timeline, start);
        assert_eq!(controller.tick(&mut timeline, start + Duration::from_secs(6)), TickOutcome::Finished(5.0));
        assert_eq!(controller.tick(&mut timeline, start + Duration::from_secs(7)), TickOutcome::Idle);
    }

    #[test]
    fn test_pause_freezes_playhead() {
        let mut timeline = one_clip_timeline();
        let mut controller = PlaybackController::new();
        controller.play(&mut timeline);

        let start = Instant::now();
        controller.tick(&mut timeline, start);
        controller.tick(&mut timeline, start + Duration::from_secs(2));
        assert!(controller.pause());
        assert_eq!(controller.state(), PlaybackState::Paused);

        assert_eq!(controller.tick(&mut timeline, start + Duration::from_secs(3)), TickOutcome::Idle);
        assert_eq!(timeline.playhead(), 2.0);

        // Resuming re-initializes the reference time
        controller.play(&mut timeline);
        controller.tick(&mut timeline, start + Duration::from_secs(4));
        assert_eq!(timeline.playhead(), 2.0);
        controller.tick(&mut timeline, start + Duration::from_secs(5));
        assert_eq!(timeline.playhead(), 3.0);
    }

    #[test]
    fn test_stop_rewinds() {
        let mut timeline = one_clip_timeline();
        let mut controller = PlaybackController::new();
        controller.play(&mut timeline);
        timeline.set_playhead(3.0);

        controller.stop(&mut timeline);
        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert_eq!(timeline.playhead(), 0.0);
    }

    #[test]
    fn test_play_at_end_rewinds() {
        let mut timeline = one_clip_timeline();
        timeline.set_playhead(5.0);
        let mut controller = PlaybackController::new();

        assert!(controller.play(&mut timeline));
        assert_eq!(timeline.playhead(), 0.0);
    }

    #[test]
    fn test_clock_fault_forces_stop() {
        let mut timeline = one_clip_timeline();
        let mut controller = PlaybackController::new();
        controller.play(&mut timeline);

        let start = Instant::now() + Duration::from_secs(10);
        controller.tick(&mut timeline, start);
        controller.tick(&mut timeline, start + Duration::from_secs(1));

        let outcome = controller.tick(&mut timeline, start);
        assert_eq!(outcome, TickOutcome::Faulted(PlaybackError::ClockWentBackwards));
        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert_eq!(timeline.playhead(), 1.0);
    }
}
