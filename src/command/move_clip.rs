//! Move a clip along the timeline.

use crate::command::Command;
use crate::core::clip::ClipId;
use crate::core::time::Seconds;
use crate::core::timeline::{Timeline, TimelineError};

#[derive(Debug, Clone, PartialEq)]
pub struct MoveClip {
    clip: ClipId,
    name: String,
    old_start: Seconds,
    new_start: Seconds,
}

impl MoveClip {
    /// Capture the clip's current start. Returns `None` for unknown clips.
    pub fn new(timeline: &Timeline, clip: ClipId, new_start: Seconds) -> Option<Self> {
        let target = timeline.clip(clip)?;
        Some(Self {
            clip,
            name: target.display_name.clone(),
            old_start: target.start_time,
            new_start,
        })
    }

    pub fn clip(&self) -> ClipId {
        self.clip
    }

    pub fn old_start(&self) -> Seconds {
        self.old_start
    }

    pub fn new_start(&self) -> Seconds {
        self.new_start
    }
}

impl Command for MoveClip {
    fn execute(&self, timeline: &mut Timeline) -> Result<(), TimelineError> {
        timeline.move_clip(self.clip, self.new_start)
    }

    fn undo(&self, timeline: &mut Timeline) -> Result<(), TimelineError> {
        timeline.move_clip(self.clip, self.old_start)
    }

    fn description(&self) -> String {
        format!("Move {} to {:.2}s", self.name, self.new_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_and_undo() {
        let mut timeline = Timeline::new();
        let id = timeline.add_clip("intro.mp4", "intro.mp4", 0.0, 5.0).unwrap();

        let command = MoveClip::new(&timeline, id, 8.0).unwrap();
        assert_eq!(command.description(), "Move intro.mp4 to 8.00s");

        command.execute(&mut timeline).unwrap();
        assert_eq!(timeline.clip(id).unwrap().start_time, 8.0);

        command.undo(&mut timeline).unwrap();
        assert_eq!(timeline.clip(id).unwrap().start_time, 0.0);
    }

    #[test]
    fn test_move_unknown_clip() {
        let timeline = Timeline::new();
        assert!(MoveClip::new(&timeline, 3, 1.0).is_none());
    }

    #[test]
    fn test_undo_after_clip_removed() {
        let mut timeline = Timeline::new();
        let id = timeline.add_clip("a.mp4", "a", 0.0, 5.0).unwrap();
        let command = MoveClip::new(&timeline, id, 8.0).unwrap();
        command.execute(&mut timeline).unwrap();

        timeline.remove_clip(id);
        assert_eq!(command.undo(&mut timeline), Err(TimelineError::UnknownClip(id)));
    }
}
