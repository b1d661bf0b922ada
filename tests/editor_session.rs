//! End-to-end editing sessions through the `Editor` facade.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use reelcut::command::ResizeEdge;
use reelcut::core::{ClipAdjustments, ClipId, CutState, TimelineEvent};
use reelcut::editor::{Editor, Feedback, Intent, PreviewUpdate};
use reelcut::media::{MediaError, MediaProbe};
use reelcut::EngineConfig;

/// Probe answering from a fixed table; anything else is unavailable.
struct TableProbe(HashMap<PathBuf, f64>);

impl TableProbe {
    fn new(entries: &[(&str, f64)]) -> Self {
        Self(entries.iter().map(|(p, d)| (PathBuf::from(p), *d)).collect())
    }
}

impl MediaProbe for TableProbe {
    fn probe_duration(&self, path: &Path) -> Result<f64, MediaError> {
        self.0
            .get(path)
            .copied()
            .ok_or_else(|| MediaError::Unavailable(path.to_path_buf()))
    }
}

fn added(feedback: Feedback) -> ClipId {
    match feedback {
        Feedback::ClipAdded { clip, .. } => clip,
        other => panic!("expected a clip to be added, got {other:?}"),
    }
}

/// Three adjacent five-second clips at 0, 5 and 10.
fn three_clip_session() -> (Editor, [ClipId; 3]) {
    let probe = TableProbe::new(&[("a.mp4", 5.0), ("b.mp4", 5.0), ("c.mp4", 5.0)]);
    let mut editor = Editor::default();
    let a = added(editor.add_media("a.mp4", probe.probe_duration(Path::new("a.mp4"))));
    let b = added(editor.add_media("b.mp4", probe.probe_duration(Path::new("b.mp4"))));
    let c = added(editor.add_media("c.mp4", probe.probe_duration(Path::new("c.mp4"))));
    (editor, [a, b, c])
}

#[test]
fn test_media_is_laid_out_back_to_back() {
    let (editor, [a, b, c]) = three_clip_session();
    let timeline = editor.timeline();

    assert_eq!(timeline.clip(a).unwrap().start_time, 0.0);
    assert_eq!(timeline.clip(b).unwrap().start_time, 5.0);
    assert_eq!(timeline.clip(c).unwrap().start_time, 10.0);
    assert_eq!(timeline.duration(), 15.0);
    // The last added clip is selected
    assert_eq!(timeline.selected_clip().map(|c| c.id), Some(c));
}

#[test]
fn test_unavailable_media_uses_configured_default() {
    let config = EngineConfig {
        default_clip_duration: 8.0,
        ..EngineConfig::default()
    };
    let probe = TableProbe::new(&[]);
    let mut editor = Editor::new(config);

    let clip = added(editor.add_media("missing.mov", probe.probe_duration(Path::new("missing.mov"))));
    assert_eq!(editor.timeline().clip(clip).unwrap().duration, 8.0);
}

#[test]
fn test_range_cut_across_three_clips() {
    let (mut editor, [a, b, c]) = three_clip_session();

    editor.apply(Intent::Select(a));
    editor.apply(Intent::SetPlayhead(3.0));
    assert_eq!(editor.apply(Intent::Cut), Feedback::CutStartMarked(3.0));
    assert_eq!(editor.timeline().cut_state(), CutState::PendingCut { clip: a, time: 3.0 });

    editor.apply(Intent::Select(c));
    editor.apply(Intent::SetPlayhead(12.0));
    let feedback = editor.apply(Intent::Cut);
    assert_eq!(feedback, Feedback::RangeRemoved { span: 9.0, clips_removed: 1 });
    assert_eq!(feedback.to_string(), "Removed 9.00s from timeline");

    let timeline = editor.timeline();
    assert_eq!(timeline.len(), 2);
    assert!(timeline.clip(b).is_none());

    let first = timeline.clip(a).unwrap();
    assert_eq!((first.start_time, first.duration, first.trim_start, first.trim_end), (0.0, 3.0, 0.0, 3.0));
    let last = timeline.clip(c).unwrap();
    assert_eq!((last.start_time, last.duration, last.trim_start, last.trim_end), (12.0, 3.0, 2.0, 5.0));
    assert_eq!(timeline.cut_state(), CutState::Idle);
}

#[test]
fn test_cut_is_reported_to_subscribers() {
    let (mut editor, [a, ..]) = three_clip_session();
    let events = editor.subscribe();

    editor.apply(Intent::Select(a));
    editor.apply(Intent::SetPlayhead(1.0));
    editor.apply(Intent::Cut);
    editor.apply(Intent::SetPlayhead(2.0));
    editor.apply(Intent::Cut);

    let received: Vec<TimelineEvent> = events.try_iter().collect();
    assert!(received.contains(&TimelineEvent::CutAnchorChanged(Some(1.0))));
    assert!(received.contains(&TimelineEvent::CutAnchorChanged(None)));
    assert!(received.contains(&TimelineEvent::ClipChanged(a)));
    assert!(received.iter().any(|e| matches!(e, TimelineEvent::ClipAdded(_))));
}

#[test]
fn test_undo_redo_history_of_edits() {
    let (mut editor, [a, _, c]) = three_clip_session();

    editor.apply(Intent::MoveClip { clip: c, start: 20.0 });
    editor.apply(Intent::ResizeClip {
        clip: a,
        edge: ResizeEdge::Start,
        to: 1.0,
    });
    let edited = editor.timeline().clips().to_vec();

    assert_eq!(editor.snapshot().undo_description.as_deref(), Some("Resize a.mp4 to 4.00s"));
    assert_eq!(editor.apply(Intent::Undo), Feedback::Undone("Resize a.mp4 to 4.00s".into()));
    assert_eq!(editor.apply(Intent::Undo), Feedback::Undone("Move c.mp4 to 20.00s".into()));
    assert_eq!(editor.apply(Intent::Undo), Feedback::NothingToUndo);
    assert_eq!(editor.timeline().clip(c).unwrap().start_time, 10.0);
    assert_eq!(editor.timeline().clip(a).unwrap().start_time, 0.0);

    editor.apply(Intent::Redo);
    editor.apply(Intent::Redo);
    assert_eq!(editor.timeline().clips(), edited.as_slice());
}

#[test]
fn test_undo_after_delete_is_noop() {
    let (mut editor, [_, _, c]) = three_clip_session();
    editor.apply(Intent::MoveClip { clip: c, start: 30.0 });
    editor.apply(Intent::Select(c));
    editor.apply(Intent::DeleteSelected);

    let before = editor.timeline().clips().to_vec();
    assert!(matches!(editor.apply(Intent::Undo), Feedback::Undone(_)));
    assert_eq!(editor.timeline().clips(), before.as_slice());
    assert!(editor.history().can_redo());
}

#[test]
fn test_adjustments_are_stored() {
    let (mut editor, [a, ..]) = three_clip_session();
    let adjustments = ClipAdjustments {
        brightness: -20.0,
        speed: 150.0,
        fade_in: 0.5,
        ..ClipAdjustments::default()
    };

    let feedback = editor.apply(Intent::SetAdjustments { clip: a, adjustments });
    assert_eq!(feedback.to_string(), "Adjustments applied to a.mp4");
    assert_eq!(editor.timeline().clip(a).unwrap().adjustments, adjustments);
}

#[test]
fn test_preview_follows_playhead() {
    let (mut editor, [_, b, _]) = three_clip_session();
    editor.apply(Intent::SetPlayhead(7.5));

    match editor.preview_update() {
        PreviewUpdate::Fetch(request) => {
            assert_eq!(request.clip, b);
            assert_eq!(request.source_path, PathBuf::from("b.mp4"));
            assert_eq!(request.source_time, 2.5);
        }
        other => panic!("expected a fetch, got {other:?}"),
    }
}

#[test]
fn test_export_after_edits() {
    let (mut editor, [a, ..]) = three_clip_session();
    editor.apply(Intent::Select(a));
    editor.apply(Intent::DeleteSelected);

    let plan = editor.export_plan().unwrap();
    let paths: Vec<&Path> = plan.segments().iter().map(|s| s.source_path.as_path()).collect();
    assert_eq!(paths, vec![Path::new("b.mp4"), Path::new("c.mp4")]);
    let b = std::env::current_dir().unwrap().join("b.mp4");
    let entry = format!("file '{}'\ninpoint 0.000\noutpoint 5.000\n", b.display());
    assert!(plan.concat_list().contains(&entry));
}
