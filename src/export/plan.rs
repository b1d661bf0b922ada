//! Export plan: the ordered source windows an external encoder concatenates.
//! No encoding happens here.

use std::fmt::Write;
use std::path::{self, PathBuf};

use serde::Serialize;

use crate::core::time::Seconds;
use crate::core::timeline::Timeline;

/// Error type for export planning
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("no clips to export")]
    EmptyTimeline,
}

/// One `(source_path, trim_start, trim_end)` triple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSegment {
    pub source_path: PathBuf,
    pub trim_start: Seconds,
    pub trim_end: Seconds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPlan {
    segments: Vec<ExportSegment>,
}

impl ExportPlan {
    /// Collect the timeline's clips in sequence order.
    pub fn from_timeline(timeline: &Timeline) -> Result<Self, ExportError> {
        Self::from_segments(
            timeline
                .clips()
                .iter()
                .map(|clip| ExportSegment {
                    source_path: clip.source_path.clone(),
                    trim_start: clip.trim_start,
                    trim_end: clip.trim_end,
                })
                .collect(),
        )
    }

    pub fn from_segments(segments: Vec<ExportSegment>) -> Result<Self, ExportError> {
        if segments.is_empty() {
            return Err(ExportError::EmptyTimeline);
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[ExportSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total output length in seconds.
    pub fn total_duration(&self) -> Seconds {
        self.segments.iter().map(|s| s.trim_end - s.trim_start).sum()
    }

    /// ffmpeg concat-demuxer list with `inpoint`/`outpoint` per segment.
    ///
    /// The demuxer resolves relative entries against the list file's
    /// directory, so paths are made absolute against the working directory.
    pub fn concat_list(&self) -> String {
        let mut list = String::from("ffconcat version 1.0\n");
        for segment in &self.segments {
            let source = path::absolute(&segment.source_path).unwrap_or_else(|_| segment.source_path.clone());
            let path = source.to_string_lossy();
            // writeln! into a String cannot fail
            let _ = writeln!(list, "file '{}'", escape_single_quotes(&path));
            let _ = writeln!(list, "inpoint {:.3}", segment.trim_start);
            let _ = writeln!(list, "outpoint {:.3}", segment.trim_end);
        }
        list
    }
}

fn escape_single_quotes(value: &str) -> String {
    value.replace('\'', "'\\''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_empty_timeline_rejected() {
        let timeline = Timeline::new();
        assert_eq!(ExportPlan::from_timeline(&timeline), Err(ExportError::EmptyTimeline));
    }

    #[test]
    fn test_segments_follow_sequence_order() {
        let mut timeline = Timeline::new();
        timeline.add_clip("b.mp4", "b", 10.0, 2.0).unwrap();
        let a = timeline.add_clip("a.mp4", "a", 0.0, 10.0).unwrap();
        timeline.remove_range_within(a, 0.0, 4.0);

        let plan = ExportPlan::from_timeline(&timeline).unwrap();
        let triples: Vec<(PathBuf, Seconds, Seconds)> = plan
            .segments()
            .iter()
            .map(|s| (s.source_path.clone(), s.trim_start, s.trim_end))
            .collect();

        assert_eq!(
            triples,
            vec![(PathBuf::from("a.mp4"), 4.0, 10.0), (PathBuf::from("b.mp4"), 0.0, 2.0)]
        );
        assert_eq!(plan.total_duration(), 8.0);
    }

    #[test]
    fn test_concat_list_escapes_quotes() {
        let plan = ExportPlan::from_segments(vec![ExportSegment {
            source_path: PathBuf::from("/media/it's here.mp4"),
            trim_start: 1.5,
            trim_end: 3.0,
        }])
        .unwrap();

        assert_eq!(
            plan.concat_list(),
            "ffconcat version 1.0\nfile '/media/it'\\''s here.mp4'\ninpoint 1.500\noutpoint 3.000\n"
        );
    }

    #[test]
    fn test_concat_list_makes_relative_paths_absolute() {
        let plan = ExportPlan::from_segments(vec![ExportSegment {
            source_path: PathBuf::from("clips/a.mp4"),
            trim_start: 0.0,
            trim_end: 2.0,
        }])
        .unwrap();

        let expected = std::env::current_dir().unwrap().join("clips/a.mp4");
        let list = plan.concat_list();
        let file_line = list.lines().nth(1).unwrap();

        assert_eq!(file_line, format!("file '{}'", expected.display()));
        assert!(Path::new(file_line.trim_start_matches("file '").trim_end_matches('\'')).is_absolute());
        // The plan itself keeps the path as given
        assert_eq!(plan.segments()[0].source_path, PathBuf::from("clips/a.mp4"));
    }
}
