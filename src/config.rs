//! Engine configuration.
//!
//! Loaded from JSON. Every field has a default, so an empty object is a valid
//! configuration; unknown fields are rejected to catch typos.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::time::Seconds;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum number of undo steps kept
    pub max_undo_depth: usize,
    /// Playback tick cadence in Hz
    pub tick_hz: f64,
    /// Minimum clip-time distance between preview requests while playing
    pub preview_min_step: Seconds,
    /// Duration used when the media probe reports the source unavailable
    pub default_clip_duration: Seconds,
    pub multi_select: bool,
    /// Extracted preview frames kept in memory
    pub frame_cache_capacity: usize,
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_undo_depth: 100,
            tick_hz: 10.0,
            preview_min_step: 0.3,
            default_clip_duration: 30.0,
            multi_select: false,
            frame_cache_capacity: 64,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
        }
    }
}

impl EngineConfig {
    /// Read and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_undo_depth == 0 {
            return Err(invalid("max_undo_depth", "must be at least 1"));
        }
        if !(self.tick_hz.is_finite() && self.tick_hz > 0.0) {
            return Err(invalid("tick_hz", format!("must be positive, got {}", self.tick_hz)));
        }
        if !(self.preview_min_step.is_finite() && self.preview_min_step >= 0.0) {
            return Err(invalid(
                "preview_min_step",
                format!("must not be negative, got {}", self.preview_min_step),
            ));
        }
        if !(self.default_clip_duration.is_finite() && self.default_clip_duration > 0.0) {
            return Err(invalid(
                "default_clip_duration",
                format!("must be positive, got {}", self.default_clip_duration),
            ));
        }
        Ok(())
    }

    /// Wall-clock interval between playback ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_hz)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_undo_depth, 100);
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_undo_depth": 20, "multi_select": true, "ffmpeg_path": "/opt/ffmpeg"}}"#).unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.max_undo_depth, 20);
        assert!(config.multi_select);
        assert_eq!(config.ffmpeg_path, PathBuf::from("/opt/ffmpeg"));
        assert_eq!(config.tick_hz, 10.0);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"max_undo": 5}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        for json in [
            r#"{"max_undo_depth": 0}"#,
            r#"{"tick_hz": 0.0}"#,
            r#"{"preview_min_step": -1.0}"#,
            r#"{"default_clip_duration": 0.0}"#,
        ] {
            assert!(
                matches!(EngineConfig::from_json(json), Err(ConfigError::Invalid { .. })),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
