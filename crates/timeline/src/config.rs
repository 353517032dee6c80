use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::{ClipColor, Seconds, TimelineError, TrackId, TrackKind, DEFAULT_PALETTE};

/// Clip length used when an asset carries no duration (stills).
pub const DEFAULT_FALLBACK_DURATION: Seconds = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackSpec {
    pub id: TrackId,
    pub name: String,
    #[serde(default)]
    pub kind: TrackKind,
}

/// Per-session settings. Every field falls back to the stock workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub palette: Vec<ClipColor>,
    pub fallback_duration: Seconds,
    pub tracks: Vec<TrackSpec>,
}

fn default_tracks() -> Vec<TrackSpec> {
    vec![
        TrackSpec {
            id: TrackId::from("video1"),
            name: "Video Track 1".to_string(),
            kind: TrackKind::Video,
        },
        TrackSpec {
            id: TrackId::from("video2"),
            name: "Video Track 2".to_string(),
            kind: TrackKind::Video,
        },
    ]
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(|c| ClipColor::from(*c)).collect(),
            fallback_duration: DEFAULT_FALLBACK_DURATION,
            tracks: default_tracks(),
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, TimelineError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| TimelineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, TimelineError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            TimelineError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), TimelineError> {
        if self.palette.is_empty() {
            return Err(TimelineError::InvalidConfig("palette is empty".into()));
        }
        let mut colors = HashSet::new();
        if let Some(dup) = self.palette.iter().find(|c| !colors.insert(*c)) {
            return Err(TimelineError::InvalidConfig(format!(
                "duplicate palette color {}",
                dup
            )));
        }
        if !self.fallback_duration.is_finite() || self.fallback_duration <= 0.0 {
            return Err(TimelineError::InvalidConfig(format!(
                "fallback duration must be positive, got {}",
                self.fallback_duration
            )));
        }
        if self.tracks.is_empty() {
            return Err(TimelineError::InvalidConfig("no tracks configured".into()));
        }
        let mut ids = HashSet::new();
        if let Some(dup) = self.tracks.iter().find(|t| !ids.insert(&t.id)) {
            return Err(TimelineError::InvalidConfig(format!(
                "duplicate track id {}",
                dup.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SessionConfig::default();
        config.validate().unwrap();
        assert_eq!(config.palette.len(), 12);
        assert_eq!(config.fallback_duration, 10.0);
        assert_eq!(config.tracks.len(), 2);
        assert!(config.tracks.iter().all(|t| t.kind == TrackKind::Video));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SessionConfig::from_json(r#"{"fallback_duration": 5}"#).unwrap();
        assert_eq!(config.fallback_duration, 5.0);
        assert_eq!(config.tracks[0].id.as_str(), "video1");
        assert_eq!(config.palette[0].as_str(), "#FF5733");
    }

    #[test]
    fn test_custom_tracks() {
        let config = SessionConfig::from_json(
            r#"{"tracks": [{"id": "v1", "name": "V1"}, {"id": "a1", "name": "A1", "kind": "audio"}]}"#,
        )
        .unwrap();
        assert_eq!(config.tracks[0].kind, TrackKind::Video);
        assert_eq!(config.tracks[1].kind, TrackKind::Audio);
    }

    #[test]
    fn test_invalid_configs() {
        for json in [
            r#"{"palette": []}"#,
            r##"{"palette": ["#111111", "#111111"]}"##,
            r#"{"fallback_duration": 0}"#,
            r#"{"fallback_duration": -2.5}"#,
            r#"{"tracks": []}"#,
            r#"{"tracks": [{"id": "v", "name": "a"}, {"id": "v", "name": "b"}]}"#,
            r#"{"palette": "red"}"#,
        ] {
            assert!(
                matches!(
                    SessionConfig::from_json(json),
                    Err(TimelineError::InvalidConfig(_))
                ),
                "{} should be rejected",
                json
            );
        }
    }
}
